//! 部件目录实现

use di_abstractions::{HasCreationScope, PartCatalog, PartDefinition, PartFilter};
use infrastructure_common::{CompositionError, PartCreationScope};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// 内存部件目录
#[derive(Debug, Default)]
pub struct TypeCatalog {
    parts: Vec<Arc<PartDefinition>>,
}

impl TypeCatalog {
    /// 创建新的内存目录
    pub fn new(parts: impl IntoIterator<Item = PartDefinition>) -> Self {
        Self {
            parts: parts.into_iter().map(Arc::new).collect(),
        }
    }

    /// 部件数量
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl PartCatalog for TypeCatalog {
    fn parts(&self) -> Result<Vec<Arc<PartDefinition>>, CompositionError> {
        Ok(self.parts.clone())
    }

    fn name(&self) -> &str {
        "TypeCatalog"
    }
}

/// 聚合目录
///
/// 按添加顺序串联多个目录；任一子目录加载失败即整体失败。
#[derive(Default)]
pub struct AggregateCatalog {
    catalogs: Vec<Arc<dyn PartCatalog>>,
}

impl AggregateCatalog {
    /// 创建新的聚合目录
    pub fn new(catalogs: impl IntoIterator<Item = Arc<dyn PartCatalog>>) -> Self {
        Self {
            catalogs: catalogs.into_iter().collect(),
        }
    }

    /// 添加子目录
    pub fn push(&mut self, catalog: Arc<dyn PartCatalog>) {
        self.catalogs.push(catalog);
    }

    /// 子目录数量
    pub fn len(&self) -> usize {
        self.catalogs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalogs.is_empty()
    }
}

impl PartCatalog for AggregateCatalog {
    fn parts(&self) -> Result<Vec<Arc<PartDefinition>>, CompositionError> {
        let mut parts = Vec::new();
        for catalog in &self.catalogs {
            parts.extend(catalog.parts()?);
        }
        Ok(parts)
    }

    fn name(&self) -> &str {
        "AggregateCatalog"
    }
}

impl fmt::Debug for AggregateCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AggregateCatalog")
            .field(
                "catalogs",
                &self.catalogs.iter().map(|c| c.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// 过滤目录
///
/// 在读取时过滤底层目录，不修改底层目录。
pub struct FilteringCatalog {
    inner: Arc<dyn PartCatalog>,
    filter: Arc<dyn PartFilter>,
    name: String,
}

impl FilteringCatalog {
    /// 创建新的过滤目录
    pub fn new(inner: Arc<dyn PartCatalog>, filter: Arc<dyn PartFilter>) -> Self {
        let name = format!("FilteringCatalog({}, {})", inner.name(), filter.name());
        Self {
            inner,
            filter,
            name,
        }
    }

    /// 按创建作用域过滤
    pub fn by_scope(inner: Arc<dyn PartCatalog>, scope: PartCreationScope) -> Self {
        Self::new(inner, Arc::new(HasCreationScope::new(scope)))
    }
}

impl PartCatalog for FilteringCatalog {
    fn parts(&self) -> Result<Vec<Arc<PartDefinition>>, CompositionError> {
        let parts: Vec<_> = self
            .inner
            .parts()?
            .into_iter()
            .filter(|part| self.filter.matches(part))
            .collect();
        debug!("{} 过滤后剩余 {} 个部件", self.name, parts.len());
        Ok(parts)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for FilteringCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilteringCatalog")
            .field("name", &self.name)
            .finish()
    }
}
