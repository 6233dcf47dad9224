//! 清单目录
//!
//! 从 TOML 清单文件延迟加载部件。清单只列出部件名称和可选的作用域、创建策略覆盖，
//! 实际的部件定义来自 [`PartRegistry`]。
//!
//! ```toml
//! [[parts]]
//! name = "RequestContext"
//! scope = "per_unit"
//! creation_policy = "shared"
//! ```

use di_abstractions::{PartCatalog, PartDefinition};
use infrastructure_common::{CompositionError, CreationPolicy, PartCreationScope};
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 已知部件注册表
#[derive(Default)]
pub struct PartRegistry {
    parts: RwLock<HashMap<String, Arc<PartDefinition>>>,
}

impl PartRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册部件定义，同名部件会被替换
    pub fn register(&self, part: PartDefinition) -> &Self {
        debug!("注册部件定义: {}", part.name);
        if let Some(previous) = self.parts.write().insert(part.name.clone(), Arc::new(part)) {
            warn!("部件定义被替换: {}", previous.name);
        }
        self
    }

    /// 按名称获取部件定义
    pub fn get(&self, name: &str) -> Option<Arc<PartDefinition>> {
        self.parts.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.parts.read().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.parts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.read().is_empty()
    }

    /// 已注册的部件名称（已排序）
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.parts.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl fmt::Debug for PartRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartRegistry")
            .field("parts", &self.names())
            .finish()
    }
}

/// 清单条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// 注册表中的部件名称
    pub name: String,
    /// 作用域覆盖
    #[serde(default)]
    pub scope: Option<PartCreationScope>,
    /// 创建策略覆盖
    #[serde(default)]
    pub creation_policy: Option<CreationPolicy>,
}

/// 清单文件
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub parts: Vec<ManifestEntry>,
}

impl Manifest {
    /// 解析清单文本
    pub fn parse(catalog: &str, content: &str) -> Result<Self, CompositionError> {
        toml::from_str(content).map_err(|e| CompositionError::InvalidCatalog {
            catalog: catalog.to_string(),
            message: e.to_string(),
        })
    }
}

/// 清单目录
pub struct ManifestCatalog {
    path: PathBuf,
    registry: Arc<PartRegistry>,
    name: String,
    parts: OnceCell<Vec<Arc<PartDefinition>>>,
}

impl ManifestCatalog {
    /// 创建清单目录；文件在首次读取部件时才加载
    pub fn new(path: impl AsRef<Path>, registry: Arc<PartRegistry>) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = format!("ManifestCatalog({})", path.display());
        Self {
            path,
            registry,
            name,
            parts: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 清单是否已成功加载
    pub fn is_loaded(&self) -> bool {
        self.parts.get().is_some()
    }

    fn load(&self) -> Result<Vec<Arc<PartDefinition>>, CompositionError> {
        let resource = self.path.display().to_string();
        if !self.path.exists() {
            return Err(CompositionError::MissingBackingResource {
                resource,
                detail: "清单文件不存在".to_string(),
            });
        }

        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            CompositionError::MissingBackingResource {
                resource: resource.clone(),
                detail: e.to_string(),
            }
        })?;
        let manifest = Manifest::parse(&self.name, &content)?;

        let mut parts = Vec::with_capacity(manifest.parts.len());
        let mut type_names = Vec::with_capacity(manifest.parts.len());
        let mut causes = Vec::new();

        for entry in &manifest.parts {
            match self.registry.get(&entry.name) {
                Some(part) => {
                    type_names.push(Some(entry.name.clone()));
                    parts.push(Self::apply_overrides(part, entry));
                }
                None => {
                    type_names.push(None);
                    causes.push(format!("未注册的部件: {}", entry.name));
                }
            }
        }

        if !causes.is_empty() {
            warn!("{} 中有 {} 个部件无法加载", self.name, causes.len());
            return Err(CompositionError::PartialLoad { type_names, causes });
        }

        info!("加载清单 {} 完成: {} 个部件", resource, parts.len());
        Ok(parts)
    }

    fn apply_overrides(part: Arc<PartDefinition>, entry: &ManifestEntry) -> Arc<PartDefinition> {
        let mut part = part;
        if let Some(scope) = entry.scope.filter(|scope| *scope != part.scope) {
            part = Arc::new(part.with_scope(scope));
        }
        if let Some(policy) = entry
            .creation_policy
            .filter(|policy| *policy != part.creation_policy)
        {
            part = Arc::new(part.with_creation_policy(policy));
        }
        part
    }
}

impl PartCatalog for ManifestCatalog {
    fn parts(&self) -> Result<Vec<Arc<PartDefinition>>, CompositionError> {
        self.parts.get_or_try_init(|| self.load()).cloned()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for ManifestCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManifestCatalog")
            .field("path", &self.path)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}
