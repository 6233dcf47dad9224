//! 组合容器实现
//!
//! 按目录实例化部件，支持共享/非共享创建策略和父容器回退查询。

use dashmap::DashMap;
use di_abstractions::{
    Export, ExportDefinition, ExportProvider, Lookup, PartCatalog, PartContext, PartDefinition,
    PartInstance, ResolveContext,
};
use infrastructure_common::{CompositionError, ContractName, CreationPolicy};
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// 契约到 (部件, 导出下标) 的索引，保持目录顺序
type ExportIndex = HashMap<ContractName, Vec<(Arc<PartDefinition>, usize)>>;

/// 组合容器
pub struct CompositionContainer {
    /// 容器标识
    id: Uuid,
    /// 部件目录
    catalog: Arc<dyn PartCatalog>,
    /// 父容器
    parent: Option<Arc<dyn ExportProvider>>,
    /// 导出索引，首次查询时从目录加载
    index: OnceCell<ExportIndex>,
    /// 共享部件实例
    instances: DashMap<Uuid, Arc<OnceCell<PartInstance>>>,
}

impl CompositionContainer {
    /// 创建没有父容器的组合容器
    pub fn new(catalog: Arc<dyn PartCatalog>) -> Self {
        Self::build(catalog, None)
    }

    /// 创建带父容器的组合容器
    pub fn with_parent(catalog: Arc<dyn PartCatalog>, parent: Arc<dyn ExportProvider>) -> Self {
        Self::build(catalog, Some(parent))
    }

    fn build(catalog: Arc<dyn PartCatalog>, parent: Option<Arc<dyn ExportProvider>>) -> Self {
        let container = Self {
            id: Uuid::new_v4(),
            catalog,
            parent,
            index: OnceCell::new(),
            instances: DashMap::new(),
        };
        debug!(
            "创建组合容器: id={}, catalog={}, has_parent={}",
            container.id,
            container.catalog.name(),
            container.parent.is_some()
        );
        container
    }

    /// 容器标识
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// 部件目录
    pub fn catalog(&self) -> &Arc<dyn PartCatalog> {
        &self.catalog
    }

    /// 父容器
    pub fn parent(&self) -> Option<&Arc<dyn ExportProvider>> {
        self.parent.as_ref()
    }

    /// 已创建的共享实例数量
    pub fn shared_instance_count(&self) -> usize {
        self.instances
            .iter()
            .filter(|entry| entry.value().get().is_some())
            .count()
    }

    fn index(&self) -> Result<&ExportIndex, CompositionError> {
        self.index.get_or_try_init(|| {
            let parts = self.catalog.parts()?;
            let mut index = ExportIndex::new();
            for part in &parts {
                for (position, export) in part.exports.iter().enumerate() {
                    index
                        .entry(export.contract.clone())
                        .or_default()
                        .push((part.clone(), position));
                }
            }
            info!(
                "组合容器 {} 加载目录 {} 完成: {} 个部件, {} 个契约",
                self.id,
                self.catalog.name(),
                parts.len(),
                index.len()
            );
            Ok(index)
        })
    }

    fn instance(
        &self,
        part: &PartDefinition,
        context: &mut ResolveContext,
    ) -> Result<PartInstance, CompositionError> {
        context.push_part(part.id, &part.name)?;

        let result = match part.creation_policy {
            CreationPolicy::Shared => {
                let cell = self
                    .instances
                    .entry(part.id)
                    .or_insert_with(|| Arc::new(OnceCell::new()))
                    .clone();
                cell.get_or_try_init(|| self.create(part, context)).cloned()
            }
            CreationPolicy::NonShared => self.create(part, context),
        };

        context.pop_part();
        result
    }

    fn create(
        &self,
        part: &PartDefinition,
        context: &mut ResolveContext,
    ) -> Result<PartInstance, CompositionError> {
        debug!(
            "实例化部件: {} ({:?}, {:?}), 容器 {}",
            part.name, part.scope, part.creation_policy, self.id
        );
        let mut part_context = PartContext::new(self, context);
        (part.factory)(&mut part_context)
    }

    fn export(
        &self,
        contract: &ContractName,
        part: &PartDefinition,
        definition: &ExportDefinition,
        context: &mut ResolveContext,
    ) -> Result<Export, CompositionError> {
        let instance = self.instance(part, context)?;
        let value = (definition.project)(&instance).ok_or_else(|| {
            CompositionError::ContractTypeMismatch {
                contract: contract.to_string(),
                expected: part.name.clone(),
            }
        })?;
        Ok(Export {
            contract: contract.clone(),
            part: part.name.clone(),
            value,
        })
    }
}

impl ExportProvider for CompositionContainer {
    fn get_exports_in(
        &self,
        contract: &ContractName,
        lookup: Lookup,
        context: &mut ResolveContext,
    ) -> Result<Vec<Export>, CompositionError> {
        let mut exports = Vec::new();

        if let Some(entries) = self.index()?.get(contract) {
            for (part, position) in entries {
                exports.push(self.export(contract, part, &part.exports[*position], context)?);
                if lookup == Lookup::First {
                    return Ok(exports);
                }
            }
        }

        let consult_parent = match lookup {
            Lookup::First | Lookup::Nearest => exports.is_empty(),
            Lookup::All => true,
        };
        if consult_parent {
            if let Some(parent) = &self.parent {
                exports.extend(parent.get_exports_in(contract, lookup, context)?);
            }
        }

        Ok(exports)
    }
}

impl fmt::Debug for CompositionContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositionContainer")
            .field("id", &self.id)
            .field("catalog", &self.catalog.name())
            .field("has_parent", &self.parent.is_some())
            .field("shared_instances", &self.instances.len())
            .finish()
    }
}

impl Drop for CompositionContainer {
    fn drop(&mut self) {
        debug!("释放组合容器: id={}", self.id);
    }
}
