//! 作用域解析器
//!
//! 两级作用域：解析器构造时创建的全局容器，加上每个工作单元首次访问时创建的
//! 工作单元容器。工作单元容器以全局容器为父容器，本地未命中时回退查询。

use crate::catalog::FilteringCatalog;
use crate::container::CompositionContainer;
use crate::policy::PropagateErrors;
use crate::unit::UnitOfWork;
use di_abstractions::{
    CompositionContainerProvider, DependencyBuilder, DependencyResolver, ErrorOutcome,
    ErrorPolicy, ExportProvider, ExportedValue, Importer, Lookup, PartCatalog, ResolveContext,
    ResolverOptions, UnitItem, UnitStorage,
};
use infrastructure_common::{CompositionError, ContractName, PartCreationScope, ResolutionError};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// 作用域解析器
pub struct ScopedResolver {
    catalog: Arc<dyn PartCatalog>,
    global_catalog: Arc<dyn PartCatalog>,
    unit_catalog: Arc<dyn PartCatalog>,
    global: Arc<CompositionContainer>,
    options: ResolverOptions,
    policy: Arc<dyn ErrorPolicy>,
}

impl ScopedResolver {
    /// 使用默认配置和 [`PropagateErrors`] 策略创建解析器
    pub fn new(catalog: Arc<dyn PartCatalog>) -> Self {
        Self::with_options(catalog, ResolverOptions::default(), Arc::new(PropagateErrors))
    }

    /// 创建解析器
    ///
    /// 按创建作用域把目录划分为全局子目录和工作单元子目录，并立即创建全局容器。
    /// 目录在首次解析时才加载，因此构造本身不会失败。
    pub fn with_options(
        catalog: Arc<dyn PartCatalog>,
        options: ResolverOptions,
        policy: Arc<dyn ErrorPolicy>,
    ) -> Self {
        let global_catalog: Arc<dyn PartCatalog> = Arc::new(FilteringCatalog::by_scope(
            catalog.clone(),
            PartCreationScope::Global,
        ));
        let unit_catalog: Arc<dyn PartCatalog> = Arc::new(FilteringCatalog::by_scope(
            catalog.clone(),
            PartCreationScope::PerUnit,
        ));
        let global = Arc::new(CompositionContainer::new(global_catalog.clone()));

        info!(
            "创建作用域解析器: catalog={}, policy={}, strict_load_failures={}",
            catalog.name(),
            policy.name(),
            options.strict_load_failures
        );

        Self {
            catalog,
            global_catalog,
            unit_catalog,
            global,
            options,
            policy,
        }
    }

    /// 开始新的工作单元
    pub fn begin_unit(&self, name: impl Into<String>) -> UnitOfWork {
        UnitOfWork::new(name)
    }

    /// 完整目录
    pub fn catalog(&self) -> &Arc<dyn PartCatalog> {
        &self.catalog
    }

    /// 全局作用域子目录
    pub fn global_catalog(&self) -> &Arc<dyn PartCatalog> {
        &self.global_catalog
    }

    /// 工作单元作用域子目录
    pub fn unit_catalog(&self) -> &Arc<dyn PartCatalog> {
        &self.unit_catalog
    }

    /// 解析器配置
    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// 错误处理策略
    pub fn error_policy(&self) -> &dyn ErrorPolicy {
        self.policy.as_ref()
    }

    fn context(&self) -> ResolveContext {
        ResolveContext::with_max_depth(self.options.max_resolution_depth)
    }

    /// 处理组合失败
    ///
    /// 返回 `Ok(())` 表示错误已被策略处理，调用方应返回空结果。
    fn handle_failure(
        &self,
        operation: &str,
        target: &str,
        failure: CompositionError,
    ) -> Result<(), ResolutionError> {
        if failure.is_load_failure() && self.options.strict_load_failures {
            let message = failure.diagnostic_message();
            error!("{}失败 ({}): {}", operation, target, message);
            return Err(ResolutionError::Fatal {
                message,
                source: failure,
            });
        }

        match self.policy.handle(&failure) {
            ErrorOutcome::Handled => {
                warn!(
                    "{}失败 ({}), 已由策略 {} 处理: {}",
                    operation,
                    target,
                    self.policy.name(),
                    failure
                );
                Ok(())
            }
            ErrorOutcome::Propagate => {
                debug!("{}失败 ({}), 向调用方传播: {}", operation, target, failure);
                Err(ResolutionError::Composition { source: failure })
            }
        }
    }
}

impl CompositionContainerProvider for ScopedResolver {
    type Container = CompositionContainer;

    fn global_container(&self) -> Arc<CompositionContainer> {
        self.global.clone()
    }

    fn container(&self, unit: &dyn UnitStorage) -> Result<Arc<CompositionContainer>, ResolutionError> {
        let key = self.options.unit_container_key.as_str();
        let item = unit.get_or_insert_with(key, &mut || {
            let container =
                CompositionContainer::with_parent(self.unit_catalog.clone(), self.global.clone());
            info!("为工作单元创建组合容器: {}", container.id());
            Arc::new(container) as UnitItem
        });

        item.downcast::<CompositionContainer>()
            .map_err(|_| ResolutionError::InvalidUnitState {
                key: key.to_string(),
            })
    }
}

impl DependencyResolver for ScopedResolver {
    fn get_service(
        &self,
        unit: &dyn UnitStorage,
        contract: &ContractName,
    ) -> Result<Option<ExportedValue>, ResolutionError> {
        let container = self.container(unit)?;
        match container.get_exports_in(contract, Lookup::First, &mut self.context()) {
            Ok(exports) => Ok(exports.into_iter().next().map(|export| export.value)),
            Err(failure) => {
                self.handle_failure("解析服务", contract.as_str(), failure)?;
                Ok(None)
            }
        }
    }

    fn get_services(
        &self,
        unit: &dyn UnitStorage,
        contract: &ContractName,
    ) -> Result<Vec<ExportedValue>, ResolutionError> {
        let container = self.container(unit)?;
        match container.get_exports_in(contract, Lookup::All, &mut self.context()) {
            Ok(exports) => Ok(exports.into_iter().map(|export| export.value).collect()),
            Err(failure) => {
                self.handle_failure("解析服务列表", contract.as_str(), failure)?;
                Ok(Vec::new())
            }
        }
    }
}

impl DependencyBuilder for ScopedResolver {
    fn build<T: Importer + Clone>(
        &self,
        unit: &dyn UnitStorage,
        service: T,
    ) -> Result<T, ResolutionError> {
        let container = self.container(unit)?;
        // 写入阶段也可能失败，先在副本上注入
        let mut staged = service.clone();
        match container.satisfy_imports_in(&mut staged, &mut self.context()) {
            Ok(()) => Ok(staged),
            Err(failure) => {
                self.handle_failure("注入依赖", std::any::type_name::<T>(), failure)?;
                Ok(service)
            }
        }
    }
}

impl fmt::Debug for ScopedResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedResolver")
            .field("catalog", &self.catalog.name())
            .field("global", &self.global.id())
            .field("options", &self.options)
            .field("policy", &self.policy.name())
            .finish()
    }
}
