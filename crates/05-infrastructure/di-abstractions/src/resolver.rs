//! 依赖解析器抽象接口
//!
//! 提供解析上下文以及面向宿主的解析、注入接口

use crate::container::ExportProvider;
use crate::import::Importer;
use crate::part::ExportedValue;
use crate::storage::UnitStorage;
use infrastructure_common::{CompositionError, ContractName, ResolutionError};
use std::any::Any;
use std::sync::Arc;
use uuid::Uuid;

/// 解析上下文
///
/// 记录当前正在实例化的部件链，用于检测循环依赖和限制解析深度。
#[derive(Debug, Clone)]
pub struct ResolveContext {
    /// 当前解析链
    pub resolution_chain: Vec<(Uuid, String)>,
    /// 最大解析深度
    pub max_depth: usize,
}

impl ResolveContext {
    /// 创建新的解析上下文
    pub fn new() -> Self {
        Self::with_max_depth(100)
    }

    /// 创建指定最大深度的解析上下文
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            resolution_chain: Vec::new(),
            max_depth,
        }
    }

    /// 添加部件到解析链
    pub fn push_part(&mut self, id: Uuid, name: &str) -> Result<(), CompositionError> {
        if self.resolution_chain.iter().any(|(entry, _)| *entry == id) {
            return Err(CompositionError::CircularDependency {
                chain: format!("{} -> {}", self.describe_chain(), name),
            });
        }
        if self.resolution_chain.len() >= self.max_depth {
            return Err(CompositionError::ResolutionDepthExceeded {
                max_depth: self.max_depth,
                chain: self.describe_chain(),
            });
        }
        self.resolution_chain.push((id, name.to_string()));
        Ok(())
    }

    /// 从解析链中移除部件
    pub fn pop_part(&mut self) {
        self.resolution_chain.pop();
    }

    /// 当前解析深度
    pub fn depth(&self) -> usize {
        self.resolution_chain.len()
    }

    fn describe_chain(&self) -> String {
        self.resolution_chain
            .iter()
            .map(|(_, name)| name.as_str())
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

impl Default for ResolveContext {
    fn default() -> Self {
        Self::new()
    }
}

/// 依赖解析器 trait
///
/// 宿主按契约查询服务；工作单元句柄显式传入。
pub trait DependencyResolver: Send + Sync {
    /// 解析单个服务，未注册时返回 `None`
    fn get_service(
        &self,
        unit: &dyn UnitStorage,
        contract: &ContractName,
    ) -> Result<Option<ExportedValue>, ResolutionError>;

    /// 解析全部服务，未注册时返回空列表
    fn get_services(
        &self,
        unit: &dyn UnitStorage,
        contract: &ContractName,
    ) -> Result<Vec<ExportedValue>, ResolutionError>;

    /// 按类型解析单个服务
    fn resolve<T>(&self, unit: &dyn UnitStorage) -> Result<Option<Arc<T>>, ResolutionError>
    where
        T: ?Sized + Any + Send + Sync,
        Self: Sized,
    {
        let contract = ContractName::of::<T>();
        match self.get_service(unit, &contract)? {
            Some(value) => Ok(Some(value.cast::<T>(&contract)?)),
            None => Ok(None),
        }
    }

    /// 按类型解析全部服务
    fn resolve_all<T>(&self, unit: &dyn UnitStorage) -> Result<Vec<Arc<T>>, ResolutionError>
    where
        T: ?Sized + Any + Send + Sync,
        Self: Sized,
    {
        let contract = ContractName::of::<T>();
        self.get_services(unit, &contract)?
            .iter()
            .map(|value| value.cast::<T>(&contract).map_err(ResolutionError::from))
            .collect()
    }
}

/// 依赖构建器 trait
pub trait DependencyBuilder: Send + Sync {
    /// 对已构造的实例注入依赖并返回
    ///
    /// 注入在实例的副本上进行；失败被处理时返回未修改的原实例。
    fn build<T: Importer + Clone>(
        &self,
        unit: &dyn UnitStorage,
        service: T,
    ) -> Result<T, ResolutionError>;
}

/// 组合容器提供者 trait
pub trait CompositionContainerProvider: Send + Sync {
    /// 容器类型
    type Container: ExportProvider;

    /// 全局容器
    fn global_container(&self) -> Arc<Self::Container>;

    /// 当前工作单元的容器，首次访问时创建
    fn container(&self, unit: &dyn UnitStorage) -> Result<Arc<Self::Container>, ResolutionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_part_detects_cycle() {
        let mut context = ResolveContext::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        context.push_part(a, "A").unwrap();
        context.push_part(b, "B").unwrap();
        let error = context.push_part(a, "A").unwrap_err();

        match error {
            CompositionError::CircularDependency { chain } => assert_eq!(chain, "A -> B -> A"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_pop_part_allows_reentry() {
        let mut context = ResolveContext::new();
        let a = Uuid::new_v4();

        context.push_part(a, "A").unwrap();
        context.pop_part();
        assert!(context.push_part(a, "A").is_ok());
        assert_eq!(context.depth(), 1);
    }

    #[test]
    fn test_max_depth() {
        let mut context = ResolveContext::with_max_depth(2);
        context.push_part(Uuid::new_v4(), "A").unwrap();
        context.push_part(Uuid::new_v4(), "B").unwrap();

        assert!(matches!(
            context.push_part(Uuid::new_v4(), "C"),
            Err(CompositionError::ResolutionDepthExceeded { max_depth: 2, .. })
        ));
    }
}
