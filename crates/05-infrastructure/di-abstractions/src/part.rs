//! 组合部件抽象
//!
//! 部件是组合容器可以实例化的实现单元，携带作用域标记、导出和导入声明。

use crate::import::{ImportDefinition, PartContext};
use infrastructure_common::{CompositionError, ContractName, CreationPolicy, PartCreationScope};
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use uuid::Uuid;

/// 部件实例（类型擦除）
pub type PartInstance = Arc<dyn Any + Send + Sync>;

/// 部件工厂函数类型
pub type PartFactoryFn =
    Arc<dyn Fn(&mut PartContext<'_>) -> Result<PartInstance, CompositionError> + Send + Sync>;

/// 导出投影函数类型，把部件实例投影为某个契约下的导出值
pub type ExportProjectionFn = Arc<dyn Fn(&PartInstance) -> Option<ExportedValue> + Send + Sync>;

/// 导出值
///
/// 内部保存 `Arc<I>`，因此既能承载具体类型也能承载 trait 对象。
#[derive(Clone)]
pub struct ExportedValue {
    inner: Arc<dyn Any + Send + Sync>,
}

impl ExportedValue {
    /// 包装一个共享值
    pub fn new<I: ?Sized + Any + Send + Sync>(value: Arc<I>) -> Self {
        Self {
            inner: Arc::new(value),
        }
    }

    /// 按类型取出导出值
    pub fn downcast<I: ?Sized + Any + Send + Sync>(&self) -> Option<Arc<I>> {
        self.inner.downcast_ref::<Arc<I>>().cloned()
    }

    /// 检查导出值是否为指定类型
    pub fn is<I: ?Sized + Any + Send + Sync>(&self) -> bool {
        self.inner.is::<Arc<I>>()
    }

    /// 按类型取出导出值，类型不符时返回契约类型错误
    pub fn cast<I: ?Sized + Any + Send + Sync>(
        &self,
        contract: &ContractName,
    ) -> Result<Arc<I>, CompositionError> {
        self.downcast::<I>()
            .ok_or_else(|| CompositionError::ContractTypeMismatch {
                contract: contract.to_string(),
                expected: std::any::type_name::<I>().to_string(),
            })
    }
}

impl fmt::Debug for ExportedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportedValue").finish_non_exhaustive()
    }
}

/// 导出定义
#[derive(Clone)]
pub struct ExportDefinition {
    /// 导出契约
    pub contract: ContractName,
    /// 实例到导出值的投影
    pub project: ExportProjectionFn,
}

impl fmt::Debug for ExportDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportDefinition")
            .field("contract", &self.contract)
            .field("project", &"<function>")
            .finish()
    }
}

/// 部件定义
#[derive(Clone)]
pub struct PartDefinition {
    /// 部件唯一标识
    pub id: Uuid,
    /// 部件名称
    pub name: String,
    /// 创建作用域
    pub scope: PartCreationScope,
    /// 创建策略
    pub creation_policy: CreationPolicy,
    /// 导出列表
    pub exports: Vec<ExportDefinition>,
    /// 声明的导入（仅用于诊断）
    pub imports: Vec<ImportDefinition>,
    /// 实例工厂
    pub factory: PartFactoryFn,
}

impl PartDefinition {
    /// 创建部件构建器
    pub fn builder<T, F>(name: impl Into<String>, factory: F) -> PartBuilder<T>
    where
        T: Any + Send + Sync,
        F: Fn(&mut PartContext<'_>) -> Result<T, CompositionError> + Send + Sync + 'static,
    {
        PartBuilder::new(name, factory)
    }

    /// 复制部件定义并替换作用域（生成新的标识）
    pub fn with_scope(&self, scope: PartCreationScope) -> Self {
        Self {
            id: Uuid::new_v4(),
            scope,
            ..self.clone()
        }
    }

    /// 复制部件定义并替换创建策略（生成新的标识）
    pub fn with_creation_policy(&self, creation_policy: CreationPolicy) -> Self {
        Self {
            id: Uuid::new_v4(),
            creation_policy,
            ..self.clone()
        }
    }

    /// 获取指定契约的导出定义
    pub fn exports_for<'a>(
        &'a self,
        contract: &'a ContractName,
    ) -> impl Iterator<Item = &'a ExportDefinition> + 'a {
        self.exports.iter().filter(move |export| &export.contract == contract)
    }

    /// 是否导出指定契约
    pub fn exports_contract(&self, contract: &ContractName) -> bool {
        self.exports_for(contract).next().is_some()
    }
}

impl fmt::Debug for PartDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartDefinition")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("scope", &self.scope)
            .field("creation_policy", &self.creation_policy)
            .field("exports", &self.exports)
            .field("imports", &self.imports)
            .field("factory", &"<function>")
            .finish()
    }
}

/// 部件构建器
pub struct PartBuilder<T> {
    name: String,
    scope: PartCreationScope,
    creation_policy: CreationPolicy,
    exports: Vec<ExportDefinition>,
    imports: Vec<ImportDefinition>,
    factory: PartFactoryFn,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> PartBuilder<T> {
    fn new<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&mut PartContext<'_>) -> Result<T, CompositionError> + Send + Sync + 'static,
    {
        let factory: PartFactoryFn =
            Arc::new(move |ctx| factory(ctx).map(|instance| Arc::new(instance) as PartInstance));
        Self {
            name: name.into(),
            scope: PartCreationScope::default(),
            creation_policy: CreationPolicy::default(),
            exports: Vec::new(),
            imports: Vec::new(),
            factory,
            _marker: PhantomData,
        }
    }

    /// 设置创建作用域
    pub fn scope(mut self, scope: PartCreationScope) -> Self {
        self.scope = scope;
        self
    }

    /// 设置创建策略
    pub fn creation_policy(mut self, creation_policy: CreationPolicy) -> Self {
        self.creation_policy = creation_policy;
        self
    }

    /// 以自身类型导出
    pub fn export(self) -> Self {
        self.export_contract(ContractName::of::<T>())
    }

    /// 以指定契约名称导出自身
    pub fn export_contract(mut self, contract: impl Into<ContractName>) -> Self {
        let project: ExportProjectionFn = Arc::new(|instance: &PartInstance| {
            instance.clone().downcast::<T>().ok().map(ExportedValue::new)
        });
        self.exports.push(ExportDefinition {
            contract: contract.into(),
            project,
        });
        self
    }

    /// 以接口类型导出，`cast` 负责把实例转换为接口
    pub fn export_as<I, F>(self, cast: F) -> Self
    where
        I: ?Sized + Any + Send + Sync,
        F: Fn(Arc<T>) -> Arc<I> + Send + Sync + 'static,
    {
        self.export_as_contract(ContractName::of::<I>(), cast)
    }

    /// 以接口类型和指定契约名称导出
    pub fn export_as_contract<I, F>(mut self, contract: impl Into<ContractName>, cast: F) -> Self
    where
        I: ?Sized + Any + Send + Sync,
        F: Fn(Arc<T>) -> Arc<I> + Send + Sync + 'static,
    {
        let project: ExportProjectionFn = Arc::new(move |instance: &PartInstance| {
            instance
                .clone()
                .downcast::<T>()
                .ok()
                .map(|typed| ExportedValue::new(cast(typed)))
        });
        self.exports.push(ExportDefinition {
            contract: contract.into(),
            project,
        });
        self
    }

    /// 声明一个导入
    pub fn import(mut self, import: ImportDefinition) -> Self {
        self.imports.push(import);
        self
    }

    /// 构建部件定义；未声明任何导出时以自身类型导出
    pub fn build(self) -> PartDefinition {
        let builder = if self.exports.is_empty() {
            self.export()
        } else {
            self
        };
        PartDefinition {
            id: Uuid::new_v4(),
            name: builder.name,
            scope: builder.scope,
            creation_policy: builder.creation_policy,
            exports: builder.exports,
            imports: builder.imports,
            factory: builder.factory,
        }
    }
}
