//! 导入抽象
//!
//! 描述部件或外部实例所需的依赖，以及部件工厂在实例化时使用的导入上下文。

use crate::container::ExportProvider;
use crate::part::ExportedValue;
use crate::resolver::ResolveContext;
use infrastructure_common::{CompositionError, ContractName};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// 导入基数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportCardinality {
    /// 恰好一个导出
    ExactlyOne,
    /// 零个或一个导出
    ZeroOrOne,
    /// 任意数量的导出
    ZeroOrMore,
}

impl ImportCardinality {
    /// 检查导出数量是否满足基数要求
    pub fn accepts(&self, count: usize) -> bool {
        match self {
            Self::ExactlyOne => count == 1,
            Self::ZeroOrOne => count <= 1,
            Self::ZeroOrMore => true,
        }
    }
}

impl fmt::Display for ImportCardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExactlyOne => f.write_str("恰好一个"),
            Self::ZeroOrOne => f.write_str("零个或一个"),
            Self::ZeroOrMore => f.write_str("任意个"),
        }
    }
}

/// 导入定义
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDefinition {
    /// 接收导入的成员名称
    pub member: String,
    /// 导入契约
    pub contract: ContractName,
    /// 导入基数
    pub cardinality: ImportCardinality,
}

impl ImportDefinition {
    /// 创建导入定义
    pub fn new(
        member: impl Into<String>,
        contract: impl Into<ContractName>,
        cardinality: ImportCardinality,
    ) -> Self {
        Self {
            member: member.into(),
            contract: contract.into(),
            cardinality,
        }
    }

    /// 按类型导入恰好一个
    pub fn one<T: ?Sized + 'static>(member: impl Into<String>) -> Self {
        Self::new(member, ContractName::of::<T>(), ImportCardinality::ExactlyOne)
    }

    /// 按类型导入零个或一个
    pub fn optional<T: ?Sized + 'static>(member: impl Into<String>) -> Self {
        Self::new(member, ContractName::of::<T>(), ImportCardinality::ZeroOrOne)
    }

    /// 按类型导入全部
    pub fn many<T: ?Sized + 'static>(member: impl Into<String>) -> Self {
        Self::new(member, ContractName::of::<T>(), ImportCardinality::ZeroOrMore)
    }

    /// 取出唯一的导入值
    pub fn cast_one<T: ?Sized + Any + Send + Sync>(
        &self,
        values: &[ExportedValue],
    ) -> Result<Arc<T>, CompositionError> {
        match values {
            [value] => value.cast::<T>(&self.contract),
            _ => Err(self.mismatch(values.len())),
        }
    }

    /// 取出可选的导入值
    pub fn cast_optional<T: ?Sized + Any + Send + Sync>(
        &self,
        values: &[ExportedValue],
    ) -> Result<Option<Arc<T>>, CompositionError> {
        match values {
            [] => Ok(None),
            [value] => value.cast::<T>(&self.contract).map(Some),
            _ => Err(self.mismatch(values.len())),
        }
    }

    /// 取出全部导入值
    pub fn cast_many<T: ?Sized + Any + Send + Sync>(
        &self,
        values: &[ExportedValue],
    ) -> Result<Vec<Arc<T>>, CompositionError> {
        values
            .iter()
            .map(|value| value.cast::<T>(&self.contract))
            .collect()
    }

    /// 构造基数不匹配错误
    pub fn mismatch(&self, actual: usize) -> CompositionError {
        CompositionError::CardinalityMismatch {
            contract: self.contract.to_string(),
            expected: self.cardinality.to_string(),
            actual,
        }
    }
}

/// 可注入导入的实例
///
/// 外部已构造的实例实现此 trait 后可以交给容器做一次性导入注入。
pub trait Importer {
    /// 实例声明的导入
    fn imports(&self) -> Vec<ImportDefinition>;

    /// 写入一个已解析的导入
    fn set_import(
        &mut self,
        import: &ImportDefinition,
        values: Vec<ExportedValue>,
    ) -> Result<(), CompositionError>;
}

/// 部件导入上下文
///
/// 部件工厂通过它从所属容器（及其父容器）解析自己的依赖。
pub struct PartContext<'a> {
    provider: &'a dyn ExportProvider,
    context: &'a mut ResolveContext,
}

impl<'a> PartContext<'a> {
    /// 创建导入上下文
    pub fn new(provider: &'a dyn ExportProvider, context: &'a mut ResolveContext) -> Self {
        Self { provider, context }
    }

    /// 按导入定义解析导出值
    pub fn import_values(
        &mut self,
        import: &ImportDefinition,
    ) -> Result<Vec<ExportedValue>, CompositionError> {
        self.provider.resolve_import(import, &mut *self.context)
    }

    /// 导入恰好一个指定类型的依赖
    pub fn import<T: ?Sized + Any + Send + Sync>(&mut self) -> Result<Arc<T>, CompositionError> {
        let import = ImportDefinition::one::<T>(std::any::type_name::<T>());
        let values = self.import_values(&import)?;
        import.cast_one(&values)
    }

    /// 导入零个或一个指定类型的依赖
    pub fn import_optional<T: ?Sized + Any + Send + Sync>(
        &mut self,
    ) -> Result<Option<Arc<T>>, CompositionError> {
        let import = ImportDefinition::optional::<T>(std::any::type_name::<T>());
        let values = self.import_values(&import)?;
        import.cast_optional(&values)
    }

    /// 导入指定类型的全部依赖
    pub fn import_many<T: ?Sized + Any + Send + Sync>(
        &mut self,
    ) -> Result<Vec<Arc<T>>, CompositionError> {
        let import = ImportDefinition::many::<T>(std::any::type_name::<T>());
        let values = self.import_values(&import)?;
        import.cast_many(&values)
    }

    /// 按契约名称导入恰好一个依赖
    pub fn import_contract<T: ?Sized + Any + Send + Sync>(
        &mut self,
        contract: impl Into<ContractName>,
    ) -> Result<Arc<T>, CompositionError> {
        let contract = contract.into();
        let import = ImportDefinition::new(
            contract.to_string(),
            contract,
            ImportCardinality::ExactlyOne,
        );
        let values = self.import_values(&import)?;
        import.cast_one(&values)
    }
}
