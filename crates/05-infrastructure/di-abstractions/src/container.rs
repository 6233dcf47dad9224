//! 组合容器抽象接口
//!
//! 提供导出查询、父容器回退以及一次性导入注入的核心抽象

use crate::import::{ImportCardinality, ImportDefinition, Importer};
use crate::part::ExportedValue;
use crate::resolver::ResolveContext;
use infrastructure_common::{CompositionError, ContractName};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// 默认的工作单元容器存储键
pub const DEFAULT_UNIT_CONTAINER_KEY: &str = "__ScopedResolver_Container";

/// 导出查询方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// 只取第一个匹配的导出：先查本地，未命中再查父容器
    First,
    /// 取最近一层作用域中的全部导出：本地有匹配就不再查父容器
    Nearest,
    /// 取全部导出：本地导出在前，父容器导出在后
    All,
}

impl Lookup {
    /// 导入基数对应的查询方式
    pub fn for_cardinality(cardinality: ImportCardinality) -> Self {
        match cardinality {
            ImportCardinality::ZeroOrMore => Self::All,
            ImportCardinality::ExactlyOne | ImportCardinality::ZeroOrOne => Self::Nearest,
        }
    }
}

/// 导出
#[derive(Debug, Clone)]
pub struct Export {
    /// 导出契约
    pub contract: ContractName,
    /// 提供导出的部件名称
    pub part: String,
    /// 导出值
    pub value: ExportedValue,
}

/// 导出提供者 trait
///
/// 组合容器对外提供的查询能力。子容器在本地未命中时回退到父容器。
pub trait ExportProvider: Send + Sync {
    /// 在给定解析上下文中查询导出
    fn get_exports_in(
        &self,
        contract: &ContractName,
        lookup: Lookup,
        context: &mut ResolveContext,
    ) -> Result<Vec<Export>, CompositionError>;

    /// 查询契约的全部导出
    fn get_exports(&self, contract: &ContractName) -> Result<Vec<Export>, CompositionError> {
        self.get_exports_in(contract, Lookup::All, &mut ResolveContext::new())
    }

    /// 查询契约的第一个导出
    fn get_export(&self, contract: &ContractName) -> Result<Option<Export>, CompositionError> {
        Ok(self
            .get_exports_in(contract, Lookup::First, &mut ResolveContext::new())?
            .into_iter()
            .next())
    }

    /// 按导入定义解析导出值并检查基数
    fn resolve_import(
        &self,
        import: &ImportDefinition,
        context: &mut ResolveContext,
    ) -> Result<Vec<ExportedValue>, CompositionError> {
        let exports = self.get_exports_in(
            &import.contract,
            Lookup::for_cardinality(import.cardinality),
            context,
        )?;

        if !import.cardinality.accepts(exports.len()) {
            return Err(import.mismatch(exports.len()));
        }

        Ok(exports.into_iter().map(|export| export.value).collect())
    }

    /// 对实例做一次性导入注入
    fn satisfy_imports_once(&self, target: &mut dyn Importer) -> Result<(), CompositionError> {
        self.satisfy_imports_in(target, &mut ResolveContext::new())
    }

    /// 在给定解析上下文中对实例做一次性导入注入
    ///
    /// 先解析全部导入，再依次写入；解析阶段失败时实例保持不变，
    /// 写入阶段失败时已写入的导入不会回滚。
    fn satisfy_imports_in(
        &self,
        target: &mut dyn Importer,
        context: &mut ResolveContext,
    ) -> Result<(), CompositionError> {
        let imports = target.imports();

        let mut resolved = Vec::with_capacity(imports.len());
        for import in &imports {
            resolved.push(self.resolve_import(import, context)?);
        }

        for (import, values) in imports.iter().zip(resolved) {
            debug!("注入导入: member={}, contract={}", import.member, import.contract);
            target.set_import(import, values)?;
        }

        Ok(())
    }
}

/// 解析器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverOptions {
    /// 工作单元存储中保存工作单元容器的键
    pub unit_container_key: String,
    /// 加载类失败是否总是致命（不交给错误策略）
    pub strict_load_failures: bool,
    /// 最大解析深度
    pub max_resolution_depth: usize,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            unit_container_key: DEFAULT_UNIT_CONTAINER_KEY.to_string(),
            strict_load_failures: true,
            max_resolution_depth: 100,
        }
    }
}
