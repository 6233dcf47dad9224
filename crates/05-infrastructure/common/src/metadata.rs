//! 元数据定义
//!
//! 提供导出与导入匹配所用的契约名称

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// 契约名称
///
/// 导出与导入之间按契约名称匹配。按类型注册的契约使用完整类型名。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractName(Cow<'static, str>);

impl ContractName {
    /// 使用任意名称创建契约
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// 使用类型名称创建契约
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self(Cow::Borrowed(std::any::type_name::<T>()))
    }

    /// 契约名称字符串
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContractName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContractName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ContractName {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}
