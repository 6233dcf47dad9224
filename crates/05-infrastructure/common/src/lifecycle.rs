//! 部件生命周期管理

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 部件创建作用域
///
/// 决定部件在全局容器还是工作单元容器中实例化。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartCreationScope {
    /// 全局作用域 - 整个进程生命周期内由全局容器持有
    Global,
    /// 工作单元作用域 - 每个工作单元（例如一次请求）各自持有
    PerUnit,
}

impl Default for PartCreationScope {
    fn default() -> Self {
        Self::Global
    }
}

impl fmt::Display for PartCreationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str("global"),
            Self::PerUnit => f.write_str("per_unit"),
        }
    }
}

impl FromStr for PartCreationScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "global" => Ok(Self::Global),
            "per_unit" | "perunit" | "per_request" | "perrequest" => Ok(Self::PerUnit),
            other => Err(format!("未知的部件作用域: {}", other)),
        }
    }
}

/// 部件创建策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreationPolicy {
    /// 共享 - 每个容器内只创建一个实例
    Shared,
    /// 非共享 - 每次获取导出都创建新实例
    NonShared,
}

impl Default for CreationPolicy {
    fn default() -> Self {
        Self::Shared
    }
}
