//! # Infrastructure Common
//!
//! 这个 crate 提供了 Lorn ADSP 组合基础设施的公共类型。
//!
//! ## 核心类型
//!
//! - [`ContractName`] - 导出与导入匹配所用的契约名称
//! - [`PartCreationScope`] - 部件创建作用域（全局 / 工作单元）
//! - [`CreationPolicy`] - 部件创建策略（共享 / 非共享）
//! - [`CompositionError`] / [`ResolutionError`] - 组合与解析错误
//!
//! ## 设计原则
//!
//! - 基于 Rust 类型系统的编译时安全
//! - 作用域显式传递，不依赖环境中的隐式状态

pub mod errors;
pub mod lifecycle;
pub mod metadata;

pub use errors::*;
pub use lifecycle::*;
pub use metadata::*;
