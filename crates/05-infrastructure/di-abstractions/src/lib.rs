//! # Dependency Injection Abstractions
//!
//! 组合抽象层，定义部件、目录、导出查询和作用域解析的核心接口。
//!
//! ## 核心接口
//!
//! - [`PartDefinition`] - 组合部件定义
//! - [`PartCatalog`] / [`PartFilter`] - 部件目录与过滤条件
//! - [`ExportProvider`] - 导出查询与一次性导入注入
//! - [`DependencyResolver`] / [`DependencyBuilder`] - 面向宿主的解析接口
//! - [`ErrorPolicy`] - 组合错误处理策略
//! - [`UnitStorage`] - 工作单元存储

pub mod catalog;
pub mod container;
pub mod import;
pub mod part;
pub mod policy;
pub mod resolver;
pub mod storage;

pub use catalog::*;
pub use container::*;
pub use import::*;
pub use part::*;
pub use policy::*;
pub use resolver::*;
pub use storage::*;
