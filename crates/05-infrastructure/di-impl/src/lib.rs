//! # 组合容器具体实现
//!
//! 提供组合引擎、部件目录、工作单元、错误处理策略以及两级作用域解析器。
//!
//! ```text
//! ScopedResolver
//!   ├── 全局容器      (FilteringCatalog: PartCreationScope::Global)
//!   └── 工作单元容器  (FilteringCatalog: PartCreationScope::PerUnit, 父容器 = 全局容器)
//! ```

pub mod catalog;
pub mod container;
pub mod manifest;
pub mod policy;
pub mod resolver;
pub mod unit;

pub use catalog::{AggregateCatalog, FilteringCatalog, TypeCatalog};
pub use container::CompositionContainer;
pub use manifest::{Manifest, ManifestCatalog, ManifestEntry, PartRegistry};
pub use policy::{FnErrorPolicy, PropagateErrors, SuppressErrors};
pub use resolver::ScopedResolver;
pub use unit::UnitOfWork;
