//! # 基础设施组合层
//!
//! 负责把部件目录、配置和错误处理策略组装成可用的作用域解析器。
//!
//! ## 主要功能
//!
//! - **解析器构建器**: 使用构建者模式组装 [`ScopedResolver`](di_impl::ScopedResolver)
//! - **配置加载**: 通过 `config` crate 从 TOML 文件和环境变量加载解析器配置
//! - **日志初始化**: 按配置初始化 `tracing-subscriber`
//!
//! ## 基本使用
//!
//! ```rust,no_run
//! use di_abstractions::{DependencyResolver, PartDefinition};
//! use infrastructure_common::PartCreationScope;
//! use infrastructure_composition::ResolverBuilder;
//!
//! #[derive(Debug)]
//! struct RequestContext;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let resolver = ResolverBuilder::new()
//!         .load_settings("config/resolver.toml")?
//!         .add_part(
//!             PartDefinition::builder("RequestContext", |_| Ok(RequestContext))
//!                 .scope(PartCreationScope::PerUnit)
//!                 .build(),
//!         )
//!         .build()?;
//!
//!     let unit = resolver.begin_unit("request-1");
//!     let context = resolver.resolve::<RequestContext>(&unit)?;
//!     println!("解析结果: {:?}", context);
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod settings;

#[cfg(test)]
mod tests;

// 重新导出主要类型
pub use builder::{LoggingConfig, ResolverBuilder};
pub use settings::{ErrorPolicyKind, LoggingSettings, ResolverSettings, ENV_PREFIX};

// 重新导出错误类型
pub use infrastructure_common::InfrastructureError;
