//! 解析器配置
//!
//! 通过 `config` crate 从可选的配置文件和 `ADSP` 前缀的环境变量加载：
//!
//! ```toml
//! error_policy = "propagate"
//! manifests = ["config/parts.toml"]
//!
//! [resolver]
//! strict_load_failures = true
//! max_resolution_depth = 64
//!
//! [logging]
//! enabled = true
//! level = "debug"
//! ```
//!
//! 环境变量使用 `__` 分隔层级，例如 `ADSP__RESOLVER__MAX_RESOLUTION_DEPTH=32`。

use crate::builder::LoggingConfig;
use di_abstractions::{ErrorPolicy, ResolverOptions};
use di_impl::{PropagateErrors, SuppressErrors};
use infrastructure_common::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, error};

/// 默认环境变量前缀
pub const ENV_PREFIX: &str = "ADSP";

/// 环境变量层级分隔符
pub const ENV_SEPARATOR: &str = "__";

/// 配置中可选的错误处理策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicyKind {
    #[default]
    Propagate,
    Suppress,
}

impl ErrorPolicyKind {
    /// 创建对应的策略实例
    pub fn create(&self) -> Arc<dyn ErrorPolicy> {
        match self {
            Self::Propagate => Arc::new(PropagateErrors),
            Self::Suppress => Arc::new(SuppressErrors),
        }
    }
}

/// 日志配置节
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// 是否在构建解析器时初始化日志
    pub enabled: bool,
    pub level: String,
    pub json: bool,
    pub show_target: bool,
    pub show_thread_ids: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "info".to_string(),
            json: false,
            show_target: true,
            show_thread_ids: false,
        }
    }
}

impl LoggingSettings {
    /// 转换为日志配置
    pub fn to_logging_config(&self) -> ConfigResult<LoggingConfig> {
        let level = tracing::Level::from_str(&self.level).map_err(|_| ConfigError::ValidationError {
            message: format!("无效的日志级别: {}", self.level),
        })?;
        Ok(LoggingConfig {
            level,
            show_target: self.show_target,
            show_thread_ids: self.show_thread_ids,
            json_format: self.json,
            ..LoggingConfig::default()
        })
    }
}

/// 解析器配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverSettings {
    /// 解析器选项
    pub resolver: ResolverOptions,
    /// 未显式指定策略时使用的错误处理策略
    pub error_policy: ErrorPolicyKind,
    /// 日志配置
    pub logging: LoggingSettings,
    /// 清单目录文件
    pub manifests: Vec<PathBuf>,
}

impl ResolverSettings {
    /// 从配置文件和默认前缀的环境变量加载
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    /// 从配置文件和指定前缀的环境变量加载
    pub fn load_with_prefix(path: Option<&Path>, env_prefix: &str) -> ConfigResult<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                });
            }
            debug!("加载解析器配置文件: {}", path.display());
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(env_prefix)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| {
                error!("配置构建失败: {}", e);
                ConfigError::ParseError {
                    source: Box::new(e),
                }
            })?;

        let settings: Self = settings.try_deserialize().map_err(|e| {
            error!("配置绑定失败: {}", e);
            ConfigError::ParseError {
                source: Box::new(e),
            }
        })?;

        settings.validate()?;
        Ok(settings)
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.resolver.unit_container_key.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "resolver.unit_container_key 不能为空".to_string(),
            });
        }
        if self.resolver.max_resolution_depth == 0 {
            return Err(ConfigError::ValidationError {
                message: "resolver.max_resolution_depth 必须大于 0".to_string(),
            });
        }
        self.logging.to_logging_config()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use di_abstractions::DEFAULT_UNIT_CONTAINER_KEY;
    use std::io::Write;

    fn settings_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_defaults_without_sources() {
        let settings = ResolverSettings::load_with_prefix(None, "ADSP_TEST_EMPTY").unwrap();
        assert_eq!(settings, ResolverSettings::default());
        assert_eq!(settings.resolver.unit_container_key, DEFAULT_UNIT_CONTAINER_KEY);
        assert!(!settings.logging.enabled);
    }

    #[test]
    fn test_load_from_toml_file() {
        let file = settings_file(
            r#"
error_policy = "suppress"
manifests = ["parts/web.toml", "parts/jobs.toml"]

[resolver]
strict_load_failures = false
max_resolution_depth = 16

[logging]
enabled = true
level = "debug"
json = true
"#,
        );

        let settings =
            ResolverSettings::load_with_prefix(Some(file.path()), "ADSP_TEST_FILE").unwrap();

        assert_eq!(settings.error_policy, ErrorPolicyKind::Suppress);
        assert_eq!(settings.manifests.len(), 2);
        assert!(!settings.resolver.strict_load_failures);
        assert_eq!(settings.resolver.max_resolution_depth, 16);
        assert_eq!(settings.resolver.unit_container_key, DEFAULT_UNIT_CONTAINER_KEY);

        let logging = settings.logging.to_logging_config().unwrap();
        assert_eq!(logging.level, tracing::Level::DEBUG);
        assert!(logging.json_format);
    }

    #[test]
    fn test_environment_overrides_file() {
        let file = settings_file("[resolver]\nmax_resolution_depth = 16\n");
        std::env::set_var("ADSP_TEST_ENV__RESOLVER__MAX_RESOLUTION_DEPTH", "8");

        let settings =
            ResolverSettings::load_with_prefix(Some(file.path()), "ADSP_TEST_ENV").unwrap();
        std::env::remove_var("ADSP_TEST_ENV__RESOLVER__MAX_RESOLUTION_DEPTH");

        assert_eq!(settings.resolver.max_resolution_depth, 8);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result =
            ResolverSettings::load_with_prefix(Some(&dir.path().join("absent.toml")), "ADSP_TEST_MISSING");
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_validation() {
        let mut settings = ResolverSettings::default();
        assert!(settings.validate().is_ok());

        settings.resolver.max_resolution_depth = 0;
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::ValidationError { .. })
        ));

        let mut settings = ResolverSettings::default();
        settings.logging.level = "loud".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_policy_kind_creates_policy() {
        assert_eq!(ErrorPolicyKind::default().create().name(), "PropagateErrors");
        assert_eq!(ErrorPolicyKind::Suppress.create().name(), "SuppressErrors");
    }
}
