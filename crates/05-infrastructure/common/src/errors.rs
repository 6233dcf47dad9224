//! 错误类型定义

use thiserror::Error;

/// 部件加载失败时在类型列表中的占位名称
pub const UNLOADED_TYPE_PLACEHOLDER: &str = "<未加载>";

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    #[error("配置解析失败: {source}")]
    ParseError {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("配置验证失败: {message}")]
    ValidationError { message: String },
}

/// 组合错误类型
///
/// 组合引擎在加载目录、创建部件或匹配导入导出时产生的错误。
#[derive(Error, Debug)]
pub enum CompositionError {
    #[error("部件的底层资源不存在: {resource}, 原因: {detail}")]
    MissingBackingResource { resource: String, detail: String },

    #[error("部分部件加载失败: {} 个原因", .causes.len())]
    PartialLoad {
        /// 每个条目一个槽位，加载失败的槽位为 `None`
        type_names: Vec<Option<String>>,
        /// 每个失败条目一个原因
        causes: Vec<String>,
    },

    #[error("部件目录无效: {catalog}, 原因: {message}")]
    InvalidCatalog { catalog: String, message: String },

    #[error("部件创建失败: {part}, 原因: {source}")]
    PartCreationFailed {
        part: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("导入基数不匹配: {contract}, 期望 {expected}, 实际 {actual} 个导出")]
    CardinalityMismatch {
        contract: String,
        expected: String,
        actual: usize,
    },

    #[error("契约 {contract} 的导出值不是 {expected} 类型")]
    ContractTypeMismatch { contract: String, expected: String },

    #[error("检测到循环依赖: {chain}")]
    CircularDependency { chain: String },

    #[error("解析深度超过上限 {max_depth}: {chain}")]
    ResolutionDepthExceeded { max_depth: usize, chain: String },
}

impl CompositionError {
    /// 创建部件创建失败错误
    pub fn creation_failed(
        part: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::PartCreationFailed {
            part: part.into(),
            source: source.into(),
        }
    }

    /// 是否为加载类失败（底层资源缺失或部分加载失败）
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            Self::MissingBackingResource { .. } | Self::PartialLoad { .. }
        )
    }

    /// 生成列出全部根因的诊断消息
    pub fn diagnostic_message(&self) -> String {
        match self {
            Self::MissingBackingResource { resource, detail } => {
                format!("组合部件时发生错误。原因: {} ({})", detail, resource)
            }
            Self::PartialLoad { type_names, causes } => {
                let types = type_names
                    .iter()
                    .map(|name| name.as_deref().unwrap_or(UNLOADED_TYPE_PLACEHOLDER))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!(
                    "组合部件时发生错误。类型: {} , 原因: {}",
                    types,
                    causes.join("\n下一个原因: ")
                )
            }
            other => format!("组合部件时发生错误。原因: {}", other),
        }
    }
}

/// 解析错误类型
///
/// 解析器对调用方暴露的错误。
#[derive(Error, Debug)]
pub enum ResolutionError {
    /// 不可抑制的加载失败，消息中列出全部根因
    #[error("{message}")]
    Fatal {
        message: String,
        #[source]
        source: CompositionError,
    },

    /// 错误策略未处理的组合失败
    #[error("组合失败: {source}")]
    Composition {
        #[from]
        source: CompositionError,
    },

    #[error("工作单元存储中的键 {key} 不是组合容器")]
    InvalidUnitState { key: String },
}

impl ResolutionError {
    /// 获取底层组合错误
    pub fn composition_error(&self) -> Option<&CompositionError> {
        match self {
            Self::Fatal { source, .. } | Self::Composition { source } => Some(source),
            Self::InvalidUnitState { .. } => None,
        }
    }

    /// 是否为不可抑制的致命错误
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal { .. })
    }
}

/// 基础设施错误类型
#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("配置错误: {source}")]
    ConfigError {
        #[from]
        source: ConfigError,
    },

    #[error("组合错误: {source}")]
    CompositionError {
        #[from]
        source: CompositionError,
    },

    #[error("基础设施启动失败: {message}")]
    BootstrapFailed { message: String },
}

/// 结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type CompositionResult<T> = Result<T, CompositionError>;
pub type ResolutionResult<T> = Result<T, ResolutionError>;
pub type InfrastructureResult<T> = Result<T, InfrastructureError>;
