//! 作用域解析器构建器

use crate::settings::ResolverSettings;
use di_abstractions::{ErrorPolicy, PartCatalog, PartDefinition};
use di_impl::{AggregateCatalog, ManifestCatalog, PartRegistry, ScopedResolver, TypeCatalog};
use infrastructure_common::InfrastructureError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 作用域解析器构建器
///
/// 使用建造者模式汇总部件目录、配置和错误处理策略
pub struct ResolverBuilder {
    /// 额外的部件目录
    catalogs: Vec<Arc<dyn PartCatalog>>,
    /// 直接添加的部件
    parts: Vec<PartDefinition>,
    /// 清单目录文件
    manifests: Vec<PathBuf>,
    /// 清单目录使用的部件注册表
    registry: Arc<PartRegistry>,
    /// 解析器配置
    settings: ResolverSettings,
    /// 显式指定的错误处理策略
    error_policy: Option<Arc<dyn ErrorPolicy>>,
    /// 是否启用日志初始化
    logging_enabled: bool,
    /// 日志配置
    logging_config: LoggingConfig,
}

impl ResolverBuilder {
    /// 创建新的解析器构建器
    pub fn new() -> Self {
        Self {
            catalogs: Vec::new(),
            parts: Vec::new(),
            manifests: Vec::new(),
            registry: Arc::new(PartRegistry::new()),
            settings: ResolverSettings::default(),
            error_policy: None,
            logging_enabled: false, // 默认不启用日志初始化
            logging_config: LoggingConfig::default(),
        }
    }

    /// 添加部件目录
    pub fn add_catalog(mut self, catalog: Arc<dyn PartCatalog>) -> Self {
        debug!("添加部件目录: {}", catalog.name());
        self.catalogs.push(catalog);
        self
    }

    /// 添加部件
    pub fn add_part(mut self, part: PartDefinition) -> Self {
        debug!("添加部件: {} ({})", part.name, part.scope);
        self.parts.push(part);
        self
    }

    /// 批量添加部件
    pub fn add_parts(mut self, parts: impl IntoIterator<Item = PartDefinition>) -> Self {
        self.parts.extend(parts);
        self
    }

    /// 在注册表中登记部件，供清单目录引用
    pub fn register_part(self, part: PartDefinition) -> Self {
        self.registry.register(part);
        self
    }

    /// 使用指定的部件注册表
    pub fn with_registry(mut self, registry: Arc<PartRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// 添加清单目录
    ///
    /// 清单文件在首次解析时才读取，文件缺失会在那时报告。
    pub fn add_manifest<P: AsRef<Path>>(mut self, path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        info!("添加清单目录: {}", path.display());
        self.manifests.push(path);
        self
    }

    /// 使用指定配置
    pub fn with_settings(mut self, settings: ResolverSettings) -> Self {
        self.settings = settings;
        self
    }

    /// 从配置文件和环境变量加载配置
    pub fn load_settings<P: AsRef<Path>>(self, path: P) -> Result<Self, InfrastructureError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(InfrastructureError::BootstrapFailed {
                message: format!("配置文件不存在: {}", path.display()),
            });
        }

        info!("加载解析器配置: {}", path.display());
        let settings = ResolverSettings::load(Some(path))?;
        let mut builder = self;
        if settings.logging.enabled {
            builder.logging_config = settings.logging.to_logging_config()?;
            builder.logging_enabled = true;
        }
        Ok(builder.with_settings(settings))
    }

    /// 使用指定的错误处理策略
    pub fn with_error_policy(mut self, policy: Arc<dyn ErrorPolicy>) -> Self {
        self.error_policy = Some(policy);
        self
    }

    /// 启用日志系统
    pub fn with_logging(mut self, config: LoggingConfig) -> Self {
        self.logging_config = config;
        self.logging_enabled = true; // 启用日志初始化
        self
    }

    /// 构建作用域解析器
    pub fn build(self) -> Result<ScopedResolver, InfrastructureError> {
        // 只有在明确配置了日志时才初始化日志
        // 避免在测试环境中重复初始化
        if self.logging_enabled {
            self.initialize_logging()?;
        }

        info!("开始构建作用域解析器");
        self.settings.validate()?;

        let mut catalog = AggregateCatalog::new(self.catalogs);
        if !self.parts.is_empty() {
            catalog.push(Arc::new(TypeCatalog::new(self.parts)));
        }

        for path in self.settings.manifests.iter().chain(self.manifests.iter()) {
            catalog.push(Arc::new(ManifestCatalog::new(path, self.registry.clone())));
        }
        let catalog_count = catalog.len();
        if catalog_count == 0 {
            warn!("没有添加任何部件目录");
        }

        let policy = self
            .error_policy
            .unwrap_or_else(|| self.settings.error_policy.create());
        let resolver =
            ScopedResolver::with_options(Arc::new(catalog), self.settings.resolver, policy);

        info!("作用域解析器构建完成: {} 个部件目录", catalog_count);
        Ok(resolver)
    }

    /// 初始化日志系统
    fn initialize_logging(&self) -> Result<(), InfrastructureError> {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(self.logging_config.level)
            .with_target(self.logging_config.show_target)
            .with_thread_ids(self.logging_config.show_thread_ids)
            .with_file(self.logging_config.show_file)
            .with_line_number(self.logging_config.show_line_number);

        if self.logging_config.json_format {
            subscriber.json().try_init()
        } else {
            subscriber.try_init()
        }
        .map_err(|e| InfrastructureError::BootstrapFailed {
            message: format!("日志初始化失败: {}", e),
        })?;

        info!("日志系统初始化完成");
        Ok(())
    }
}

impl Default for ResolverBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: tracing::Level,
    /// 是否显示目标
    pub show_target: bool,
    /// 是否显示线程ID
    pub show_thread_ids: bool,
    /// 是否显示文件名
    pub show_file: bool,
    /// 是否显示行号
    pub show_line_number: bool,
    /// 是否使用 JSON 格式
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: tracing::Level::INFO,
            show_target: true,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// 创建开发环境日志配置
    pub fn development() -> Self {
        Self {
            level: tracing::Level::DEBUG,
            show_target: true,
            show_thread_ids: true,
            show_file: true,
            show_line_number: true,
            json_format: false,
        }
    }

    /// 创建生产环境日志配置
    pub fn production() -> Self {
        Self {
            level: tracing::Level::INFO,
            show_target: false,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: true,
        }
    }
}
