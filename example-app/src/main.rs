//! # 示例应用程序
//!
//! 演示作用域解析器：全局部件在所有工作单元之间共享，工作单元部件每个单元各自一份。

use anyhow::{Context, Result};
use clap::Parser;
use di_abstractions::{
    DependencyBuilder, DependencyResolver, ExportedValue, ImportDefinition, Importer,
    PartDefinition,
};
use di_impl::ScopedResolver;
use infrastructure_common::{CompositionError, CreationPolicy, PartCreationScope};
use infrastructure_composition::{LoggingConfig, ResolverBuilder};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "example-app")]
#[command(about = "Lorn ADSP 作用域解析器示例")]
struct Args {
    /// 配置文件路径
    #[arg(short, long, default_value = "config/resolver.toml")]
    config: String,

    /// 模拟的并发工作单元数量
    #[arg(short, long, default_value_t = 4)]
    units: usize,

    /// 日志级别
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// 日志服务接口
trait AuditLog: Send + Sync {
    fn record(&self, unit: Uuid, message: &str);
}

/// 全局日志服务
#[derive(Debug, Default)]
struct ConsoleAuditLog {
    written: AtomicU64,
}

impl AuditLog for ConsoleAuditLog {
    fn record(&self, unit: Uuid, message: &str) {
        let seq = self.written.fetch_add(1, Ordering::SeqCst);
        info!("[audit #{}] unit={} {}", seq, unit, message);
    }
}

/// 工作单元上下文
struct RequestContext {
    id: Uuid,
    log: Arc<dyn AuditLog>,
}

/// 每次获取都重新生成的追踪标识
#[derive(Debug)]
struct TraceId(Uuid);

/// 外部构造、由解析器注入依赖的处理器
#[derive(Clone, Default)]
struct OrderHandler {
    context: Option<Arc<RequestContext>>,
    trace: Option<Arc<TraceId>>,
}

impl Importer for OrderHandler {
    fn imports(&self) -> Vec<ImportDefinition> {
        vec![
            ImportDefinition::one::<RequestContext>("context"),
            ImportDefinition::one::<TraceId>("trace"),
        ]
    }

    fn set_import(
        &mut self,
        import: &ImportDefinition,
        values: Vec<ExportedValue>,
    ) -> Result<(), CompositionError> {
        match import.member.as_str() {
            "context" => self.context = Some(import.cast_one(&values)?),
            "trace" => self.trace = Some(import.cast_one(&values)?),
            _ => {}
        }
        Ok(())
    }
}

impl OrderHandler {
    fn handle(&self, order: usize) -> Result<()> {
        let context = self.context.as_ref().context("处理器缺少 RequestContext")?;
        let trace = self.trace.as_ref().context("处理器缺少 TraceId")?;
        context
            .log
            .record(context.id, &format!("处理订单 {} (trace {})", order, trace.0));
        Ok(())
    }
}

fn parts() -> Vec<PartDefinition> {
    vec![
        PartDefinition::builder("ConsoleAuditLog", |_| Ok(ConsoleAuditLog::default()))
            .scope(PartCreationScope::Global)
            .export_as::<dyn AuditLog, _>(|log| log as Arc<dyn AuditLog>)
            .build(),
        PartDefinition::builder("RequestContext", |ctx| {
            Ok(RequestContext {
                id: Uuid::new_v4(),
                log: ctx.import::<dyn AuditLog>()?,
            })
        })
        .scope(PartCreationScope::PerUnit)
        .import(ImportDefinition::one::<dyn AuditLog>("log"))
        .build(),
        PartDefinition::builder("TraceId", |_| Ok(TraceId(Uuid::new_v4())))
            .scope(PartCreationScope::PerUnit)
            .creation_policy(CreationPolicy::NonShared)
            .build(),
    ]
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let logging = LoggingConfig {
        level: parse_log_level(&args.log_level),
        ..LoggingConfig::development()
    };
    let mut builder = ResolverBuilder::new().with_logging(logging);
    if Path::new(&args.config).exists() {
        builder = builder
            .load_settings(&args.config)
            .context("加载解析器配置失败")?;
    } else {
        info!("配置文件不存在，将使用默认配置: {}", args.config);
    }

    let resolver = Arc::new(builder.add_parts(parts()).build()?);
    info!("启动 {} 个并发工作单元", args.units);

    let mut handles = Vec::with_capacity(args.units);
    for index in 0..args.units {
        let resolver = resolver.clone();
        handles.push(tokio::spawn(async move { run_unit(&resolver, index).await }));
    }

    for handle in handles {
        if let Err(e) = handle.await? {
            warn!("工作单元执行失败: {:#}", e);
        }
    }

    info!("全部工作单元已结束");
    Ok(())
}

/// 模拟一个工作单元
async fn run_unit(resolver: &ScopedResolver, index: usize) -> Result<()> {
    let unit = resolver.begin_unit(format!("request-{}", index));

    for order in 0..3 {
        let handler = resolver.build(&unit, OrderHandler::default())?;
        handler.handle(index * 10 + order)?;
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let context = resolver
        .resolve::<RequestContext>(&unit)?
        .context("RequestContext 未注册")?;
    let contexts = resolver.resolve_all::<RequestContext>(&unit)?;
    info!(
        "工作单元 {} 完成: context={}, 同一单元内实例数={}",
        unit.name(),
        context.id,
        contexts.len()
    );

    unit.end();
    Ok(())
}

/// 解析日志级别
fn parse_log_level(level: &str) -> tracing::Level {
    match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}
