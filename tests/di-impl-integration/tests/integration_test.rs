//! 作用域解析器的集中集成测试
use anyhow::Result;
use di_abstractions::{
    CompositionContainerProvider, DependencyResolver, ErrorOutcome, ExportProvider, PartCatalog,
    PartDefinition, ResolverOptions,
};
use di_impl::{
    FnErrorPolicy, ManifestCatalog, PartRegistry, PropagateErrors, ScopedResolver,
    SuppressErrors, TypeCatalog, UnitOfWork,
};
use infrastructure_common::{CompositionError, ContractName, PartCreationScope};
use std::io::Write;
use std::sync::{Arc, Once};

static INIT_LOGGER: Once = Once::new();

/// 初始化测试日志系统（只初始化一次）
fn init_test_logger() {
    INIT_LOGGER.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

trait Formatter: Send + Sync {
    fn format(&self, text: &str) -> String;
}

/// 全局格式化器
#[derive(Debug)]
struct PlainFormatter;

/// 工作单元格式化器
#[derive(Debug)]
struct TenantFormatter;

impl Formatter for PlainFormatter {
    fn format(&self, text: &str) -> String {
        text.to_string()
    }
}

impl Formatter for TenantFormatter {
    fn format(&self, text: &str) -> String {
        format!("[tenant] {}", text)
    }
}

#[derive(Debug)]
struct Logger;

#[derive(Debug)]
struct RequestContext;

fn formatter_catalog() -> Arc<dyn PartCatalog> {
    Arc::new(TypeCatalog::new(vec![
        PartDefinition::builder("PlainFormatter", |_| Ok(PlainFormatter))
            .scope(PartCreationScope::Global)
            .export_as::<dyn Formatter, _>(|f| f as Arc<dyn Formatter>)
            .build(),
        PartDefinition::builder("TenantFormatter", |_| Ok(TenantFormatter))
            .scope(PartCreationScope::PerUnit)
            .export_as::<dyn Formatter, _>(|f| f as Arc<dyn Formatter>)
            .build(),
        PartDefinition::builder("Logger", |_| Ok(Logger))
            .scope(PartCreationScope::Global)
            .build(),
        PartDefinition::builder("RequestContext", |_| Ok(RequestContext))
            .scope(PartCreationScope::PerUnit)
            .build(),
    ]))
}

#[test]
fn test_catalog_partitioned_by_scope() -> Result<()> {
    init_test_logger();
    let resolver = ScopedResolver::new(formatter_catalog());

    let global: Vec<_> = resolver.global_catalog().parts()?.iter().map(|p| p.name.clone()).collect();
    let unit: Vec<_> = resolver.unit_catalog().parts()?.iter().map(|p| p.name.clone()).collect();

    assert_eq!(global, vec!["PlainFormatter", "Logger"]);
    assert_eq!(unit, vec!["TenantFormatter", "RequestContext"]);
    assert_eq!(resolver.catalog().parts()?.len(), 4);
    Ok(())
}

#[test]
fn test_resolve_one_prefers_unit_scope() -> Result<()> {
    init_test_logger();
    let resolver = ScopedResolver::new(formatter_catalog());
    let unit = UnitOfWork::new("request");

    let formatter = resolver.resolve::<dyn Formatter>(&unit)?.expect("formatter");
    assert_eq!(formatter.format("hi"), "[tenant] hi");

    // 全局容器只能看到全局部件
    let global = resolver
        .global_container()
        .get_export(&ContractName::of::<dyn Formatter>())?
        .expect("global formatter");
    assert_eq!(
        global.value.downcast::<dyn Formatter>().expect("cast").format("hi"),
        "hi"
    );
    Ok(())
}

#[test]
fn test_resolve_all_lists_unit_before_global() -> Result<()> {
    init_test_logger();
    let resolver = ScopedResolver::new(formatter_catalog());
    let unit = UnitOfWork::new("request");

    let outputs: Vec<_> = resolver
        .resolve_all::<dyn Formatter>(&unit)?
        .iter()
        .map(|f| f.format("x"))
        .collect();

    assert_eq!(outputs, vec!["[tenant] x", "x"]);
    Ok(())
}

#[test]
fn test_fallback_to_global_scope() -> Result<()> {
    init_test_logger();
    let resolver = ScopedResolver::new(formatter_catalog());
    let unit = UnitOfWork::new("request");

    let from_unit = resolver.resolve::<Logger>(&unit)?.expect("logger");
    let from_global = resolver
        .global_container()
        .get_export(&ContractName::of::<Logger>())?
        .expect("logger export")
        .value
        .downcast::<Logger>()
        .expect("cast");

    assert!(Arc::ptr_eq(&from_unit, &from_global));
    Ok(())
}

#[test]
fn test_absent_contract_is_none_and_empty() -> Result<()> {
    init_test_logger();
    let resolver = ScopedResolver::new(formatter_catalog());
    let unit = UnitOfWork::new("request");
    let contract = ContractName::from("NotRegistered");

    assert!(resolver.get_service(&unit, &contract)?.is_none());
    assert!(resolver.get_services(&unit, &contract)?.is_empty());
    Ok(())
}

#[test]
fn test_units_do_not_share_scoped_instances() -> Result<()> {
    init_test_logger();
    let resolver = ScopedResolver::new(formatter_catalog());
    let first = UnitOfWork::new("first");
    let second = UnitOfWork::new("second");

    let a = resolver.resolve::<RequestContext>(&first)?.expect("context");
    let a_again = resolver.resolve::<RequestContext>(&first)?.expect("context");
    let b = resolver.resolve::<RequestContext>(&second)?.expect("context");

    assert!(Arc::ptr_eq(&a, &a_again));
    assert!(!Arc::ptr_eq(&a, &b));
    assert!(!Arc::ptr_eq(&resolver.container(&first)?, &resolver.container(&second)?));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_units_are_isolated() -> Result<()> {
    init_test_logger();
    let resolver = Arc::new(ScopedResolver::new(formatter_catalog()));

    let mut handles = Vec::new();
    for index in 0..8 {
        let resolver = resolver.clone();
        handles.push(tokio::spawn(async move {
            let unit = UnitOfWork::new(format!("request-{}", index));
            let context = resolver.resolve::<RequestContext>(&unit)?.expect("context");
            let logger = resolver.resolve::<Logger>(&unit)?.expect("logger");
            anyhow::Ok((context, logger))
        }));
    }

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await??);
    }

    for (i, (context, logger)) in results.iter().enumerate() {
        assert!(Arc::ptr_eq(logger, &results[0].1));
        for (other, _) in &results[i + 1..] {
            assert!(!Arc::ptr_eq(context, other));
        }
    }
    Ok(())
}

fn write_manifest(content: &str) -> Result<tempfile::NamedTempFile> {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
    file.write_all(content.as_bytes())?;
    file.flush()?;
    Ok(file)
}

#[test]
fn test_partial_load_is_fatal_and_lists_every_cause() -> Result<()> {
    init_test_logger();
    let registry = Arc::new(PartRegistry::new());
    registry.register(PartDefinition::builder("Logger", |_| Ok(Logger)).build());
    let manifest = write_manifest(
        "[[parts]]\nname = \"Logger\"\n\n[[parts]]\nname = \"Mailer\"\n\n[[parts]]\nname = \"Cache\"\n",
    )?;

    let resolver = ScopedResolver::with_options(
        Arc::new(ManifestCatalog::new(manifest.path(), registry)),
        ResolverOptions::default(),
        Arc::new(SuppressErrors),
    );
    let unit = UnitOfWork::new("request");

    let error = resolver.resolve::<Logger>(&unit).unwrap_err();
    assert!(error.is_fatal());
    let message = error.to_string();
    assert!(message.contains("Logger, <未加载>, <未加载>"));
    assert!(message.contains("Mailer"));
    assert!(message.contains("下一个原因: 未注册的部件: Cache"));
    assert!(matches!(
        error.composition_error(),
        Some(CompositionError::PartialLoad { .. })
    ));

    // 解析服务列表同样致命
    assert!(resolver.resolve_all::<Logger>(&unit).unwrap_err().is_fatal());
    Ok(())
}

#[test]
fn test_policy_sees_non_load_failures() -> Result<()> {
    init_test_logger();

    #[derive(Debug)]
    struct Broken;

    let catalog = Arc::new(TypeCatalog::new(vec![PartDefinition::builder("Broken", |_| {
        Err::<Broken, _>(CompositionError::creation_failed("Broken", "连接被拒绝"))
    })
    .scope(PartCreationScope::PerUnit)
    .build()]));
    let policy = FnErrorPolicy::new("IgnoreCreation", |error: &CompositionError| match error {
        CompositionError::PartCreationFailed { .. } => ErrorOutcome::Handled,
        _ => ErrorOutcome::Propagate,
    });
    let resolver =
        ScopedResolver::with_options(catalog, ResolverOptions::default(), Arc::new(policy));
    let unit = UnitOfWork::new("request");

    assert!(resolver.resolve::<Broken>(&unit)?.is_none());
    assert!(resolver.resolve_all::<Broken>(&unit)?.is_empty());
    Ok(())
}

#[test]
fn test_circular_parts_reported_through_resolver() {
    init_test_logger();

    #[derive(Debug)]
    struct Ping;
    #[derive(Debug)]
    struct Pong;

    // Ping 在工作单元容器，依赖的 Pong 在全局容器中依赖自身
    let resolver = ScopedResolver::new(Arc::new(TypeCatalog::new(vec![
        PartDefinition::builder("Ping", |ctx| {
            ctx.import::<Pong>()?;
            Ok(Ping)
        })
        .scope(PartCreationScope::PerUnit)
        .build(),
        PartDefinition::builder("Pong", |ctx| {
            ctx.import::<Pong>()?;
            Ok(Pong)
        })
        .build(),
    ])));
    let unit = UnitOfWork::new("request");

    let error = resolver.resolve::<Ping>(&unit).unwrap_err();
    assert!(matches!(
        error.composition_error(),
        Some(CompositionError::CircularDependency { .. })
    ));
}

#[test]
fn test_resolution_depth_limit() {
    init_test_logger();

    #[derive(Debug)]
    struct Outer;
    #[derive(Debug)]
    struct Inner;

    let options = ResolverOptions {
        max_resolution_depth: 1,
        ..ResolverOptions::default()
    };
    let resolver = ScopedResolver::with_options(
        Arc::new(TypeCatalog::new(vec![
            PartDefinition::builder("Outer", |ctx| {
                ctx.import::<Inner>()?;
                Ok(Outer)
            })
            .build(),
            PartDefinition::builder("Inner", |_| Ok(Inner)).build(),
        ])),
        options,
        Arc::new(PropagateErrors),
    );
    let unit = UnitOfWork::new("request");

    let error = resolver.resolve::<Outer>(&unit).unwrap_err();
    assert!(matches!(
        error.composition_error(),
        Some(CompositionError::ResolutionDepthExceeded { max_depth: 1, .. })
    ));
    // 不依赖其他部件的部件不受影响
    assert!(resolver.resolve::<Inner>(&unit).unwrap().is_some());
}
