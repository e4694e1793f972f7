use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use clap::Parser;
use serde::Deserialize;
use tokio::time::{Duration, sleep};
use tracing_subscriber::EnvFilter;

use mediator_core::domain::BoxError;
use mediator_core::prelude::*;

/// mediator demo: send one request, then publish one notification
#[derive(Debug, Parser)]
#[command(name = "mediator", version)]
struct Args {
    /// JSON file with a MediatorConfig
    #[arg(long, env = "MEDIATOR_CONFIG")]
    config: Option<PathBuf>,

    /// Notification dispatch strategy (parallel | sequential)
    #[arg(long)]
    strategy: Option<DispatchStrategy>,

    /// Do not install the error behavior
    #[arg(long)]
    no_error_behavior: bool,

    /// Request payload as JSON
    #[arg(long, default_value = r#"{"name":"world"}"#)]
    request: String,
}

#[derive(Debug, Clone, Deserialize)]
struct Hello {
    name: String,
}

impl Request for Hello {
    type Response = String;
}

struct HelloHandler;

#[async_trait]
impl RequestHandler<Hello> for HelloHandler {
    async fn handle(&self, request: Hello, _cancel: CancellationToken) -> Result<String, MediatorError> {
        Ok(format!("Hello, {}!", request.name))
    }
}

#[derive(Debug, Clone, Copy)]
struct Flush;

impl Request for Flush {
    type Response = Unit;
}

struct FlushHandler;

#[async_trait]
impl RequestHandler<Flush> for FlushHandler {
    async fn handle(&self, _request: Flush, _cancel: CancellationToken) -> Result<Unit, MediatorError> {
        tracing::info!("flushed");
        Ok(Unit)
    }
}

#[derive(Debug, Clone)]
struct Greeted {
    name: String,
}

impl Notification for Greeted {}

/// 遅いハンドラ（Parallel と Sequential の違いを見るため）
struct AuditHandler {
    delay: Duration,
}

#[async_trait]
impl NotificationHandler<Greeted> for AuditHandler {
    async fn handle(&self, notification: Greeted, cancel: CancellationToken) -> Result<(), MediatorError> {
        tokio::select! {
            _ = sleep(self.delay) => {}
            _ = cancel.cancelled() => return Err(MediatorError::Cancelled),
        }
        tracing::info!(name = %notification.name, "audit recorded");
        Ok(())
    }
}

struct CountingHandler {
    seen: Arc<AtomicUsize>,
}

#[async_trait]
impl NotificationHandler<Greeted> for CountingHandler {
    async fn handle(&self, _notification: Greeted, _cancel: CancellationToken) -> Result<(), MediatorError> {
        let total = self.seen.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(total, "greeting counted");
        Ok(())
    }
}

fn load_config(args: &Args) -> Result<MediatorConfig, MediatorError> {
    let mut config = match &args.config {
        Some(path) => MediatorConfig::from_json_file(path)?,
        None => MediatorConfig::default(),
    };
    if let Some(strategy) = args.strategy {
        config = config.with_dispatch_strategy(strategy);
    }
    if args.no_error_behavior {
        config = config.with_error_behavior(false);
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let request: Hello = serde_json::from_str(&args.request)?;
    tracing::info!(
        strategy = %config.dispatch_strategy,
        error_behavior = config.use_error_behavior,
        "starting"
    );

    // (A) 登録と起動時検証
    let seen = Arc::new(AtomicUsize::new(0));
    let mediator = MediatorBuilder::from_config(config)
        .register_request_handler::<Hello, _>(HelloHandler)?
        .register_request_handler::<Flush, _>(FlushHandler)?
        .register_behavior::<Hello, _>(LoggingBehavior::new())
        .register_notification_handler::<Greeted, _>(AuditHandler {
            delay: Duration::from_millis(50),
        })
        .register_notification_handler::<Greeted, _>(CountingHandler {
            seen: Arc::clone(&seen),
        })
        .register_notification_behavior::<Greeted, _>(LoggingBehavior::new())
        .expect_request::<Hello>()
        .expect_request::<Flush>()
        .build()?;

    // (B) キャッシュを温める
    mediator.warm_request::<Hello>()?;
    let handlers = mediator.warm_notification::<Greeted>();
    tracing::info!(handlers, "pipelines warmed");

    // (C) Request → Response
    let source = CancellationSource::new();
    let name = request.name.clone();
    let greeting = mediator.send(request, source.token()).await?;
    println!("{greeting}");

    mediator.send_unit(Flush, source.token()).await?;

    // (D) Notification fan-out
    mediator.publish(Greeted { name }, source.token()).await?;
    println!("greetings counted: {}", seen.load(Ordering::SeqCst));

    Ok(())
}
