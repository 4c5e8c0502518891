use std::path::Path;
use std::sync::Arc;

use tokio::io::AsyncReadExt;
use tracing::info;

use cfntoolkit::api;
use cfntoolkit::config::Config;
use cfntoolkit::handlers::LifecycleEvent;
use cfntoolkit::hashing;
use cfntoolkit::observability::Metrics;

use crate::cli::InvokeArgs;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

async fn read_event(path: &Path) -> Result<LifecycleEvent, AnyError> {
    let raw = if path == Path::new("-") {
        let mut buf = String::new();
        tokio::io::stdin().read_to_string(&mut buf).await?;
        buf
    } else {
        tokio::fs::read_to_string(path).await?
    };
    Ok(serde_json::from_str(&raw)?)
}

pub async fn invoke(args: InvokeArgs, config: Config) -> Result<(), AnyError> {
    let event = read_event(&args.event).await?;
    let metrics = Arc::new(Metrics::new());
    let dispatcher = api::build_dispatcher(&config, metrics).await?;

    let envelope = if args.dry_run {
        info!(request_id = %event.request_id, "Dry run, skipping delivery");
        dispatcher.dispatch(&event).await
    } else {
        let outcome = dispatcher.handle(&event).await;
        outcome.delivery?;
        outcome.envelope
    };

    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}

pub fn schemes() {
    for algorithm in hashing::algorithms() {
        let parameters: Vec<&str> = algorithm.parameters.iter().map(|(name, _)| *name).collect();
        let security = if algorithm.is_secure { "secure" } else { "insecure" };
        println!("{:<22} {:<9} {}", algorithm.name, security, parameters.join(", "));
    }
}
