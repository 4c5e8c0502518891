use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, routing::get, routing::post};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::{
    services::{health, metrics, post_event},
    state::AppState,
};
use crate::aws::Backends;
use crate::callback::{HttpResponseSink, HttpSinkConfig};
use crate::config::Config;
use crate::handlers::{Dispatcher, HandlerSettings, ResourceHandlers};
use crate::observability::Metrics;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/events", post(post_event))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Wire collaborators, handlers and the HTTP callback sink from `config`.
pub async fn build_dispatcher(config: &Config, metrics: Arc<Metrics>) -> Result<Dispatcher, AnyError> {
    let backends = Backends::from_config(&config.backend).await?;
    let handlers = ResourceHandlers::new(
        &backends,
        HandlerSettings {
            default_entropy: config.password.default_entropy,
            max_random_bytes: config.password.max_random_bytes,
        },
    );
    let sink = HttpResponseSink::new(HttpSinkConfig::from(&config.callback))?;
    Ok(Dispatcher::new(handlers, Arc::new(sink), metrics))
}

pub async fn run(address: SocketAddr, config: Config) -> Result<(), AnyError> {
    let metrics = Arc::new(Metrics::new());
    let dispatcher = build_dispatcher(&config, metrics.clone()).await?;
    let state = AppState::new(config, dispatcher, metrics);

    let listener = TcpListener::bind(address).await?;
    info!(%address, "cfntoolkit listening");

    axum::serve(listener, router(state).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm = signal(SignalKind::terminate())
            .expect("failed to install signal handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
