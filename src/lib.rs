pub mod api;
pub mod config;
pub mod consumers;
pub mod domain;
pub mod error;
pub mod infra;
pub mod state;

use axum::Router;
use tokio::sync::watch;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub fn init_logging(service_name: &str) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily("./logs", format!("{}.log", service_name));
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("info,reserva_backend=debug"));

    let stdout_layer = tracing_subscriber::fmt::layer()
        .pretty()
        .with_target(false)
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()));

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .init();

    info!("Logging initialized for {}. Writing JSON logs to ./logs/", service_name);
    guard
}

/// Serves until ctrl-c, then flips the shutdown signal so consumer loops can
/// finish their in-flight messages and exit.
pub async fn serve(app: Router, port: u16, shutdown: watch::Sender<bool>) {
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .expect("failed to bind listener");

    info!("Server running on port {}", port);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
            let _ = shutdown.send(true);
        })
        .await
        .expect("server error");
}
