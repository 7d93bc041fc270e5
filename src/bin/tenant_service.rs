use reserva_backend::api::router::tenant_router;
use reserva_backend::config::Config;
use reserva_backend::consumers::{groups, tenant::WebhookDispatchHandler};
use reserva_backend::domain::models::event::streams;
use reserva_backend::infra::events::EventConsumer;
use reserva_backend::infra::factory::bootstrap_tenant_state;
use reserva_backend::infra::http::HttpWebhookSender;
use reserva_backend::{init_logging, serve};
use std::sync::Arc;
use tokio::sync::watch;
use uuid::Uuid;

#[tokio::main]
async fn main() {
    let _guard = init_logging("tenant-service");

    let config = Config::from_env();
    let (state, fabric) = bootstrap_tenant_state(&config).await;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let webhook_handler = Arc::new(WebhookDispatchHandler::new(
        state.webhook_repo.clone(),
        Arc::new(HttpWebhookSender::new()),
    ));
    let consumer = EventConsumer::new(
        fabric.stream,
        webhook_handler,
        streams::BOOKING_EVENTS,
        groups::TENANT_SERVICE,
        &format!("{}-{}", groups::TENANT_SERVICE, Uuid::new_v4()),
    );
    tokio::spawn(consumer.run(shutdown_rx));

    let app = tenant_router(state);
    serve(app, config.port, shutdown_tx).await;
}
