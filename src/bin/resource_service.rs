use reserva_backend::api::router::resource_router;
use reserva_backend::config::Config;
use reserva_backend::consumers::{
    groups,
    resource::{AvailabilityInvalidationHandler, ResourceCascadeHandler},
};
use reserva_backend::domain::models::event::streams;
use reserva_backend::infra::events::EventConsumer;
use reserva_backend::infra::factory::bootstrap_resource_state;
use reserva_backend::{init_logging, serve};
use std::sync::Arc;
use tokio::sync::watch;
use uuid::Uuid;

#[tokio::main]
async fn main() {
    let _guard = init_logging("resource-service");

    let config = Config::from_env();
    let (state, fabric) = bootstrap_resource_state(&config).await;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let consumer_name = format!("{}-{}", groups::RESOURCE_SERVICE, Uuid::new_v4());

    let invalidation = EventConsumer::new(
        fabric.stream.clone(),
        Arc::new(AvailabilityInvalidationHandler::new(state.cache.clone())),
        streams::BOOKING_EVENTS,
        groups::RESOURCE_SERVICE,
        &consumer_name,
    );
    tokio::spawn(invalidation.run(shutdown_rx.clone()));

    let cascade = EventConsumer::new(
        fabric.stream,
        Arc::new(ResourceCascadeHandler::new(
            state.category_repo.clone(),
            state.resource_repo.clone(),
            state.cache.clone(),
        )),
        streams::DELETION_EVENTS,
        groups::RESOURCE_SERVICE,
        &consumer_name,
    );
    tokio::spawn(cascade.run(shutdown_rx));

    let app = resource_router(state);
    serve(app, config.port, shutdown_tx).await;
}
