use reserva_backend::api::router::booking_router;
use reserva_backend::config::Config;
use reserva_backend::consumers::{booking::BookingCascadeHandler, groups};
use reserva_backend::domain::models::event::streams;
use reserva_backend::infra::events::EventConsumer;
use reserva_backend::infra::factory::bootstrap_booking_state;
use reserva_backend::{init_logging, serve};
use std::sync::Arc;
use tokio::sync::watch;
use uuid::Uuid;

#[tokio::main]
async fn main() {
    let _guard = init_logging("booking-service");

    let config = Config::from_env();
    let (state, fabric) = bootstrap_booking_state(&config).await;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let cascade = EventConsumer::new(
        fabric.stream,
        Arc::new(BookingCascadeHandler::new(state.booking_repo.clone(), fabric.bus)),
        streams::DELETION_EVENTS,
        groups::BOOKING_SERVICE,
        &format!("{}-{}", groups::BOOKING_SERVICE, Uuid::new_v4()),
    );
    tokio::spawn(cascade.run(shutdown_rx));

    let app = booking_router(state);
    serve(app, config.port, shutdown_tx).await;
}
