use reserva_backend::api::router::user_router;
use reserva_backend::config::Config;
use reserva_backend::consumers::{
    groups,
    user::{BookingNotificationHandler, UserCascadeHandler},
};
use reserva_backend::domain::models::event::streams;
use reserva_backend::infra::events::EventConsumer;
use reserva_backend::infra::factory::bootstrap_user_state;
use reserva_backend::{init_logging, serve};
use std::sync::Arc;
use tokio::sync::watch;
use uuid::Uuid;

#[tokio::main]
async fn main() {
    let _guard = init_logging("user-service");

    let config = Config::from_env();
    let (state, fabric) = bootstrap_user_state(&config).await;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let consumer_name = format!("{}-{}", groups::USER_SERVICE, Uuid::new_v4());

    let cascade = EventConsumer::new(
        fabric.stream.clone(),
        Arc::new(UserCascadeHandler::new(state.user_repo.clone())),
        streams::DELETION_EVENTS,
        groups::USER_SERVICE,
        &consumer_name,
    );
    tokio::spawn(cascade.run(shutdown_rx.clone()));

    let notifications = EventConsumer::new(
        fabric.stream,
        Arc::new(BookingNotificationHandler),
        streams::BOOKING_EVENTS,
        groups::USER_SERVICE,
        &consumer_name,
    );
    tokio::spawn(notifications.run(shutdown_rx));

    let app = user_router(state);
    serve(app, config.port, shutdown_tx).await;
}
