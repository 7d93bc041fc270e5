use reserva_backend::config::Config;
use reserva_backend::infra::gateway::gateway_router;
use reserva_backend::{init_logging, serve};
use std::env;
use tokio::sync::watch;

#[tokio::main]
async fn main() {
    let _guard = init_logging("gateway");

    // The gateway owns no store; DATABASE_URL is irrelevant here.
    if env::var("DATABASE_URL").is_err() {
        env::set_var("DATABASE_URL", "unused");
    }
    let config = Config::from_env();
    let (shutdown_tx, _shutdown_rx) = watch::channel(false);

    let app = gateway_router(&config);
    serve(app, config.port, shutdown_tx).await;
}
