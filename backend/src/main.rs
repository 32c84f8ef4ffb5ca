use backend::config::Config;
use backend::{app, logger, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    logger::init_logger(&config);

    let bind_addr = config.bind_addr;
    let state = AppState::from_config(config).await;
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!(%bind_addr, "starting server");

    axum::serve(listener, app(state)).await?;
    Ok(())
}
