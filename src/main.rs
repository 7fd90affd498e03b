use aspect_patch::config::AppConfig;
use aspect_patch::store::InMemoryAspectStore;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    use env_logger::Builder;
    use log::LevelFilter;

    Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let config = AppConfig::load()?;
    log::info!(
        "Configuration loaded: server={}:{}, max operations per proposal={}",
        config.server.host,
        config.server.port,
        config.store.max_operations_per_proposal
    );

    let store = Arc::new(InMemoryAspectStore::from_config(&config.store));

    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;
    log::info!("aspect patch server running on http://{}", bind_address);

    aspect_patch::serve(listener, store).await
}
