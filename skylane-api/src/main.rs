use std::net::SocketAddr;
use std::sync::Arc;

use skylane_api::{app, AppState};
use skylane_core::InventoryService;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "skylane_api=debug,skylane_core=debug,tower_http=debug,axum::rejection=trace"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = skylane_store::app_config::Config::load()?;
    tracing::info!("Starting Skylane API on port {}", config.server.port);

    let db = skylane_store::DbClient::connect(&config.database).await?;
    db.migrate().await?;

    let store = Arc::new(skylane_store::PgInventoryStore::new(db.pool.clone()));
    let state = AppState {
        inventory: InventoryService::new(store),
    };

    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
