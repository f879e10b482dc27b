use std::net::SocketAddr;

use snowline_api::{app, AppState};
use snowline_store::app_config::{Config, StorageBackend};
use snowline_store::{postgres_repositories, DbClient, MemoryStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "snowline_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!("Starting Snowline API on port {}", config.server.port);

    let repos = match config.database.backend {
        StorageBackend::Postgres => {
            let db = DbClient::new(&config.database).await?;
            db.migrate().await?;
            postgres_repositories(&db)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            MemoryStore::seeded().into_repositories()
        }
    };

    let app = app(AppState::new(repos, &config));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
