//! Book Catalog Server
//!
//! REST API and form interface for a catalog of books.

use std::net::{IpAddr, SocketAddr};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use book_catalog_server::{
    api,
    config::{AppConfig, LoggingConfig},
    repository::{self, Repository},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;

    init_tracing(&config.logging);

    tracing::info!("Starting Book Catalog Server v{}", env!("CARGO_PKG_VERSION"));

    let pool = repository::connect(&config.database).await?;
    let repository = Repository::new(pool);
    repository.ensure_schema().await?;

    tracing::info!(url = %config.database.url, "Database ready");

    if config.database.seed_samples {
        let inserted = repository.seed_samples().await?;
        if inserted > 0 {
            tracing::info!(inserted, "Seeded sample books");
        }
    }

    if config.auth.secret().is_some() {
        tracing::info!(header = %config.auth.header, "Write endpoints require the shared secret");
    }

    let addr = SocketAddr::new(config.server.host.parse::<IpAddr>()?, config.server.port);

    let state = AppState::new(config, repository);
    let app = api::create_router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(config: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("book_catalog_server={},tower_http=debug", config.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if config.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
