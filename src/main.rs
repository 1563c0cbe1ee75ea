use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dine_match::{
    config::Config,
    db::{MemoryStore, ReferenceData},
    routes::{create_router, AppState},
    services::{GroupService, Normalizer, RecommendationEngine},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("dine_match=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let data = ReferenceData::load(&config.data_dir, &config.group_sizes).with_context(|| {
        format!(
            "Failed to load reference data from {}",
            config.data_dir.display()
        )
    })?;

    let engine = RecommendationEngine::new(&data.vocabulary, data.catalogues)?;
    let normalizer =
        Normalizer::new().with_eating_time_exclusions(config.eating_time_exclusions.iter());
    let groups = GroupService::new(Arc::new(MemoryStore::new()), Arc::new(engine), normalizer)
        .with_item_names(data.business_names)
        .with_top_rated_limit(config.top_rated_limit);

    let app = create_router(AppState::new(groups));

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(%addr, group_sizes = ?config.group_sizes, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
