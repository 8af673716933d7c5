use std::sync::Arc;

use movie_ratings::{
    api::{create_router, AppState},
    config::Config,
    db::{create_pool, InMemoryRatingStore, PgRatingStore, RatingStore},
    logging::init_logging,
};
use tower_http::cors::CorsLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = Config::from_env()?;

    let store: Arc<dyn RatingStore> = match &config.database_url {
        Some(url) => Arc::new(PgRatingStore::new(create_pool(url).await?)),
        None => {
            let store = InMemoryRatingStore::new();
            if config.seed_demo_data {
                store.seed_demo(&config.judge_email).await;
            }
            Arc::new(store)
        }
    };

    let state = AppState::new(store, &config);
    tracing::info!(
        store = state.store.name(),
        rounding = ?state.predictor.rounding(),
        "Rating store ready"
    );

    let app = create_router(state).layer(CorsLayer::permissive());

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
