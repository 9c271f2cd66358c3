use anyhow::Context;

use steam_recommender::{
    api::{create_router, AppState},
    config::Config,
    init_tracing,
    services::{Artifact, Recommender},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env()?;

    // Load the similarity artifact once; it is never refreshed
    let artifact = Artifact::load(&config.artifact_path).with_context(|| {
        format!(
            "Failed to load artifact {}; run `build-model` first",
            config.artifact_path.display()
        )
    })?;
    let state = AppState::new(Recommender::from(artifact), config.default_recommendations);

    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!(address = %address, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
