//! Item-to-item game recommendations derived from Steam play-time logs.
//!
//! The offline build turns raw `(user, item, behaviour, hours)` rows into a
//! cosine similarity table ([`services::Artifact`]); the server loads that
//! artifact once and answers lookups through [`services::Recommender`].
pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;

/// Installs the global `tracing` subscriber, honouring `RUST_LOG`
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "steam_recommender=info,build_model=info,tower_http=info".into()),
        )
        .init();
}
