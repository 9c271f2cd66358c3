use std::sync::Arc;

use crate::services::Recommender;

/// Shared application state
///
/// Everything in here is read-only after startup, so handlers share it
/// without locking.
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
    /// Count used when a recommendation request omits `max_recommendations`
    pub default_recommendations: usize,
}

impl AppState {
    pub fn new(recommender: Recommender, default_recommendations: usize) -> Self {
        Self {
            recommender: Arc::new(recommender),
            default_recommendations,
        }
    }
}
