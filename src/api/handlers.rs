use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{error::AppResult, middleware::request_id::RequestId, models::Recommendation};

use super::AppState;

// Request/Response types

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub items: usize,
    pub built_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub pattern: String,
}

#[derive(Debug, Deserialize)]
pub struct RecommendQuery {
    pub item: String,
    pub max_recommendations: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub item: String,
    pub recommendations: Vec<Recommendation>,
}

// Handlers

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        items: state.recommender.list_items().len(),
        built_at: state.recommender.metadata().built_at,
    })
}

/// List every item in the catalog
pub async fn list_items(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.recommender.list_items().to_vec())
}

/// Case-insensitive substring search over the catalog
pub async fn search_items(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> AppResult<Json<Vec<String>>> {
    let Query(params) = query?;
    Ok(Json(state.recommender.search_items(&params.pattern)))
}

/// Items most similar to the requested one
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    query: Result<Query<RecommendQuery>, QueryRejection>,
) -> AppResult<Json<RecommendResponse>> {
    let Query(params) = query?;
    let n = params
        .max_recommendations
        .unwrap_or(state.default_recommendations);

    let recommendations = state
        .recommender
        .recommend(&params.item, n)
        .inspect_err(|e| {
            tracing::info!(
                request_id = %request_id,
                item = %params.item,
                error = %e,
                "Recommendation lookup failed"
            );
        })?;

    tracing::info!(
        request_id = %request_id,
        item = %params.item,
        returned = recommendations.len(),
        "Recommendations served"
    );

    Ok(Json(RecommendResponse {
        item: params.item,
        recommendations,
    }))
}
