use std::path::PathBuf;

use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Request-time errors surfaced by the recommender service
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Item {0} not found in the dataset")]
    ItemNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::ItemNotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Errors raised while building, writing or loading the similarity artifact
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("failed to access {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read raw event log {path}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("malformed row at line {line}: {reason}")]
    MalformedRow { line: u64, reason: String },

    #[error("failed to serialise artifact into {path}")]
    Serialise {
        path: PathBuf,
        #[source]
        source: bincode::Error,
    },

    #[error("failed to deserialise artifact from {path}")]
    Deserialise {
        path: PathBuf,
        #[source]
        source: bincode::Error,
    },

    #[error("corrupt artifact: {0}")]
    CorruptArtifact(String),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_not_found_maps_to_404() {
        let response = AppError::ItemNotFound("Dota 2".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_invalid_input_maps_to_400() {
        let response = AppError::InvalidInput("bad".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_malformed_row_message_names_line() {
        let err = PipelineError::MalformedRow {
            line: 7,
            reason: "expected 4 columns, found 2".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "malformed row at line 7: expected 4 columns, found 2"
        );
    }
}
