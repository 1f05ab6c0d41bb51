use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ta_common::api::ErrorResponse;
use ta_common::error::CommonError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Corpus(#[from] LoadError),

    #[error(transparent)]
    Common(#[from] CommonError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Common(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_) | AppError::Corpus(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Failure to read a persisted corpus collection.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("corpus file not found: {}", .0.display())]
    Missing(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid corpus JSON in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// A fault inside ranking or synthesis. Never leaves `answer::answer`.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("synthesized answer is empty")]
    EmptyAnswer,

    #[error("link with empty url in output")]
    EmptyLinkUrl,

    #[error("{count} links exceed the limit of {max}")]
    TooManyLinks { count: usize, max: usize },

    #[error("panic during answer generation: {0}")]
    Panicked(String),
}
