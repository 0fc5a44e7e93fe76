// HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use moneyball_core::splits::SplitsError;

use crate::html;

/// Application error type for page handlers. Renders as an HTML error page.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Splits(#[from] SplitsError),

    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) | AppError::Splits(SplitsError::PlayerNotFound { .. }) => {
                StatusCode::NOT_FOUND
            }
            AppError::Splits(SplitsError::StoreUnavailable(_)) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Splits(SplitsError::PlayerNotFound { .. }) => "PLAYER_NOT_FOUND",
            AppError::Splits(SplitsError::StoreUnavailable(_)) => "STORE_UNAVAILABLE",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message shown to the client. Internal details stay in the log.
    fn public_message(&self) -> String {
        match self.status() {
            StatusCode::INTERNAL_SERVER_ERROR => "Something went wrong loading this page.".into(),
            _ => self.to_string(),
        }
    }

    fn log(&self) {
        if self.status().is_server_error() {
            error!("request failed: {self}");
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        let status = self.status();
        let page = html::error_page(status.as_u16(), &self.public_message());
        (status, Html(page)).into_response()
    }
}

/// JSON error body for `/api` routes.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

/// Wrapper that renders an `AppError` as JSON instead of HTML.
#[derive(Debug)]
pub struct ApiFailure(pub AppError);

impl From<AppError> for ApiFailure {
    fn from(err: AppError) -> Self {
        ApiFailure(err)
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let err = self.0;
        err.log();
        let body = ApiError {
            code: err.code().to_string(),
            message: err.public_message(),
        };
        (err.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::from(SplitsError::PlayerNotFound { player: "x".into() }).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(SplitsError::StoreUnavailable(anyhow::anyhow!("disk gone"))).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::from(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_details_are_not_exposed() {
        let err = AppError::from(anyhow::anyhow!("/secret/path/data.db locked"));
        assert!(!err.public_message().contains("/secret"));
        let err = AppError::NotFound("page blog.html not found".into());
        assert_eq!(err.public_message(), "page blog.html not found");
    }
}
