use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Request failures, each rendered as `{"error": "..."}` with its status code
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("appId is required")]
    MissingAppId,

    #[error("No reviews found for {0}")]
    NoReviews(String),

    #[error("App \"{0}\" not found on Google Play.")]
    AppNotFound(String),

    #[error("Google Play rate limit hit. Please wait a moment and try again.")]
    RateLimited,

    #[error("{0}")]
    Upstream(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingAppId => StatusCode::BAD_REQUEST,
            ApiError::NoReviews(_) | ApiError::AppNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}
