use analytics::AnalyticsError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use engine::error::EngineError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Engine(EngineError::InvalidRequest(_)) => StatusCode::BAD_REQUEST,
            AppError::Engine(EngineError::Analytics(AnalyticsError::NoDataAvailable { .. })) => {
                StatusCode::NOT_FOUND
            }
            AppError::Engine(EngineError::Analytics(AnalyticsError::Series(_))) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Engine(EngineError::Analytics(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Engine(EngineError::Api(_)) => StatusCode::BAD_GATEWAY,
            AppError::Engine(EngineError::Configuration(_)) | AppError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The message shown to the user. Server-side failures are not echoed back.
    pub fn public_message(&self) -> String {
        match self.status() {
            StatusCode::INTERNAL_SERVER_ERROR => "An internal server error occurred".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = ?self, "Request failed.");
        } else {
            tracing::warn!(error = %self, "Request rejected.");
        }

        let body = Json(json!({ "error": self.public_message() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn maps_failures_to_status_codes() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let no_data = AppError::Engine(EngineError::Analytics(AnalyticsError::NoDataAvailable {
            ticker: "X".to_string(),
            start: d,
            end: d,
        }));
        assert_eq!(no_data.status(), StatusCode::NOT_FOUND);

        let undefined = AppError::Engine(EngineError::Analytics(AnalyticsError::UndefinedRatio(
            "Sharpe".to_string(),
        )));
        assert_eq!(undefined.status(), StatusCode::UNPROCESSABLE_ENTITY);

        assert_eq!(AppError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);

        let io = AppError::Io(std::io::Error::other("disk full"));
        assert_eq!(io.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(io.public_message(), "An internal server error occurred");
    }
}
