use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::features::SchemaError;
use crate::model::ModelError;

pub const SAME_LOCATION_MESSAGE: &str =
    "Pickup and dropoff locations are the same. Please enter different coordinates.";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    /// Pickup and dropoff resolve to the same point, so there is nothing to price
    #[error("Pickup and dropoff locations are the same. Please enter different coordinates.")]
    SameLocation,

    #[error("Invalid feature record: {0}")]
    Schema(#[from] SchemaError),

    #[error("Model inference failed: {0}")]
    Model(#[from] ModelError),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::Schema(_) => StatusCode::BAD_REQUEST,
            AppError::SameLocation => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Model(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::BadRequest("nope".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::SameLocation.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::from(SchemaError::MissingColumn("distance".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(ModelError::NonFiniteOutput(f64::INFINITY)).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_same_location_message() {
        assert_eq!(AppError::SameLocation.to_string(), SAME_LOCATION_MESSAGE);
    }
}
