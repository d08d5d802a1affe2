//! # API Error Mapping
//!
//! Translates layer errors into HTTP responses with a uniform JSON body:
//! `{"error": "<message>"}`.
//!
//! ## Status Mapping
//! | Error                                   | Status |
//! |-----------------------------------------|--------|
//! | `NotFound`                              | 404    |
//! | `Conflict` (concurrent stock update)    | 409    |
//! | domain rejections, referential guards,  | 400    |
//! |   unique violations                     |        |
//! | everything else                         | 500    |
//!
//! Internal errors are logged with their real cause but never leak it to
//! the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use brickyard_db::DbError;

/// Wraps a [`DbError`] for conversion into an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub DbError);

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            DbError::NotFound { .. } => (StatusCode::NOT_FOUND, self.0.to_string()),

            DbError::Conflict(_) => (StatusCode::CONFLICT, self.0.to_string()),

            DbError::Domain(_)
            | DbError::ForeignKeyViolation { .. }
            | DbError::UniqueViolation { .. } => (StatusCode::BAD_REQUEST, self.0.to_string()),

            other => {
                error!(error = %other, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use brickyard_core::CoreError;

    #[test]
    fn not_found_maps_to_404() {
        let resp = ApiError(DbError::not_found("Sale", "s-1")).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn domain_rejection_maps_to_400() {
        let err = DbError::Domain(CoreError::InsufficientStock {
            name: "Brick".into(),
            available: 3,
            requested: 10,
        });
        let resp = ApiError(err).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn conflict_maps_to_409() {
        let resp = ApiError(DbError::Conflict("stock changed".into())).into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn internal_errors_hide_their_cause() {
        let resp = ApiError(DbError::Internal("secret detail".into())).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
