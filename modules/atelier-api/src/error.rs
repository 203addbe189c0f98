use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::error;

use atelier_common::AtelierError;

/// Wrapper that maps the core error taxonomy to HTTP responses. The
/// mapping lives here and nowhere else; handlers return `ApiError` and let
/// this impl pick the status. Internal detail is logged server-side and
/// replaced with a generic message; SQL text and connection strings never
/// reach a response body.
pub struct ApiError(pub AtelierError);

impl From<AtelierError> for ApiError {
    fn from(e: AtelierError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            AtelierError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AtelierError::Authorization(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AtelierError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AtelierError::Internal(detail) => {
                error!(error = %detail, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (
            status,
            Json(serde_json::json!({ "success": false, "error": message })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(e: AtelierError) -> StatusCode {
        ApiError(e).into_response().status()
    }

    #[test]
    fn taxonomy_maps_to_expected_statuses() {
        assert_eq!(
            status_of(AtelierError::Validation("bad".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AtelierError::Authorization("who".into())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AtelierError::NotFound("gone".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AtelierError::Internal("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_detail_is_not_leaked() {
        let response =
            ApiError(AtelierError::Internal("postgres://user:pw@db/secret".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        // Body is a fixed generic message; the detail only goes to the log.
    }
}
