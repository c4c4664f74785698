//! `ApiError` → HTTP response.

use api::ApiError;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Response-side wrapper so handlers can `?` on service calls.
#[derive(Debug)]
pub struct HttpError(pub ApiError);

impl HttpError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict => StatusCode::CONFLICT,
            ApiError::InvalidCredentials | ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for HttpError {
    fn from(err: JsonRejection) -> Self {
        Self(ApiError::Validation(format!("Invalid request: {}", err.body_text())))
    }
}

impl From<PathRejection> for HttpError {
    fn from(_: PathRejection) -> Self {
        Self(ApiError::Validation("Note id must be an integer".into()))
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(serde_json::json!({ "error": self.0.public_message() }));

        if matches!(self.0, ApiError::Unauthorized(_)) {
            return (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response();
        }
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api::auth::TokenError;

    #[test]
    fn test_status_codes() {
        let cases = [
            (ApiError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::Conflict, StatusCode::CONFLICT),
            (ApiError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (ApiError::Unauthorized(TokenError::Expired), StatusCode::UNAUTHORIZED),
            (ApiError::NotFound, StatusCode::NOT_FOUND),
            (ApiError::Internal("db".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(HttpError(err).status(), status);
        }
    }

    #[test]
    fn test_unauthorized_carries_challenge() {
        let resp = HttpError(ApiError::Unauthorized(TokenError::Missing)).into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(resp.headers()[header::WWW_AUTHENTICATE], "Bearer");

        let resp = HttpError(ApiError::InvalidCredentials).into_response();
        assert!(resp.headers().get(header::WWW_AUTHENTICATE).is_none());
    }
}
