//! HTTP error mapping.

use api_shared::requests::MessageRes;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use opx_core::OpxError;

/// API-level error: an HTTP status plus a JSON message body.
///
/// Handlers return `Result<_, ApiError>`; core errors convert via `From`,
/// so `?` works directly on repository calls.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized,
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::BadRequest(m)
            | ApiError::Forbidden(m)
            | ApiError::NotFound(m)
            | ApiError::Conflict(m) => m.clone(),
            ApiError::Unauthorized => "authentication required".into(),
            // Internal details go to the log, not the client.
            ApiError::Internal(_) => "internal server error".into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            tracing::error!("internal error: {detail}");
        }
        let body = Json(MessageRes {
            message: self.message(),
        });
        (self.status(), body).into_response()
    }
}

impl From<OpxError> for ApiError {
    fn from(err: OpxError) -> Self {
        match err {
            OpxError::InvalidInput(m) => ApiError::BadRequest(m),
            OpxError::InvalidState(m) => ApiError::Conflict(m),
            OpxError::NotFound(what) => ApiError::NotFound(format!("{what} not found")),
            OpxError::Conflict(m) => ApiError::Conflict(m),
            OpxError::Unauthorized => ApiError::Unauthorized,
            OpxError::Forbidden => ApiError::Forbidden("operation not permitted".into()),
            OpxError::Upload(e) => match e {
                opx_files::UploadError::EmptyFile
                | opx_files::UploadError::TooLarge { .. }
                | opx_files::UploadError::InvalidFilename(_) => ApiError::BadRequest(e.to_string()),
                opx_files::UploadError::UnknownToken(_) => ApiError::NotFound(e.to_string()),
                other => ApiError::Internal(other.to_string()),
            },
            other @ (OpxError::Database(_) | OpxError::PasswordHash(_) | OpxError::Io(_)) => {
                ApiError::Internal(other.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_expected_statuses() {
        let cases: [(OpxError, StatusCode); 5] = [
            (
                OpxError::InvalidInput("x".into()),
                StatusCode::BAD_REQUEST,
            ),
            (OpxError::NotFound("order"), StatusCode::NOT_FOUND),
            (OpxError::Conflict("dup".into()), StatusCode::CONFLICT),
            (OpxError::Unauthorized, StatusCode::UNAUTHORIZED),
            (
                OpxError::InvalidState("sealed".into()),
                StatusCode::CONFLICT,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn internal_errors_hide_details() {
        let err = ApiError::Internal("connection refused at 10.0.0.7".into());
        assert_eq!(err.message(), "internal server error");
    }
}
