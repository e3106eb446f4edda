use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// Everything a handler can fail with. Unexpected store/transport errors
/// land in `Internal` and are collapsed to a generic message at the boundary.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    BadRequest(&'static str),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account not approved by admin")]
    NotApproved,

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(&'static str),

    #[error("Attendance window has not started yet")]
    WindowNotOpen,

    #[error("Attendance window has ended")]
    WindowClosed,

    #[error("{0}")]
    AlreadyMarked(&'static str),

    #[error("Invalid or expired token")]
    InvalidOrExpiredToken,

    #[error("Invalid or expired OTP")]
    InvalidOrExpiredOtp,

    #[error("Server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_)
            | Self::BadRequest(_)
            | Self::WindowNotOpen
            | Self::WindowClosed
            | Self::InvalidOrExpiredToken
            | Self::InvalidOrExpiredOtp => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::NotApproved | Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) | Self::AlreadyMarked(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(e) = &self {
            error!(error = %e, "internal error");
        }
        let status = self.status_code();
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        Self::Internal(e.into())
    }
}

/// Maps a unique-constraint violation (Postgres 23505) to the given domain
/// error, anything else to `Internal`. The store's constraint is the
/// authoritative duplicate check under concurrent inserts.
pub fn on_unique(e: sqlx::Error, conflict: ApiError) -> ApiError {
    let is_unique = e
        .as_database_error()
        .and_then(|d| d.code())
        .map(|c| c == "23505")
        .unwrap_or(false);
    if is_unique {
        conflict
    } else {
        ApiError::Internal(e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(
            ApiError::Validation("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::BadRequest("Current password required").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unauthorized("No token provided").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::NotApproved.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::Forbidden("Only admin allowed").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(ApiError::NotFound("Task").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Conflict("User already exists").status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::AlreadyMarked("Attendance already marked for this task").status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(ApiError::WindowNotOpen.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::WindowClosed.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::InvalidOrExpiredToken.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::InvalidOrExpiredOtp.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_message_includes_subject() {
        assert_eq!(ApiError::NotFound("User").to_string(), "User not found");
        assert_eq!(ApiError::NotFound("Task").to_string(), "Task not found");
    }

    #[test]
    fn internal_message_is_generic() {
        let err = ApiError::Internal(anyhow::anyhow!("connection refused to 10.0.0.3"));
        assert_eq!(err.to_string(), "Server error");
    }

    #[test]
    fn plain_sqlx_errors_collapse_to_internal() {
        let err = on_unique(
            sqlx::Error::RowNotFound,
            ApiError::AlreadyMarked("Attendance already marked for this task"),
        );
        assert!(matches!(err, ApiError::Internal(_)));
        assert_eq!(err.to_string(), "Server error");
    }
}
