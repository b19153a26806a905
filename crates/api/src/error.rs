//! HTTP error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;
use tsnt_core::finance::FinanceError;
use tsnt_shared::AccessError;

/// Error returned by handlers, rendered as `{ "error": <code>, "message": <text> }`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    /// Builds an error with an explicit status and code.
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// Returns the response status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }
}

impl From<FinanceError> for ApiError {
    fn from(err: FinanceError) -> Self {
        let status = StatusCode::from_u16(err.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!(code = err.error_code(), error = %err, "finance operation failed");
        }
        Self::new(status, err.error_code(), err.to_string())
    }
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::FORBIDDEN);
        Self::new(status, err.error_code(), err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({
                "error": self.code,
                "message": self.message,
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tsnt_shared::Role;
    use tsnt_shared::types::FundId;

    #[rstest]
    #[case(FinanceError::FundNotFound(FundId::new()), StatusCode::NOT_FOUND, "FUND_NOT_FOUND")]
    #[case(FinanceError::validation("bad"), StatusCode::BAD_REQUEST, "VALIDATION_ERROR")]
    #[case(FinanceError::ConcurrentModification, StatusCode::CONFLICT, "CONCURRENT_MODIFICATION")]
    #[case(
        FinanceError::Storage("down".to_string()),
        StatusCode::INTERNAL_SERVER_ERROR,
        "STORAGE_ERROR"
    )]
    fn test_finance_error_mapping(
        #[case] err: FinanceError,
        #[case] status: StatusCode,
        #[case] code: &str,
    ) {
        let api: ApiError = err.into();
        assert_eq!(api.status(), status);
        assert_eq!(api.code(), code);
    }

    #[test]
    fn test_access_error_mapping() {
        let api: ApiError = AccessError::MissingRole(vec![Role::Admin]).into();
        assert_eq!(api.status(), StatusCode::FORBIDDEN);
        assert_eq!(api.code(), "FORBIDDEN");

        let api: ApiError = AccessError::Unauthenticated.into();
        assert_eq!(api.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(api.code(), "UNAUTHORIZED");
    }
}
