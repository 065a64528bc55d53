use axum::{http::StatusCode, Json};
use thiserror::Error;

use crate::shared::utils::response::error_body;

/// 인증 관련 에러
/// Authentication-related errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// 토큰이 제공되지 않음
    /// Token not provided
    #[error("Missing authorization header")]
    MissingToken,

    /// 잘못된 Authorization 헤더 형식
    /// Malformed Authorization header
    #[error("Invalid authorization format. Expected: 'Bearer <token>'")]
    InvalidFormat,

    /// 잘못된 또는 만료된 토큰
    /// Invalid or expired token
    #[error("Invalid or expired token")]
    InvalidToken,

    /// 관리자 권한 필요
    /// Administrator role required
    #[error("Administrator role required")]
    AdminRequired,

    /// 내부 서버 에러
    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// AuthError를 HTTP 응답으로 변환
impl From<AuthError> for (StatusCode, Json<serde_json::Value>) {
    fn from(err: AuthError) -> Self {
        let status = match &err {
            AuthError::MissingToken | AuthError::InvalidFormat | AuthError::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::AdminRequired => StatusCode::FORBIDDEN,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        error_body(status, err.to_string())
    }
}
