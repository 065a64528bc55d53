use axum::{http::StatusCode, Json};
use serde::Serialize;
use serde_json::json;

// =====================================================
// 공통 응답 포맷
// =====================================================
// 모든 응답: { "status": 200, "message": "...", "data": {...} | null }
// 금액은 항상 고정소수점 문자열로 직렬화됨 (models::amount 참고)
// =====================================================

/// 공통 응답 봉투
/// Response envelope shared by every endpoint
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub message: String,
    pub data: Option<T>,
}

/// 핸들러 결과 타입 (성공: 봉투, 실패: 에러 봉투)
/// Handler result type
pub type ApiResult<T> =
    Result<(StatusCode, Json<ApiResponse<T>>), (StatusCode, Json<serde_json::Value>)>;

impl<T: Serialize> ApiResponse<T> {
    pub fn with_status(status: StatusCode, message: impl Into<String>, data: T) -> (StatusCode, Json<Self>) {
        (
            status,
            Json(Self {
                status: status.as_u16(),
                message: message.into(),
                data: Some(data),
            }),
        )
    }

    /// 200 OK
    pub fn ok(message: impl Into<String>, data: T) -> (StatusCode, Json<Self>) {
        Self::with_status(StatusCode::OK, message, data)
    }

    /// 201 Created
    pub fn created(message: impl Into<String>, data: T) -> (StatusCode, Json<Self>) {
        Self::with_status(StatusCode::CREATED, message, data)
    }
}

/// 에러 응답 봉투 (data: null)
/// Error envelope
pub fn error_body(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<serde_json::Value>) {
    (
        status,
        Json(json!({
            "status": status.as_u16(),
            "message": message.into(),
            "data": null,
        })),
    )
}
