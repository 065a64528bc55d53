use axum::{http::StatusCode, Json};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::domains::wallet::models::{RequestStatus, RequestType, EntryKind};
use crate::shared::utils::response::error_body;

/// 지갑 원장 / 입출금 요청 관련 에러
/// Wallet ledger and request workflow errors
#[derive(Error, Debug)]
pub enum WalletError {
    /// 금액이 0 이하이거나 고정소수점 값이 아님
    /// Amount <= 0 or not a valid fixed-point value
    #[error("Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    /// 잔액 부족
    /// Insufficient balance
    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: Decimal, available: Decimal },

    /// 지갑을 찾을 수 없음
    /// Wallet not found
    #[error("Wallet not found")]
    WalletNotFound { owner_id: u64 },

    /// 요청을 찾을 수 없음
    /// Wallet request not found
    #[error("Wallet request not found")]
    RequestNotFound { id: i64 },

    /// 이미 처리된 요청 (approved / rejected)
    /// Request is no longer pending
    #[error("Request already {status}")]
    AlreadyDecided { id: i64, status: RequestStatus },

    /// 증빙 이미지 누락
    /// Evidence image missing
    #[error("Evidence image is required")]
    MissingEvidence,

    /// 출금 대상 누락
    /// Payout destination missing
    #[error("Withdrawal destination is required")]
    MissingDestination,

    /// 거절 사유 누락
    /// Rejection reason missing
    #[error("Rejection reason is required")]
    MissingReason,

    /// 요청 종류 불일치 (입금 요청을 출금으로 승인 등)
    /// Approval endpoint does not match request type
    #[error("Request is a {actual} request, not a {expected} request")]
    RequestTypeMismatch { id: i64, expected: RequestType, actual: RequestType },

    /// credit/debit 방향과 맞지 않는 엔트리 종류
    /// Entry kind does not match the operation direction
    #[error("Entry kind '{kind}' cannot be used for this operation")]
    InvalidEntryKind { kind: EntryKind },

    /// 자기 자신에게 송금
    /// Transfer to the same wallet
    #[error("Cannot transfer to the same wallet")]
    SelfTransfer,

    /// 잘못된 쿼리 파라미터
    /// Invalid query parameter
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// 잘못된 요청 본문
    /// Malformed request body
    #[error("Invalid request body: {0}")]
    InvalidPayload(String),

    /// 잠금 대기 / 저장소 작업 시간 초과 (재시도 가능)
    /// Lock wait or storage deadline exceeded; safe to retry
    #[error("Ledger is busy, please retry")]
    LedgerBusy,

    /// 데이터베이스 에러
    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// 내부 서버 에러
    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl WalletError {
    /// HTTP 상태 코드
    /// Transport status for this error kind
    pub fn status_code(&self) -> StatusCode {
        match self {
            WalletError::InvalidAmount { .. }
            | WalletError::MissingEvidence
            | WalletError::MissingDestination
            | WalletError::MissingReason
            | WalletError::RequestTypeMismatch { .. }
            | WalletError::InvalidEntryKind { .. }
            | WalletError::SelfTransfer
            | WalletError::InvalidQuery(_)
            | WalletError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            WalletError::InsufficientBalance { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            WalletError::WalletNotFound { .. } | WalletError::RequestNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            WalletError::AlreadyDecided { .. } => StatusCode::CONFLICT,
            WalletError::LedgerBusy => StatusCode::SERVICE_UNAVAILABLE,
            WalletError::DatabaseError(_) | WalletError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// 클라이언트에 보여줄 메시지 (내부 정보는 숨김)
    /// Client-facing message; storage details stay in the logs
    pub fn public_message(&self) -> String {
        match self {
            WalletError::DatabaseError(_) | WalletError::Internal(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<sqlx::Error> for WalletError {
    fn from(err: sqlx::Error) -> Self {
        // 55P03 lock_not_available (lock_timeout), 57014 query_canceled (statement_timeout),
        // 40P01 deadlock_detected
        if let sqlx::Error::Database(db_err) = &err {
            if matches!(db_err.code().as_deref(), Some("55P03") | Some("57014") | Some("40P01")) {
                return WalletError::LedgerBusy;
            }
        }
        if matches!(err, sqlx::Error::PoolTimedOut) {
            return WalletError::LedgerBusy;
        }
        WalletError::DatabaseError(err.to_string())
    }
}

/// WalletError를 HTTP 응답으로 변환
impl From<WalletError> for (StatusCode, Json<serde_json::Value>) {
    fn from(err: WalletError) -> Self {
        let status = err.status_code();
        if status.is_server_error() {
            tracing::error!(error = %err, "wallet request failed");
        }
        error_body(status, err.public_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_failures_map_to_client_errors() {
        let cases = [
            (WalletError::InvalidAmount { reason: "x".into() }, StatusCode::BAD_REQUEST),
            (
                WalletError::InsufficientBalance { required: Decimal::ONE, available: Decimal::ZERO },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (WalletError::RequestNotFound { id: 1 }, StatusCode::NOT_FOUND),
            (
                WalletError::AlreadyDecided { id: 1, status: RequestStatus::Approved },
                StatusCode::CONFLICT,
            ),
            (WalletError::LedgerBusy, StatusCode::SERVICE_UNAVAILABLE),
        ];
        for (err, status) in cases {
            assert_eq!(err.status_code(), status, "{:?}", err);
        }
    }

    #[test]
    fn storage_details_are_not_exposed() {
        let err = WalletError::DatabaseError("relation wallets does not exist".into());
        assert_eq!(err.public_message(), "Internal server error");

        let (status, Json(body)) = err.into();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error");
        assert_eq!(body["status"], 500);
    }

    #[test]
    fn already_decided_names_the_terminal_state() {
        let err = WalletError::AlreadyDecided { id: 9, status: RequestStatus::Approved };
        assert_eq!(err.to_string(), "Request already approved");
    }
}
