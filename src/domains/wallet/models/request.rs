use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::amount::Amount;
use super::transaction::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use crate::shared::errors::WalletError;

// =====================================================
// WalletRequest (입출금 요청) 모델
// =====================================================
// 상태 전이:
//   pending ──approve──> approved   (원장 엔트리 1건 생성)
//   pending ──reject───> rejected   (원장 변경 없음)
// approved / rejected 는 종료 상태 (다시 변경 불가)
//
// 증빙 이미지:
// - 입금: 생성 시 필수 (사용자가 송금 증빙 업로드)
// - 출금: 승인 시 필수 (관리자가 지급 증빙 업로드)
// =====================================================

/// 요청 종류
/// Request type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    Deposit,
    Withdrawal,
}

impl RequestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::Deposit => "deposit",
            RequestType::Withdrawal => "withdrawal",
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestType {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deposit" => Ok(RequestType::Deposit),
            "withdrawal" => Ok(RequestType::Withdrawal),
            other => Err(WalletError::InvalidQuery(format!(
                "unknown request type '{}'",
                other
            ))),
        }
    }
}

/// 요청 상태
/// Request status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "approved" => Ok(RequestStatus::Approved),
            "rejected" => Ok(RequestStatus::Rejected),
            other => Err(WalletError::InvalidQuery(format!(
                "unknown request status '{}'",
                other
            ))),
        }
    }
}

/// 입출금 요청 (감사 기록으로 영구 보관)
/// Wallet deposit/withdrawal request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(as = WalletRequest)]
pub struct WalletRequest {
    pub id: i64,

    pub owner_id: u64,

    #[serde(rename = "type")]
    pub request_type: RequestType,

    #[schema(value_type = String, example = "100.00")]
    pub amount: Amount,

    pub status: RequestStatus,

    /// Proof-of-payment (deposit) or proof-of-payout (withdrawal) reference
    /// 증빙 이미지 참조 (파일 자체는 저장하지 않음)
    pub evidence_image: Option<String>,

    /// External payout destination (withdrawal only)
    /// 출금 대상 계좌/지갑
    pub wallet_destination: Option<String>,

    pub decided_by_admin_id: Option<u64>,

    pub rejection_reason: Option<String>,

    pub created_at: DateTime<Utc>,

    pub decided_at: Option<DateTime<Utc>>,
}

impl WalletRequest {
    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}

/// 요청 생성용 내부 모델 (DB 저장용)
/// Internal model for inserting a request
#[derive(Debug, Clone)]
pub struct NewWalletRequest {
    pub owner_id: u64,
    pub request_type: RequestType,
    pub amount: Amount,
    pub evidence_image: Option<String>,
    pub wallet_destination: Option<String>,
}

/// 요청 목록 필터
/// Request listing filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestFilter {
    pub owner_id: Option<u64>,
    pub request_type: Option<RequestType>,
    pub status: Option<RequestStatus>,
}

impl RequestFilter {
    pub fn matches(&self, request: &WalletRequest) -> bool {
        self.owner_id.is_none_or(|owner| request.owner_id == owner)
            && self.request_type.is_none_or(|t| request.request_type == t)
            && self.status.is_none_or(|s| request.status == s)
    }
}

/// 요청 목록 쿼리 파라미터
/// Raw query string for request listings
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RequestListParams {
    /// deposit | withdrawal
    #[serde(rename = "type")]
    pub request_type: Option<String>,
    /// pending | approved | rejected
    pub status: Option<String>,
    /// 1-based page (admin listing only)
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

fn parse_optional<T: FromStr<Err = WalletError>>(raw: Option<&str>) -> Result<Option<T>, WalletError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some),
    }
}

impl RequestListParams {
    pub fn filter(&self) -> Result<RequestFilter, WalletError> {
        Ok(RequestFilter {
            owner_id: None,
            request_type: parse_optional(self.request_type.as_deref())?,
            status: parse_optional(self.status.as_deref())?,
        })
    }

    pub fn page(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }
}

/// 관리자 목록 페이지 지정 (1부터 시작)
/// 1-based page selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// 요청 목록 페이지 (최신순)
/// Page of wallet requests, newest first
#[derive(Debug, Serialize, ToSchema)]
#[schema(as = WalletRequestPage)]
pub struct WalletRequestPage {
    pub items: Vec<WalletRequest>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

// =====================================================
// 요청 본문 (Request bodies)
// =====================================================

/// 입금 요청 생성
/// Create deposit request body
#[derive(Debug, Deserialize, ToSchema)]
#[schema(as = CreateDepositRequest)]
pub struct CreateDepositRequest {
    #[schema(value_type = String, example = "100.00")]
    pub amount: Amount,

    /// Reference returned by the evidence upload service
    /// 증빙 이미지 참조
    #[serde(default)]
    #[schema(example = "uploads/evidence/ev1.png")]
    pub evidence_image: String,
}

/// 출금 요청 생성
/// Create withdrawal request body
#[derive(Debug, Deserialize, ToSchema)]
#[schema(as = CreateWithdrawalRequest)]
pub struct CreateWithdrawalRequest {
    #[schema(value_type = String, example = "50.00")]
    pub amount: Amount,

    /// External payout identifier (bank account, e-wallet number, ...)
    /// 출금 대상
    #[serde(default)]
    #[schema(example = "BANK-001-2233445566")]
    pub destination: String,
}

/// 출금 승인 (관리자 지급 증빙)
/// Approve withdrawal body
#[derive(Debug, Deserialize, ToSchema)]
#[schema(as = ApproveWithdrawalRequest)]
pub struct ApproveWithdrawalRequest {
    #[serde(default)]
    #[schema(example = "uploads/evidence/payout-17.png")]
    pub evidence_image: String,
}

/// 요청 거절
/// Reject request body
#[derive(Debug, Deserialize, ToSchema)]
#[schema(as = RejectWalletRequest)]
pub struct RejectWalletRequest {
    #[serde(default)]
    #[schema(example = "Transfer not found on statement")]
    pub reason: String,
}

/// 관리자 결정 결과
/// Outcome of an administrator decision
#[derive(Debug, Clone, Serialize, ToSchema)]
#[schema(as = RequestDecisionResponse)]
pub struct RequestDecisionResponse {
    pub request: WalletRequest,

    /// Ledger entry produced by an approval (absent for rejections)
    /// 승인 시 생성된 원장 엔트리
    pub transaction: Option<super::transaction::TransactionEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_params_build_filters() {
        let params = RequestListParams {
            request_type: Some("withdrawal".to_string()),
            status: Some(" pending ".to_string()),
            page: Some(3),
            limit: Some(10),
        };
        let filter = params.filter().unwrap();
        assert_eq!(filter.request_type, Some(RequestType::Withdrawal));
        assert_eq!(filter.status, Some(RequestStatus::Pending));
        assert_eq!(params.page().offset(), 20);
    }

    #[test]
    fn empty_params_mean_no_filter() {
        let params = RequestListParams {
            request_type: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(params.filter().unwrap(), RequestFilter::default());
        assert_eq!(params.page(), PageRequest { page: 1, limit: DEFAULT_PAGE_LIMIT });
    }

    #[test]
    fn unknown_status_is_rejected() {
        let params = RequestListParams {
            status: Some("cancelled".to_string()),
            ..Default::default()
        };
        assert!(matches!(params.filter(), Err(WalletError::InvalidQuery(_))));
    }

    #[test]
    fn only_pending_is_non_terminal() {
        assert!(!RequestStatus::Pending.is_terminal());
        assert!(RequestStatus::Approved.is_terminal());
        assert!(RequestStatus::Rejected.is_terminal());
    }
}
