use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::amount::{money, Amount};
use crate::shared::errors::WalletError;

// =====================================================
// WalletTransaction (원장 엔트리) 모델
// =====================================================
// 역할: 잔고를 변경한 이벤트 1건의 불변 기록
//
// 규칙:
// - amount는 항상 양수로 저장
// - credit 종류: balance_after = balance_before + amount
// - debit 종류:  balance_after = balance_before - amount
// - 같은 지갑의 연속된 엔트리: e1.balance_after == e2.balance_before
// - 추가만 가능 (수정/삭제 없음)
// =====================================================

/// 잔고 변경 방향
/// Direction of a balance change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Credit,
    Debit,
}

/// 원장 엔트리 종류
/// Ledger entry kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Deposit,
    Withdrawal,
    Payment,
    Refund,
    TransferIn,
    TransferOut,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Deposit => "deposit",
            EntryKind::Withdrawal => "withdrawal",
            EntryKind::Payment => "payment",
            EntryKind::Refund => "refund",
            EntryKind::TransferIn => "transfer_in",
            EntryKind::TransferOut => "transfer_out",
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            EntryKind::Deposit | EntryKind::Refund | EntryKind::TransferIn => Direction::Credit,
            EntryKind::Withdrawal | EntryKind::Payment | EntryKind::TransferOut => Direction::Debit,
        }
    }

    pub fn is_credit(&self) -> bool {
        self.direction() == Direction::Credit
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryKind {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deposit" => Ok(EntryKind::Deposit),
            "withdrawal" => Ok(EntryKind::Withdrawal),
            "payment" => Ok(EntryKind::Payment),
            "refund" => Ok(EntryKind::Refund),
            "transfer_in" => Ok(EntryKind::TransferIn),
            "transfer_out" => Ok(EntryKind::TransferOut),
            other => Err(WalletError::InvalidQuery(format!(
                "unknown transaction type '{}'",
                other
            ))),
        }
    }
}

/// 원장 엔트리가 가리키는 대상
/// What a ledger entry is linked to
///
/// 주문 ID, 입출금 요청 ID, 송금 상대방 ID를 문자열 하나로 섞어 쓰지 않도록 구분
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum Reference {
    None,
    Order(String),
    WalletRequest(i64),
    TransferPeer(u64),
}

impl Reference {
    /// DB 저장용 (reference_type, reference_id) 분해
    /// Split into the (reference_type, reference_id) column pair
    pub fn to_columns(&self) -> (Option<&'static str>, Option<String>) {
        match self {
            Reference::None => (None, None),
            Reference::Order(id) => (Some("order"), Some(id.clone())),
            Reference::WalletRequest(id) => (Some("wallet_request"), Some(id.to_string())),
            Reference::TransferPeer(owner_id) => (Some("transfer_peer"), Some(owner_id.to_string())),
        }
    }

    /// DB 컬럼에서 복원
    /// Rebuild from the stored column pair
    pub fn from_columns(
        reference_type: Option<&str>,
        reference_id: Option<String>,
    ) -> Result<Self, WalletError> {
        let corrupt = |what: &str| {
            WalletError::DatabaseError(format!("corrupt transaction reference: {}", what))
        };

        match (reference_type, reference_id) {
            (None, _) => Ok(Reference::None),
            (Some("order"), Some(id)) => Ok(Reference::Order(id)),
            (Some("wallet_request"), Some(id)) => id
                .parse()
                .map(Reference::WalletRequest)
                .map_err(|_| corrupt("wallet_request id")),
            (Some("transfer_peer"), Some(id)) => id
                .parse()
                .map(Reference::TransferPeer)
                .map_err(|_| corrupt("transfer_peer id")),
            (Some(other), _) => Err(corrupt(other)),
        }
    }
}

/// 원장 엔트리 (불변)
/// Immutable ledger entry
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(as = WalletTransaction)]
pub struct TransactionEntry {
    /// Entry ID, strictly increasing in application order
    /// 엔트리 ID (적용 순서대로 증가)
    pub id: i64,

    pub owner_id: u64,

    #[serde(rename = "type")]
    pub kind: EntryKind,

    /// Always positive
    /// 항상 양수
    #[schema(value_type = String, example = "100.00")]
    pub amount: Amount,

    #[serde(with = "money")]
    #[schema(value_type = String, example = "0.00")]
    pub balance_before: Decimal,

    #[serde(with = "money")]
    #[schema(value_type = String, example = "100.00")]
    pub balance_after: Decimal,

    pub description: String,

    #[schema(value_type = Object)]
    pub reference: Reference,

    pub created_at: DateTime<Utc>,
}

impl TransactionEntry {
    /// 부호 있는 금액 (credit: +, debit: -)
    /// Signed contribution of this entry to the balance
    pub fn signed_amount(&self) -> Decimal {
        match self.kind.direction() {
            Direction::Credit => self.amount.value(),
            Direction::Debit => -self.amount.value(),
        }
    }
}

/// 원장 조회 필터 (정규화 완료)
/// Normalised transaction listing query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionQuery {
    pub kind: Option<EntryKind>,
    pub limit: i64,
    pub offset: i64,
}

pub const DEFAULT_PAGE_LIMIT: i64 = 20;
pub const MAX_PAGE_LIMIT: i64 = 100;

impl TransactionQuery {
    /// limit: 기본 20, [1, 100]로 제한 / offset: 음수면 0
    pub fn new(kind: Option<EntryKind>, limit: Option<i64>, offset: Option<i64>) -> Self {
        Self {
            kind,
            limit: limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT),
            offset: offset.unwrap_or(0).max(0),
        }
    }
}

impl Default for TransactionQuery {
    fn default() -> Self {
        Self::new(None, None, None)
    }
}

/// 원장 조회 쿼리 파라미터 (원본 문자열)
/// Raw query string for `GET /api/wallet/transactions`
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TransactionListParams {
    /// deposit | withdrawal | payment | refund | transfer_in | transfer_out
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl TransactionListParams {
    pub fn into_query(self) -> Result<TransactionQuery, WalletError> {
        let kind = match self.kind.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse()?),
        };
        Ok(TransactionQuery::new(kind, self.limit, self.offset))
    }
}

/// 원장 엔트리 페이지 (최신순)
/// Page of ledger entries, newest first
#[derive(Debug, Serialize, ToSchema)]
#[schema(as = TransactionPage)]
pub struct TransactionPage {
    pub items: Vec<TransactionEntry>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_have_fixed_directions() {
        for kind in [EntryKind::Deposit, EntryKind::Refund, EntryKind::TransferIn] {
            assert!(kind.is_credit(), "{} should credit", kind);
        }
        for kind in [EntryKind::Withdrawal, EntryKind::Payment, EntryKind::TransferOut] {
            assert!(!kind.is_credit(), "{} should debit", kind);
        }
    }

    #[test]
    fn reference_columns_survive_storage() {
        let cases = [
            Reference::None,
            Reference::Order("ORD-77".to_string()),
            Reference::WalletRequest(12),
            Reference::TransferPeer(42),
        ];
        for reference in cases {
            let (kind, id) = reference.to_columns();
            assert_eq!(Reference::from_columns(kind, id).unwrap(), reference);
        }
    }

    #[test]
    fn unknown_reference_type_is_rejected() {
        let err = Reference::from_columns(Some("coupon"), Some("1".to_string())).unwrap_err();
        assert!(matches!(err, WalletError::DatabaseError(_)));
    }

    #[test]
    fn query_limits_are_clamped() {
        let q = TransactionQuery::new(None, Some(5_000), Some(-3));
        assert_eq!(q.limit, MAX_PAGE_LIMIT);
        assert_eq!(q.offset, 0);

        let q = TransactionQuery::new(None, Some(0), None);
        assert_eq!(q.limit, 1);
    }

    #[test]
    fn list_params_parse_kind_filter() {
        let params = TransactionListParams {
            kind: Some("transfer_out".to_string()),
            limit: None,
            offset: Some(10),
        };
        let q = params.into_query().unwrap();
        assert_eq!(q.kind, Some(EntryKind::TransferOut));
        assert_eq!(q.limit, DEFAULT_PAGE_LIMIT);
        assert_eq!(q.offset, 10);

        let bad = TransactionListParams {
            kind: Some("bonus".to_string()),
            ..Default::default()
        };
        assert!(matches!(bad.into_query(), Err(WalletError::InvalidQuery(_))));
    }
}
