use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::amount::money;

// =====================================================
// Wallet 모델
// =====================================================
// 역할: 사용자 1명당 1개의 단일 통화 잔고
//
// 불변식:
// - balance >= 0
// - balance == 해당 사용자 WalletTransaction.signed_amount 합계
// - LedgerService(원장 서비스)만 balance를 변경
// =====================================================

/// 지갑 정보 (데이터베이스에서 조회한 잔고)
/// Wallet information (one per owner)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(as = Wallet)]
pub struct Wallet {
    /// Wallet ID (BIGSERIAL, auto-generated)
    /// 지갑 ID
    pub id: i64,

    /// Owner (user) ID
    /// 지갑 소유자 ID
    pub owner_id: u64,

    /// Current balance, fixed-point string
    /// 현재 잔고 (소수점 2자리 문자열)
    #[serde(with = "money")]
    #[schema(value_type = String, example = "100.00")]
    pub balance: Decimal,

    /// Created timestamp
    pub created_at: DateTime<Utc>,

    /// Updated timestamp (last balance mutation)
    pub updated_at: DateTime<Utc>,
}

/// 지갑 조회 응답
/// Wallet response payload
#[derive(Debug, Serialize, ToSchema)]
#[schema(as = WalletResponse)]
pub struct WalletResponse {
    pub wallet: Wallet,
}

/// 부분 차감 결과
/// Result of a best-effort debit
#[derive(Debug, Clone, Serialize)]
pub struct PartialDebit {
    /// 실제 차감된 금액 (min(balance, amount))
    #[serde(with = "money")]
    pub deducted: Decimal,

    /// 차감하지 못한 나머지 금액
    #[serde(with = "money")]
    pub remaining: Decimal,

    pub wallet: Wallet,
}

/// 송금 결과 (보낸 사람 / 받은 사람 지갑)
/// Result of a wallet-to-wallet transfer
#[derive(Debug, Clone, Serialize)]
pub struct TransferOutcome {
    pub from: Wallet,
    pub to: Wallet,
}
