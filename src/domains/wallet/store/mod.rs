// =====================================================
// 원장 저장소 모듈
// Ledger Store Module
// =====================================================
// 지갑(Wallet), 원장 엔트리(WalletTransaction), 입출금 요청(WalletRequest)의
// 영속화를 담당합니다. 비즈니스 정책은 두지 않습니다.
//
// 구조:
// - LedgerStore trait: 저장소 인터페이스 (서비스는 trait만 참조)
// - postgres: PostgreSQL 구현 (SELECT ... FOR UPDATE 행 잠금)
// - memory: 메모리 구현 (계정별 tokio Mutex), 테스트/벤치마크용
//
// 원자 단위 (atomic unit):
// commit(LedgerCommand) 하나만이 잔고를 변경할 수 있습니다.
// 1. (요청 결정 시) 요청 행 잠금 + pending 확인
// 2. 관련 지갑을 owner_id 오름차순으로 잠금 (교착 방지)
// 3. posting 순서대로 검증 (plan_postings)
// 4. 잔고 쓰기 + 엔트리 추가 + 요청 상태 변경
// 5. 커밋 (실패 시 아무것도 반영되지 않음)
// =====================================================

pub mod memory;
pub mod postgres;

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domains::wallet::models::{
    Amount, Direction, EntryKind, NewWalletRequest, PageRequest, Reference, RequestFilter,
    RequestStatus, TransactionEntry, TransactionQuery, Wallet, WalletRequest, amount::max_money,
};
use crate::shared::errors::WalletError;

pub use memory::MemoryLedgerStore;
pub use postgres::PgLedgerStore;

/// 차감 규칙
/// How a debit posting treats insufficient funds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebitRule {
    /// 잔고 부족 시 InsufficientBalance
    Strict,
    /// 가능한 만큼만 차감 (min(balance, amount)), 0이면 기록하지 않음
    Partial,
}

/// 잔고 변경 1건 (엔트리 1건에 대응)
/// One balance change inside an atomic unit
#[derive(Debug, Clone)]
pub struct Posting {
    pub owner_id: u64,
    pub kind: EntryKind,
    pub amount: Amount,
    pub rule: DebitRule,
    pub description: String,
    pub reference: Reference,
}

impl Posting {
    pub fn new(
        owner_id: u64,
        kind: EntryKind,
        amount: Amount,
        description: impl Into<String>,
        reference: Reference,
    ) -> Self {
        Self {
            owner_id,
            kind,
            amount,
            rule: DebitRule::Strict,
            description: description.into(),
            reference,
        }
    }

    pub fn partial(mut self) -> Self {
        self.rule = DebitRule::Partial;
        self
    }
}

/// 요청 상태 결정 (원자 단위에 포함)
/// Request transition applied in the same unit as the postings
#[derive(Debug, Clone)]
pub struct RequestDecision {
    pub request_id: i64,
    pub status: RequestStatus,
    pub admin_id: u64,
    pub evidence_image: Option<String>,
    pub rejection_reason: Option<String>,
}

/// 원자 단위 명령
/// Everything one atomic unit must apply, or nothing
#[derive(Debug, Clone, Default)]
pub struct LedgerCommand {
    pub postings: Vec<Posting>,
    pub decision: Option<RequestDecision>,
}

impl LedgerCommand {
    pub fn postings(postings: Vec<Posting>) -> Self {
        Self {
            postings,
            decision: None,
        }
    }

    pub fn with_decision(mut self, decision: RequestDecision) -> Self {
        self.decision = Some(decision);
        self
    }

    /// 잠가야 할 지갑 목록 (owner_id 오름차순, 중복 제거)
    /// Owners to lock, in the global acquisition order
    pub fn lock_order(&self) -> Vec<u64> {
        let mut owners: Vec<u64> = self.postings.iter().map(|p| p.owner_id).collect();
        owners.sort_unstable();
        owners.dedup();
        owners
    }
}

/// 커밋 결과
/// What a committed unit produced
#[derive(Debug, Clone, Default)]
pub struct CommitOutcome {
    /// 변경 후 지갑 (owner_id 오름차순)
    pub wallets: Vec<Wallet>,
    /// 새로 추가된 엔트리 (적용 순서)
    pub entries: Vec<TransactionEntry>,
    /// 결정된 요청
    pub request: Option<WalletRequest>,
}

impl CommitOutcome {
    pub fn wallet(&self, owner_id: u64) -> Option<&Wallet> {
        self.wallets.iter().find(|w| w.owner_id == owner_id)
    }
}

/// 검증이 끝난 엔트리 (아직 저장 전)
/// Entry validated against the locked balances, not yet written
#[derive(Debug, Clone)]
pub struct PlannedEntry {
    pub owner_id: u64,
    pub kind: EntryKind,
    pub amount: Amount,
    pub balance_before: Decimal,
    pub balance_after: Decimal,
    pub description: String,
    pub reference: Reference,
}

/// posting을 순서대로 검증하고 잔고 변화를 계산
/// Validate postings in order against the locked balances.
///
/// `balances`는 작업용 사본이며 성공 시 최종 잔고가 들어 있음.
/// 첫 실패에서 즉시 중단 (이후 posting은 시도하지 않음).
pub fn plan_postings(
    balances: &mut HashMap<u64, Decimal>,
    postings: &[Posting],
) -> Result<Vec<PlannedEntry>, WalletError> {
    let mut planned = Vec::with_capacity(postings.len());

    for posting in postings {
        let before = *balances
            .get(&posting.owner_id)
            .ok_or(WalletError::WalletNotFound { owner_id: posting.owner_id })?;

        let applied = match (posting.kind.direction(), posting.rule) {
            (Direction::Credit, _) => posting.amount,
            (Direction::Debit, DebitRule::Strict) => {
                if before < posting.amount.value() {
                    return Err(WalletError::InsufficientBalance {
                        required: posting.amount.value(),
                        available: before,
                    });
                }
                posting.amount
            }
            (Direction::Debit, DebitRule::Partial) => {
                let deducted = before.min(posting.amount.value());
                match Amount::new(deducted) {
                    Ok(amount) => amount,
                    // 잔고 0: 차감할 것이 없으므로 엔트리 없음
                    Err(_) => continue,
                }
            }
        };

        // 잔고도 금액 상한을 넘을 수 없음 (저장 전에 실패)
        let after = match posting.kind.direction() {
            Direction::Credit => before.checked_add(applied.value()),
            Direction::Debit => before.checked_sub(applied.value()),
        }
        .filter(|after| *after <= max_money())
        .ok_or_else(|| WalletError::InvalidAmount {
            reason: format!("balance of owner {} would exceed {}", posting.owner_id, max_money()),
        })?;
        balances.insert(posting.owner_id, after);

        planned.push(PlannedEntry {
            owner_id: posting.owner_id,
            kind: posting.kind,
            amount: applied,
            balance_before: before,
            balance_after: after,
            description: posting.description.clone(),
            reference: posting.reference.clone(),
        });
    }

    Ok(planned)
}

/// 요청이 아직 pending인지 확인
/// Guard for the single pending -> terminal transition
pub fn ensure_pending(request: &WalletRequest) -> Result<(), WalletError> {
    if request.is_pending() {
        Ok(())
    } else {
        Err(WalletError::AlreadyDecided {
            id: request.id,
            status: request.status,
        })
    }
}

// =====================================================
// LedgerStore Trait (저장소 인터페이스)
// =====================================================

/// 원장 저장소 인터페이스
/// Ledger Store interface
///
/// # 구현체
/// - `PgLedgerStore`: PostgreSQL, 행 잠금 + 트랜잭션
/// - `MemoryLedgerStore`: 메모리, 계정별 Mutex
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// 지갑 조회, 없으면 잔고 0으로 생성 (멱등)
    /// Get the owner's wallet, creating it with a zero balance if absent
    async fn get_or_create_wallet(&self, owner_id: u64) -> Result<Wallet, WalletError>;

    /// 지갑 조회 (생성하지 않음)
    /// Look up a wallet without creating it
    async fn find_wallet(&self, owner_id: u64) -> Result<Option<Wallet>, WalletError>;

    /// 원자 단위 적용
    /// Apply one atomic unit: postings plus optional request decision
    ///
    /// # Returns
    /// * `Ok(CommitOutcome)` - 모든 변경이 반영됨
    /// * `Err` - 아무것도 반영되지 않음
    async fn commit(&self, command: LedgerCommand) -> Result<CommitOutcome, WalletError>;

    /// 원장 엔트리 조회 (최신순) + 전체 개수
    /// Ledger entries for an owner, newest first, with the filtered total
    async fn list_transactions(
        &self,
        owner_id: u64,
        query: &TransactionQuery,
    ) -> Result<(Vec<TransactionEntry>, i64), WalletError>;

    /// 입출금 요청 저장 (pending)
    /// Persist a new pending request
    async fn insert_request(&self, request: NewWalletRequest) -> Result<WalletRequest, WalletError>;

    /// 요청 조회
    async fn find_request(&self, request_id: i64) -> Result<Option<WalletRequest>, WalletError>;

    /// 요청 목록 (최신순) + 전체 개수
    /// Requests matching `filter`, newest first, with the filtered total
    async fn list_requests(
        &self,
        filter: &RequestFilter,
        page: Option<PageRequest>,
    ) -> Result<(Vec<WalletRequest>, i64), WalletError>;
}
