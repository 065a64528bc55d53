// =====================================================
// MemoryLedgerStore - 메모리 원장 저장소
// =====================================================
// 역할: DB 없이 동작하는 LedgerStore 구현 (테스트, 벤치마크, 로컬 실행)
//
// 잠금 구조:
// - accounts: owner_id -> Arc<tokio::Mutex<Wallet>> (계정별 잠금)
// - 레지스트리 자체는 parking_lot::Mutex (짧게 잡고 바로 해제, await 중 보유 금지)
// - commit: owner_id 오름차순으로 계정 잠금 획득 후
//   requests / journal 잠금 안에서 검증 + 반영을 동기적으로 수행
// - 잠금 획득만 lock_timeout으로 제한 (반영 단계는 await가 없어 중간 취소 불가)
// =====================================================

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use super::{CommitOutcome, LedgerCommand, LedgerStore, ensure_pending, plan_postings};
use crate::domains::wallet::models::{
    NewWalletRequest, PageRequest, RequestFilter, RequestStatus, TransactionEntry,
    TransactionQuery, Wallet, WalletRequest, amount::zero,
};
use crate::shared::errors::WalletError;

type AccountSlot = Arc<AsyncMutex<Wallet>>;

/// 기본 잠금 대기 상한
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// 메모리 원장 저장소
/// In-process ledger store with per-account serialization
pub struct MemoryLedgerStore {
    accounts: Mutex<HashMap<u64, AccountSlot>>,
    /// 추가 전용 원장 (id 오름차순 = 적용 순서)
    journal: Mutex<Vec<TransactionEntry>>,
    requests: Mutex<BTreeMap<i64, WalletRequest>>,
    next_wallet_id: AtomicI64,
    next_entry_id: AtomicI64,
    next_request_id: AtomicI64,
    lock_timeout: Duration,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::with_lock_timeout(DEFAULT_LOCK_TIMEOUT)
    }

    /// 계정 잠금 대기 상한 지정 (초과 시 LedgerBusy)
    pub fn with_lock_timeout(lock_timeout: Duration) -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            journal: Mutex::new(Vec::new()),
            requests: Mutex::new(BTreeMap::new()),
            next_wallet_id: AtomicI64::new(1),
            next_entry_id: AtomicI64::new(1),
            next_request_id: AtomicI64::new(1),
            lock_timeout,
        }
    }

    /// 계정 슬롯 조회 또는 생성 (레지스트리 잠금 안에서 한 번만 생성)
    fn slot(&self, owner_id: u64) -> AccountSlot {
        let mut accounts = self.accounts.lock();
        accounts
            .entry(owner_id)
            .or_insert_with(|| {
                let now = Utc::now();
                Arc::new(AsyncMutex::new(Wallet {
                    id: self.next_wallet_id.fetch_add(1, Ordering::SeqCst),
                    owner_id,
                    balance: zero(),
                    created_at: now,
                    updated_at: now,
                }))
            })
            .clone()
    }

    fn existing_slot(&self, owner_id: u64) -> Option<AccountSlot> {
        self.accounts.lock().get(&owner_id).cloned()
    }

    async fn lock_slot(&self, slot: AccountSlot) -> Result<OwnedMutexGuard<Wallet>, WalletError> {
        tokio::time::timeout(self.lock_timeout, slot.lock_owned())
            .await
            .map_err(|_| WalletError::LedgerBusy)
    }

    /// 계정 잠금 획득 (owner_id 오름차순, 전체에 lock_timeout 하나 적용)
    /// 시간 초과 시 이미 잡은 잠금은 drop으로 해제됨
    async fn lock_accounts(&self, owners: Vec<u64>) -> Result<Vec<OwnedMutexGuard<Wallet>>, WalletError> {
        let acquire = async move {
            let mut guards = Vec::with_capacity(owners.len());
            for owner_id in owners {
                guards.push(self.slot(owner_id).lock_owned().await);
            }
            guards
        };

        tokio::time::timeout(self.lock_timeout, acquire)
            .await
            .map_err(|_| WalletError::LedgerBusy)
    }

    /// 잠금을 모두 잡은 상태에서 실행되는 원자 단위 본체
    fn apply_locked(
        &self,
        guards: &mut [OwnedMutexGuard<Wallet>],
        command: &LedgerCommand,
    ) -> Result<CommitOutcome, WalletError> {
        // 요청 잠금은 journal 잠금보다 먼저 획득 (항상 같은 순서)
        let mut requests = self.requests.lock();

        if let Some(decision) = &command.decision {
            let request = requests
                .get(&decision.request_id)
                .ok_or(WalletError::RequestNotFound { id: decision.request_id })?;
            ensure_pending(request)?;
        }

        let mut balances: HashMap<u64, _> =
            guards.iter().map(|w| (w.owner_id, w.balance)).collect();
        let planned = plan_postings(&mut balances, &command.postings)?;

        // 여기부터는 실패하지 않음
        let now = Utc::now();
        let mut journal = self.journal.lock();
        let mut entries = Vec::with_capacity(planned.len());
        for plan in planned {
            let entry = TransactionEntry {
                id: self.next_entry_id.fetch_add(1, Ordering::SeqCst),
                owner_id: plan.owner_id,
                kind: plan.kind,
                amount: plan.amount,
                balance_before: plan.balance_before,
                balance_after: plan.balance_after,
                description: plan.description,
                reference: plan.reference,
                created_at: now,
            };
            journal.push(entry.clone());
            entries.push(entry);
        }
        drop(journal);

        for guard in guards.iter_mut() {
            if let Some(balance) = balances.get(&guard.owner_id) {
                if *balance != guard.balance {
                    guard.balance = *balance;
                    guard.updated_at = now;
                }
            }
        }

        let request = match &command.decision {
            Some(decision) => {
                let request = requests
                    .get_mut(&decision.request_id)
                    .ok_or(WalletError::RequestNotFound { id: decision.request_id })?;
                request.status = decision.status;
                request.decided_by_admin_id = Some(decision.admin_id);
                request.decided_at = Some(now);
                if decision.evidence_image.is_some() {
                    request.evidence_image = decision.evidence_image.clone();
                }
                if decision.status == RequestStatus::Rejected {
                    request.rejection_reason = decision.rejection_reason.clone();
                }
                Some(request.clone())
            }
            None => None,
        };

        Ok(CommitOutcome {
            wallets: guards.iter().map(|w| (**w).clone()).collect(),
            entries,
            request,
        })
    }
}

impl Default for MemoryLedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn get_or_create_wallet(&self, owner_id: u64) -> Result<Wallet, WalletError> {
        let wallet = self.lock_slot(self.slot(owner_id)).await?;
        Ok((*wallet).clone())
    }

    async fn find_wallet(&self, owner_id: u64) -> Result<Option<Wallet>, WalletError> {
        match self.existing_slot(owner_id) {
            Some(slot) => {
                let wallet = self.lock_slot(slot).await?;
                Ok(Some((*wallet).clone()))
            }
            None => Ok(None),
        }
    }

    async fn commit(&self, command: LedgerCommand) -> Result<CommitOutcome, WalletError> {
        // owner_id 오름차순 잠금 (송금 양방향 동시 실행 시 교착 방지)
        let mut guards = self.lock_accounts(command.lock_order()).await?;

        self.apply_locked(&mut guards, &command)
    }

    async fn list_transactions(
        &self,
        owner_id: u64,
        query: &TransactionQuery,
    ) -> Result<(Vec<TransactionEntry>, i64), WalletError> {
        let journal = self.journal.lock();
        let matching: Vec<&TransactionEntry> = journal
            .iter()
            .rev()
            .filter(|e| e.owner_id == owner_id)
            .filter(|e| query.kind.is_none_or(|kind| e.kind == kind))
            .collect();

        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .cloned()
            .collect();
        Ok((items, total))
    }

    async fn insert_request(&self, request: NewWalletRequest) -> Result<WalletRequest, WalletError> {
        let request = WalletRequest {
            id: self.next_request_id.fetch_add(1, Ordering::SeqCst),
            owner_id: request.owner_id,
            request_type: request.request_type,
            amount: request.amount,
            status: RequestStatus::Pending,
            evidence_image: request.evidence_image,
            wallet_destination: request.wallet_destination,
            decided_by_admin_id: None,
            rejection_reason: None,
            created_at: Utc::now(),
            decided_at: None,
        };
        self.requests.lock().insert(request.id, request.clone());
        Ok(request)
    }

    async fn find_request(&self, request_id: i64) -> Result<Option<WalletRequest>, WalletError> {
        Ok(self.requests.lock().get(&request_id).cloned())
    }

    async fn list_requests(
        &self,
        filter: &RequestFilter,
        page: Option<PageRequest>,
    ) -> Result<(Vec<WalletRequest>, i64), WalletError> {
        let requests = self.requests.lock();
        let matching: Vec<&WalletRequest> =
            requests.values().rev().filter(|r| filter.matches(r)).collect();

        let total = matching.len() as i64;
        let items = match page {
            Some(page) => matching
                .into_iter()
                .skip(page.offset() as usize)
                .take(page.limit as usize)
                .cloned()
                .collect(),
            None => matching.into_iter().cloned().collect(),
        };
        Ok((items, total))
    }
}
