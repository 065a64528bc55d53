// =====================================================
// PgLedgerStore - PostgreSQL 원장 저장소
// =====================================================
// 원자 단위 1개 = DB 트랜잭션 1개
//
// 처리 순서:
// 1. BEGIN + SET LOCAL lock_timeout / statement_timeout (대기 상한은 DB 안에서만 적용)
// 2. 요청 행 SELECT ... FOR UPDATE + pending 확인
// 3. 지갑 생성(ON CONFLICT DO NOTHING) + SELECT ... FOR UPDATE (owner_id 오름차순)
// 4. plan_postings로 검증
// 5. 엔트리 INSERT, 잔고 UPDATE, 요청 UPDATE
// 6. COMMIT (중간 실패 시 트랜잭션 drop = ROLLBACK)
//
// 호출자 쪽 timeout으로 이 future를 취소하지 않습니다.
// COMMIT 전송 후 취소되면 반영 여부를 알 수 없기 때문입니다.
// =====================================================

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use super::{CommitOutcome, LedgerCommand, LedgerStore, ensure_pending, plan_postings};
use crate::domains::wallet::models::{
    NewWalletRequest, PageRequest, RequestFilter, TransactionEntry, TransactionQuery, Wallet,
    WalletRequest,
};
use crate::shared::database::{
    Database, TransactionRepository, WalletRepository, WalletRequestRepository,
};
use crate::shared::errors::WalletError;

/// PostgreSQL 원장 저장소
/// Ledger store backed by PostgreSQL row locks
pub struct PgLedgerStore {
    db: Database,
    lock_timeout: Duration,
    wallets: WalletRepository,
    transactions: TransactionRepository,
    requests: WalletRequestRepository,
}

impl PgLedgerStore {
    pub fn new(db: Database, lock_timeout: Duration) -> Self {
        let pool = db.pool().clone();
        Self {
            db,
            lock_timeout,
            wallets: WalletRepository::new(pool.clone()),
            transactions: TransactionRepository::new(pool.clone()),
            requests: WalletRequestRepository::new(pool),
        }
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn get_or_create_wallet(&self, owner_id: u64) -> Result<Wallet, WalletError> {
        if let Some(wallet) = self.wallets.find_by_owner(owner_id).await? {
            return Ok(wallet);
        }

        let mut conn = self.db.pool().acquire().await?;
        WalletRepository::create_if_absent(&mut conn, owner_id).await?;

        self.wallets
            .find_by_owner(owner_id)
            .await?
            .ok_or(WalletError::WalletNotFound { owner_id })
    }

    async fn find_wallet(&self, owner_id: u64) -> Result<Option<Wallet>, WalletError> {
        self.wallets.find_by_owner(owner_id).await
    }

    async fn commit(&self, command: LedgerCommand) -> Result<CommitOutcome, WalletError> {
        let mut tx = self.db.pool().begin().await?;

        // 잠금 대기 초과 55P03, 문장 시간 초과 57014 -> LedgerBusy (ROLLBACK 후 반환)
        let timeout_ms = self.lock_timeout.as_millis().max(1);
        sqlx::query(&format!("SET LOCAL lock_timeout = '{}ms'", timeout_ms))
            .execute(&mut *tx)
            .await?;
        sqlx::query(&format!("SET LOCAL statement_timeout = '{}ms'", timeout_ms))
            .execute(&mut *tx)
            .await?;

        if let Some(decision) = &command.decision {
            let request = WalletRequestRepository::lock_by_id(&mut *tx, decision.request_id).await?;
            ensure_pending(&request)?;
        }

        let mut wallets = Vec::new();
        for owner_id in command.lock_order() {
            WalletRepository::create_if_absent(&mut *tx, owner_id).await?;
            wallets.push(WalletRepository::lock_by_owner(&mut *tx, owner_id).await?);
        }

        let mut balances: HashMap<u64, _> = wallets.iter().map(|w| (w.owner_id, w.balance)).collect();
        let planned = plan_postings(&mut balances, &command.postings)?;

        let now = Utc::now();
        let mut entries = Vec::with_capacity(planned.len());
        for plan in &planned {
            entries.push(TransactionRepository::insert(&mut *tx, plan, now).await?);
        }

        for wallet in wallets.iter_mut() {
            if let Some(balance) = balances.get(&wallet.owner_id) {
                if *balance != wallet.balance {
                    *wallet = WalletRepository::update_balance(&mut *tx, wallet.id, *balance, now).await?;
                }
            }
        }

        let request = match &command.decision {
            Some(decision) => {
                Some(WalletRequestRepository::apply_decision(&mut *tx, decision, now).await?)
            }
            None => None,
        };

        tx.commit().await?;

        Ok(CommitOutcome {
            wallets,
            entries,
            request,
        })
    }

    async fn list_transactions(
        &self,
        owner_id: u64,
        query: &TransactionQuery,
    ) -> Result<(Vec<TransactionEntry>, i64), WalletError> {
        self.transactions.list_by_owner(owner_id, query).await
    }

    async fn insert_request(&self, request: NewWalletRequest) -> Result<WalletRequest, WalletError> {
        self.requests.create(&request).await
    }

    async fn find_request(&self, request_id: i64) -> Result<Option<WalletRequest>, WalletError> {
        self.requests.find_by_id(request_id).await
    }

    async fn list_requests(
        &self,
        filter: &RequestFilter,
        page: Option<PageRequest>,
    ) -> Result<(Vec<WalletRequest>, i64), WalletError> {
        self.requests.list(filter, page).await
    }
}
