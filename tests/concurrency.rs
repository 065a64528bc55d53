// =====================================================
// 동시성 통합 테스트
// =====================================================
// 같은 계정에 대한 동시 변경이 직렬화되는지,
// 요청 결정이 최대 한 번만 적용되는지 확인합니다.
// =====================================================

mod common;
use common::*;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::join_all;

use wallet_ledger::domains::wallet::models::{
    EntryKind, NewWalletRequest, PageRequest, Reference, RequestFilter, TransactionEntry,
    TransactionQuery, Wallet, WalletRequest,
};
use wallet_ledger::domains::wallet::services::LedgerService;
use wallet_ledger::domains::wallet::store::{
    CommitOutcome, LedgerCommand, LedgerStore, MemoryLedgerStore,
};
use wallet_ledger::shared::errors::WalletError;

/// 테스트: 동시 credit 100건 -> 잔고 100.00, 엔트리 체인 일관성
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_credits_serialize_per_account() {
    let ctx = setup_test();

    let tasks = (0..100).map(|i| {
        let ledger = ctx.ledger.clone();
        tokio::spawn(async move {
            ledger
                .credit(TEST_USER_ID, amount("1.00"), EntryKind::Deposit, format!("credit {}", i), Reference::None)
                .await
        })
    });
    for result in join_all(tasks).await {
        result.unwrap().unwrap();
    }

    assert_eq!(ctx.ledger.get_balance(TEST_USER_ID).await.unwrap(), dec("100.00"));
    let page = ctx
        .ledger
        .list_transactions(TEST_USER_ID, TransactionQuery::default())
        .await
        .unwrap();
    assert_eq!(page.total, 100);
    assert_ledger_consistent(ctx.store.as_ref(), TEST_USER_ID).await;
}

/// 테스트: 잔고보다 많은 동시 debit -> 정확히 잔고만큼만 성공 (이중 지출 없음)
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_debits_never_overdraw() {
    let ctx = setup_test();
    ctx.ledger
        .credit(TEST_USER_ID, amount("10.00"), EntryKind::Deposit, "seed", Reference::None)
        .await
        .unwrap();

    let tasks = (0..25).map(|_| {
        let ledger = ctx.ledger.clone();
        tokio::spawn(async move {
            ledger
                .debit(TEST_USER_ID, amount("1.00"), EntryKind::Payment, "checkout", Reference::None)
                .await
        })
    });

    let mut succeeded = 0;
    let mut insufficient = 0;
    for result in join_all(tasks).await {
        match result.unwrap() {
            Ok(_) => succeeded += 1,
            Err(WalletError::InsufficientBalance { .. }) => insufficient += 1,
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    assert_eq!(succeeded, 10);
    assert_eq!(insufficient, 15);
    assert_eq!(ctx.ledger.get_balance(TEST_USER_ID).await.unwrap(), dec("0"));
    assert_ledger_consistent(ctx.store.as_ref(), TEST_USER_ID).await;
}

/// 테스트: 새 사용자에 대한 동시 get_or_create -> 지갑 1개
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_wallet_creation() {
    let ctx = setup_test();

    let tasks = (0..20).map(|_| {
        let ledger = ctx.ledger.clone();
        tokio::spawn(async move { ledger.get_or_create_wallet(555).await })
    });
    let wallets: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|r| r.unwrap().unwrap())
        .collect();

    assert!(wallets.iter().all(|w| w.id == wallets[0].id));
    assert!(wallets.iter().all(|w| w.balance == dec("0")));
}

/// 테스트: 같은 요청을 동시에 승인 -> 정확히 1건 성공, 잔고 1회 증가
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_approvals_apply_once() {
    let ctx = setup_test();
    let request = ctx
        .requests
        .create_deposit_request(TEST_USER_ID, amount("75.00"), "ev.png")
        .await
        .unwrap();

    let tasks = (0..10).map(|i| {
        let requests = ctx.requests.clone();
        let request_id = request.id;
        tokio::spawn(async move { requests.approve_deposit(request_id, ADMIN_ID + i).await })
    });

    let mut approved = 0;
    let mut already_decided = 0;
    for result in join_all(tasks).await {
        match result.unwrap() {
            Ok(_) => approved += 1,
            Err(WalletError::AlreadyDecided { .. }) => already_decided += 1,
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    assert_eq!(approved, 1);
    assert_eq!(already_decided, 9);
    assert_eq!(ctx.ledger.get_balance(TEST_USER_ID).await.unwrap(), dec("75.00"));
    assert_eq!(ctx.notifier.events().len(), 1);
    assert_ledger_consistent(ctx.store.as_ref(), TEST_USER_ID).await;
}

/// 테스트: 반대 방향 송금 동시 실행 -> 교착 없음, 총액 보존
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_opposing_transfers_do_not_deadlock() {
    let ctx = setup_test();
    for owner in [TEST_USER_ID, OTHER_USER_ID] {
        ctx.ledger
            .credit(owner, amount("100.00"), EntryKind::Deposit, "seed", Reference::None)
            .await
            .unwrap();
    }

    let tasks = (0..200).map(|i| {
        let ledger = ctx.ledger.clone();
        let (from, to) = if i % 2 == 0 {
            (TEST_USER_ID, OTHER_USER_ID)
        } else {
            (OTHER_USER_ID, TEST_USER_ID)
        };
        tokio::spawn(async move { ledger.transfer(from, to, amount("3.00"), "ping-pong").await })
    });

    let results = tokio::time::timeout(Duration::from_secs(10), join_all(tasks))
        .await
        .expect("transfers deadlocked");
    for result in results {
        match result.unwrap() {
            Ok(_) | Err(WalletError::InsufficientBalance { .. }) => {}
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    let a = ctx.ledger.get_balance(TEST_USER_ID).await.unwrap();
    let b = ctx.ledger.get_balance(OTHER_USER_ID).await.unwrap();
    assert_eq!(a + b, dec("200.00"));
    assert_ledger_consistent(ctx.store.as_ref(), TEST_USER_ID).await;
    assert_ledger_consistent(ctx.store.as_ref(), OTHER_USER_ID).await;
}

/// 커밋 전에 지연되는 저장소 (잠금 대기 재현)
struct SlowStore {
    inner: MemoryLedgerStore,
    delay: Duration,
}

#[async_trait]
impl LedgerStore for SlowStore {
    async fn get_or_create_wallet(&self, owner_id: u64) -> Result<Wallet, WalletError> {
        self.inner.get_or_create_wallet(owner_id).await
    }

    async fn find_wallet(&self, owner_id: u64) -> Result<Option<Wallet>, WalletError> {
        self.inner.find_wallet(owner_id).await
    }

    async fn commit(&self, command: LedgerCommand) -> Result<CommitOutcome, WalletError> {
        tokio::time::sleep(self.delay).await;
        self.inner.commit(command).await
    }

    async fn list_transactions(
        &self,
        owner_id: u64,
        query: &TransactionQuery,
    ) -> Result<(Vec<TransactionEntry>, i64), WalletError> {
        self.inner.list_transactions(owner_id, query).await
    }

    async fn insert_request(&self, request: NewWalletRequest) -> Result<WalletRequest, WalletError> {
        self.inner.insert_request(request).await
    }

    async fn find_request(&self, request_id: i64) -> Result<Option<WalletRequest>, WalletError> {
        self.inner.find_request(request_id).await
    }

    async fn list_requests(
        &self,
        filter: &RequestFilter,
        page: Option<PageRequest>,
    ) -> Result<(Vec<WalletRequest>, i64), WalletError> {
        self.inner.list_requests(filter, page).await
    }
}

/// 테스트: 느린 commit도 호출자 쪽에서 끊지 않음 (반영된 변경을 LedgerBusy로 보고하지 않음)
#[tokio::test]
async fn test_slow_commit_is_not_abandoned() {
    let store = Arc::new(SlowStore {
        inner: MemoryLedgerStore::with_lock_timeout(Duration::from_millis(50)),
        delay: Duration::from_millis(300),
    });
    let ledger = LedgerService::new(store.clone());

    let wallet = ledger
        .credit(TEST_USER_ID, amount("5.00"), EntryKind::Deposit, "slow", Reference::None)
        .await
        .unwrap();
    assert_eq!(wallet.balance, dec("5.00"));

    let (entries, total) = store
        .list_transactions(TEST_USER_ID, &TransactionQuery::default())
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(entries[0].balance_after, dec("5.00"));
}

/// 테스트: 짧은 잠금 대기 상한에서도 경합 중인 credit은 LedgerBusy 또는 성공, 잔고는 성공 건수와 일치
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_busy_credits_leave_no_trace() {
    let store = Arc::new(SlowStore {
        inner: MemoryLedgerStore::with_lock_timeout(Duration::from_millis(1)),
        delay: Duration::ZERO,
    });
    let ledger = LedgerService::new(store.clone());

    let handles: Vec<_> = (0..200)
        .map(|_| {
            let ledger = ledger.clone();
            tokio::spawn(async move {
                ledger
                    .credit(TEST_USER_ID, amount("1.00"), EntryKind::Deposit, "busy", Reference::None)
                    .await
            })
        })
        .collect();

    let mut committed = 0i64;
    for result in join_all(handles).await {
        match result.unwrap() {
            Ok(_) => committed += 1,
            Err(WalletError::LedgerBusy) => {}
            Err(e) => panic!("unexpected credit failure: {}", e),
        }
    }

    let (_, total) = store
        .list_transactions(TEST_USER_ID, &TransactionQuery::default())
        .await
        .unwrap();
    assert_eq!(total, committed);
    let balance = store.find_wallet(TEST_USER_ID).await.unwrap().map(|w| w.balance);
    assert_eq!(balance.unwrap_or_default(), rust_decimal::Decimal::from(committed));
    assert_ledger_consistent(store.as_ref(), TEST_USER_ID).await;
}
