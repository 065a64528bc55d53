// =====================================================
// 원장 서비스 통합 테스트
// =====================================================

mod common;
use common::*;

use wallet_ledger::domains::wallet::models::{EntryKind, Reference, TransactionQuery};
use wallet_ledger::domains::wallet::store::LedgerStore;
use wallet_ledger::shared::errors::WalletError;

/// 테스트: 지갑은 처음 조회 시 잔고 0으로 생성되고, 다시 조회해도 같은 지갑
#[tokio::test]
async fn test_get_or_create_wallet_is_idempotent() {
    let ctx = setup_test();

    let first = ctx.ledger.get_or_create_wallet(TEST_USER_ID).await.unwrap();
    let second = ctx.ledger.get_or_create_wallet(TEST_USER_ID).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(first.balance, dec("0"));
    assert_eq!(ctx.ledger.get_balance(TEST_USER_ID).await.unwrap(), dec("0"));
}

/// 테스트: 관리자 조회는 지갑을 만들지 않음
#[tokio::test]
async fn test_get_wallet_does_not_create() {
    let ctx = setup_test();

    let err = ctx.ledger.get_wallet(77).await.unwrap_err();
    assert!(matches!(err, WalletError::WalletNotFound { owner_id: 77 }));
    assert!(ctx.store.find_wallet(77).await.unwrap().is_none());
}

/// 테스트: credit 1건 = 잔고 증가 + 엔트리 1건 (before/after 기록)
#[tokio::test]
async fn test_credit_records_entry() {
    let ctx = setup_test();

    let wallet = ctx
        .ledger
        .credit(TEST_USER_ID, amount("100.00"), EntryKind::Deposit, "top up", Reference::None)
        .await
        .unwrap();
    assert_eq!(wallet.balance, dec("100.00"));

    let page = ctx
        .ledger
        .list_transactions(TEST_USER_ID, TransactionQuery::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    let entry = &page.items[0];
    assert_eq!(entry.kind, EntryKind::Deposit);
    assert_eq!(entry.amount.value(), dec("100.00"));
    assert_eq!(entry.balance_before, dec("0"));
    assert_eq!(entry.balance_after, dec("100.00"));
}

/// 테스트: 잔고 부족 debit은 실패하고 아무것도 바뀌지 않음
#[tokio::test]
async fn test_debit_insufficient_changes_nothing() {
    let ctx = setup_test();
    ctx.ledger
        .credit(TEST_USER_ID, amount("30.00"), EntryKind::Deposit, "seed", Reference::None)
        .await
        .unwrap();

    let err = ctx
        .ledger
        .debit(TEST_USER_ID, amount("30.01"), EntryKind::Payment, "too much", Reference::None)
        .await
        .unwrap_err();
    match err {
        WalletError::InsufficientBalance { required, available } => {
            assert_eq!(required, dec("30.01"));
            assert_eq!(available, dec("30.00"));
        }
        other => panic!("expected InsufficientBalance, got {:?}", other),
    }

    assert_eq!(ctx.ledger.get_balance(TEST_USER_ID).await.unwrap(), dec("30.00"));
    let page = ctx
        .ledger
        .list_transactions(TEST_USER_ID, TransactionQuery::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
}

/// 테스트: 잔고 전액 debit은 허용 (balance >= amount)
#[tokio::test]
async fn test_debit_exact_balance() {
    let ctx = setup_test();
    ctx.ledger
        .credit(TEST_USER_ID, amount("12.34"), EntryKind::Deposit, "seed", Reference::None)
        .await
        .unwrap();

    let wallet = ctx
        .ledger
        .debit(TEST_USER_ID, amount("12.34"), EntryKind::Withdrawal, "all", Reference::None)
        .await
        .unwrap();
    assert_eq!(wallet.balance, dec("0"));
    assert_ledger_consistent(ctx.store.as_ref(), TEST_USER_ID).await;
}

/// 테스트: 부분 차감은 가능한 만큼만
#[tokio::test]
async fn test_debit_partial() {
    let ctx = setup_test();
    ctx.ledger
        .credit(TEST_USER_ID, amount("40.00"), EntryKind::Deposit, "seed", Reference::None)
        .await
        .unwrap();

    let result = ctx
        .ledger
        .debit_partial(TEST_USER_ID, amount("100.00"), "order checkout", Reference::Order("ORD-9".into()))
        .await
        .unwrap();
    assert_eq!(result.deducted, dec("40.00"));
    assert_eq!(result.remaining, dec("60.00"));
    assert_eq!(result.wallet.balance, dec("0"));

    // 잔고 0: 차감 0, 엔트리 없음
    let result = ctx
        .ledger
        .debit_partial(TEST_USER_ID, amount("5.00"), "again", Reference::None)
        .await
        .unwrap();
    assert_eq!(result.deducted, dec("0"));
    assert_eq!(result.remaining, dec("5.00"));

    let page = ctx
        .ledger
        .list_transactions(TEST_USER_ID, TransactionQuery::default())
        .await
        .unwrap();
    assert_eq!(page.total, 2);
    assert_ledger_consistent(ctx.store.as_ref(), TEST_USER_ID).await;
}

/// 테스트: 송금은 양쪽 엔트리 2건, 서로를 참조
#[tokio::test]
async fn test_transfer_moves_funds() {
    let ctx = setup_test();
    ctx.ledger
        .credit(TEST_USER_ID, amount("50.00"), EntryKind::Deposit, "seed", Reference::None)
        .await
        .unwrap();

    let outcome = ctx
        .ledger
        .transfer(TEST_USER_ID, OTHER_USER_ID, amount("20.00"), "split bill")
        .await
        .unwrap();
    assert_eq!(outcome.from.balance, dec("30.00"));
    assert_eq!(outcome.to.balance, dec("20.00"));

    let sent = ctx
        .ledger
        .list_transactions(TEST_USER_ID, TransactionQuery::new(Some(EntryKind::TransferOut), None, None))
        .await
        .unwrap();
    assert_eq!(sent.total, 1);
    assert_eq!(sent.items[0].reference, Reference::TransferPeer(OTHER_USER_ID));

    let received = ctx
        .ledger
        .list_transactions(OTHER_USER_ID, TransactionQuery::default())
        .await
        .unwrap();
    assert_eq!(received.items[0].kind, EntryKind::TransferIn);
    assert_eq!(received.items[0].reference, Reference::TransferPeer(TEST_USER_ID));
}

/// 테스트: 보낸 사람 잔고 부족 시 받는 사람에게 아무것도 기록되지 않음
#[tokio::test]
async fn test_transfer_insufficient_is_atomic() {
    let ctx = setup_test();
    ctx.ledger
        .credit(TEST_USER_ID, amount("10.00"), EntryKind::Deposit, "seed", Reference::None)
        .await
        .unwrap();

    let err = ctx
        .ledger
        .transfer(TEST_USER_ID, OTHER_USER_ID, amount("10.01"), "too much")
        .await
        .unwrap_err();
    assert!(matches!(err, WalletError::InsufficientBalance { .. }));

    assert_eq!(ctx.ledger.get_balance(TEST_USER_ID).await.unwrap(), dec("10.00"));
    assert_eq!(ctx.ledger.get_balance(OTHER_USER_ID).await.unwrap(), dec("0"));
    let received = ctx
        .ledger
        .list_transactions(OTHER_USER_ID, TransactionQuery::default())
        .await
        .unwrap();
    assert_eq!(received.total, 0);
}

/// 테스트: 원장 조회 최신순 + 페이지 + 종류 필터
#[tokio::test]
async fn test_list_transactions_paging() {
    let ctx = setup_test();
    for i in 1..=5 {
        ctx.ledger
            .credit(TEST_USER_ID, amount(&i.to_string()), EntryKind::Deposit, "seed", Reference::None)
            .await
            .unwrap();
    }
    ctx.ledger.pay_order(TEST_USER_ID, amount("1"), "ORD-1").await.unwrap();

    let page = ctx
        .ledger
        .list_transactions(TEST_USER_ID, TransactionQuery::new(None, Some(2), Some(1)))
        .await
        .unwrap();
    assert_eq!(page.total, 6);
    assert_eq!(page.items.len(), 2);
    // 최신순: [payment, 5, 4, 3, 2, 1] 에서 offset 1
    assert_eq!(page.items[0].amount.value(), dec("5"));
    assert_eq!(page.items[1].amount.value(), dec("4"));
    assert!(page.items[0].id > page.items[1].id);

    let deposits = ctx
        .ledger
        .list_transactions(TEST_USER_ID, TransactionQuery::new(Some(EntryKind::Deposit), None, None))
        .await
        .unwrap();
    assert_eq!(deposits.total, 5);
    assert!(deposits.items.iter().all(|e| e.kind == EntryKind::Deposit));

    assert_ledger_consistent(ctx.store.as_ref(), TEST_USER_ID).await;
}

/// 테스트: 최대 금액 credit은 허용, 잔고 상한을 넘는 credit은 InvalidAmount (패닉 없음, 변경 없음)
#[tokio::test]
async fn test_credit_past_balance_cap_is_rejected() {
    let ctx = setup_test();
    let max = amount("999999999999999999.99");

    let wallet = ctx
        .ledger
        .credit(TEST_USER_ID, max, EntryKind::Deposit, "max", Reference::None)
        .await
        .unwrap();
    assert_eq!(wallet.balance, max.value());

    for _ in 0..2 {
        let err = ctx
            .ledger
            .credit(TEST_USER_ID, max, EntryKind::Deposit, "again", Reference::None)
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::InvalidAmount { .. }), "{:?}", err);
    }
    let err = ctx
        .ledger
        .credit(TEST_USER_ID, amount("0.01"), EntryKind::Refund, "one cent", Reference::None)
        .await
        .unwrap_err();
    assert!(matches!(err, WalletError::InvalidAmount { .. }));

    assert_eq!(ctx.ledger.get_balance(TEST_USER_ID).await.unwrap(), max.value());
    let page = ctx
        .ledger
        .list_transactions(TEST_USER_ID, TransactionQuery::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_ledger_consistent(ctx.store.as_ref(), TEST_USER_ID).await;
}

/// 테스트: 받는 사람 잔고 상한 초과 송금 -> 보낸 사람도 변경 없음
#[tokio::test]
async fn test_transfer_in_past_balance_cap_is_atomic() {
    let ctx = setup_test();
    let max = amount("999999999999999999.99");

    ctx.ledger
        .credit(TEST_USER_ID, amount("50.00"), EntryKind::Deposit, "seed", Reference::None)
        .await
        .unwrap();
    ctx.ledger
        .credit(OTHER_USER_ID, max, EntryKind::Deposit, "full", Reference::None)
        .await
        .unwrap();

    let err = ctx
        .ledger
        .transfer(TEST_USER_ID, OTHER_USER_ID, amount("10.00"), "overflow")
        .await
        .unwrap_err();
    assert!(matches!(err, WalletError::InvalidAmount { .. }));

    assert_eq!(ctx.ledger.get_balance(TEST_USER_ID).await.unwrap(), dec("50.00"));
    assert_eq!(ctx.ledger.get_balance(OTHER_USER_ID).await.unwrap(), max.value());
    assert_ledger_consistent(ctx.store.as_ref(), TEST_USER_ID).await;
    assert_ledger_consistent(ctx.store.as_ref(), OTHER_USER_ID).await;
}
