use std::sync::Arc;

use rust_decimal::Decimal;

use crate::domains::wallet::models::{
    Amount, Direction, EntryKind, PartialDebit, Reference, TransactionPage, TransactionQuery,
    TransferOutcome, Wallet,
};
use crate::domains::wallet::store::{CommitOutcome, LedgerCommand, LedgerStore, Posting};
use crate::shared::errors::WalletError;

/// 지갑 원장 서비스
/// Wallet Ledger Service
///
/// 역할:
/// - 잔고를 변경하는 유일한 진입점 (credit / debit / debit_partial / transfer)
/// - 모든 변경은 LedgerStore::commit 한 번 = 원자 단위 한 번
///
/// 주의:
/// - 잔고 검증은 저장소가 잠금을 잡은 뒤 수행 (여기서 미리 읽은 잔고로 판단하지 않음)
/// - 잠금 대기 상한은 저장소가 적용 (LedgerBusy는 아무것도 반영되지 않았을 때만 반환)
/// - 진행 중인 commit을 여기서 취소하지 않음 (COMMIT 전송 후 취소하면 결과를 알 수 없음)
#[derive(Clone)]
pub struct LedgerService {
    store: Arc<dyn LedgerStore>,
}

impl LedgerService {
    /// 생성자
    /// Constructor
    ///
    /// # Arguments
    /// * `store` - 원장 저장소 (PostgreSQL / 메모리)
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn LedgerStore> {
        &self.store
    }

    /// 지갑 조회 또는 생성 (멱등)
    /// Get or lazily create the owner's wallet
    pub async fn get_or_create_wallet(&self, owner_id: u64) -> Result<Wallet, WalletError> {
        self.store.get_or_create_wallet(owner_id).await
    }

    /// 지갑 조회 (없으면 WalletNotFound)
    /// Strict lookup used by the admin view
    pub async fn get_wallet(&self, owner_id: u64) -> Result<Wallet, WalletError> {
        self.store
            .find_wallet(owner_id)
            .await?
            .ok_or(WalletError::WalletNotFound { owner_id })
    }

    /// 현재 잔고
    /// Current balance; creates the wallet on first access
    pub async fn get_balance(&self, owner_id: u64) -> Result<Decimal, WalletError> {
        Ok(self.get_or_create_wallet(owner_id).await?.balance)
    }

    /// 입금성 변경 (deposit / refund / transfer_in)
    /// Increase the balance and append one credit entry
    pub async fn credit(
        &self,
        owner_id: u64,
        amount: Amount,
        kind: EntryKind,
        description: impl Into<String>,
        reference: Reference,
    ) -> Result<Wallet, WalletError> {
        Self::expect_direction(kind, Direction::Credit)?;

        let posting = Posting::new(owner_id, kind, amount, description, reference);
        let outcome = self.commit(LedgerCommand::postings(vec![posting])).await?;
        Self::wallet_of(&outcome, owner_id)
    }

    /// 출금성 변경 (withdrawal / payment / transfer_out)
    /// Decrease the balance; fails with InsufficientBalance and changes nothing
    pub async fn debit(
        &self,
        owner_id: u64,
        amount: Amount,
        kind: EntryKind,
        description: impl Into<String>,
        reference: Reference,
    ) -> Result<Wallet, WalletError> {
        Self::expect_direction(kind, Direction::Debit)?;

        let posting = Posting::new(owner_id, kind, amount, description, reference);
        let outcome = self.commit(LedgerCommand::postings(vec![posting])).await?;
        Self::wallet_of(&outcome, owner_id)
    }

    /// 가능한 만큼 차감 (결제 부분 충당)
    /// Best-effort payment debit of min(balance, amount)
    ///
    /// # Returns
    /// * `PartialDebit { deducted, remaining, wallet }` - deducted + remaining == amount
    pub async fn debit_partial(
        &self,
        owner_id: u64,
        amount: Amount,
        description: impl Into<String>,
        reference: Reference,
    ) -> Result<PartialDebit, WalletError> {
        let posting = Posting::new(owner_id, EntryKind::Payment, amount, description, reference).partial();
        let outcome = self.commit(LedgerCommand::postings(vec![posting])).await?;

        let deducted = outcome
            .entries
            .first()
            .map(|e| e.amount.value())
            .unwrap_or_else(crate::domains::wallet::models::amount::zero);

        Ok(PartialDebit {
            deducted,
            remaining: amount.value() - deducted,
            wallet: Self::wallet_of(&outcome, owner_id)?,
        })
    }

    /// 지갑 간 송금
    /// Move funds between two wallets in one atomic unit
    ///
    /// 보낸 사람 debit(transfer_out)이 먼저 검증되고, 실패하면 credit은 시도하지 않음
    pub async fn transfer(
        &self,
        from_owner_id: u64,
        to_owner_id: u64,
        amount: Amount,
        description: impl Into<String>,
    ) -> Result<TransferOutcome, WalletError> {
        if from_owner_id == to_owner_id {
            return Err(WalletError::SelfTransfer);
        }

        let description = description.into();
        let command = LedgerCommand::postings(vec![
            Posting::new(
                from_owner_id,
                EntryKind::TransferOut,
                amount,
                description.clone(),
                Reference::TransferPeer(to_owner_id),
            ),
            Posting::new(
                to_owner_id,
                EntryKind::TransferIn,
                amount,
                description,
                Reference::TransferPeer(from_owner_id),
            ),
        ]);

        let outcome = self.commit(command).await?;
        Ok(TransferOutcome {
            from: Self::wallet_of(&outcome, from_owner_id)?,
            to: Self::wallet_of(&outcome, to_owner_id)?,
        })
    }

    /// 주문 결제 (잔고 부족 시 실패)
    pub async fn pay_order(&self, owner_id: u64, amount: Amount, order_id: &str) -> Result<Wallet, WalletError> {
        self.debit(
            owner_id,
            amount,
            EntryKind::Payment,
            format!("Payment for order {}", order_id),
            Reference::Order(order_id.to_string()),
        )
        .await
    }

    /// 주문 환불
    pub async fn refund_order(&self, owner_id: u64, amount: Amount, order_id: &str) -> Result<Wallet, WalletError> {
        self.credit(
            owner_id,
            amount,
            EntryKind::Refund,
            format!("Refund for order {}", order_id),
            Reference::Order(order_id.to_string()),
        )
        .await
    }

    /// 원장 조회 (최신순)
    /// Newest-first page of the owner's ledger entries
    pub async fn list_transactions(
        &self,
        owner_id: u64,
        query: TransactionQuery,
    ) -> Result<TransactionPage, WalletError> {
        let (items, total) = self.store.list_transactions(owner_id, &query).await?;
        Ok(TransactionPage {
            items,
            total,
            limit: query.limit,
            offset: query.offset,
        })
    }

    /// 원자 단위 실행
    /// Run one atomic unit and log what it committed
    pub async fn commit(&self, command: LedgerCommand) -> Result<CommitOutcome, WalletError> {
        let summary: Vec<(u64, EntryKind, Decimal)> = command
            .postings
            .iter()
            .map(|p| (p.owner_id, p.kind, p.amount.value()))
            .collect();

        match self.store.commit(command).await {
            Ok(outcome) => {
                #[cfg(not(feature = "bench_mode"))]
                for entry in &outcome.entries {
                    tracing::info!(
                        owner_id = entry.owner_id,
                        kind = %entry.kind,
                        amount = %entry.amount,
                        balance_after = %entry.balance_after,
                        entry_id = entry.id,
                        "ledger entry committed"
                    );
                }
                Ok(outcome)
            }
            Err(e) => {
                tracing::warn!(error = %e, postings = ?summary, "ledger mutation rejected");
                Err(e)
            }
        }
    }

    fn expect_direction(kind: EntryKind, direction: Direction) -> Result<(), WalletError> {
        if kind.direction() == direction {
            Ok(())
        } else {
            Err(WalletError::InvalidEntryKind { kind })
        }
    }

    fn wallet_of(outcome: &CommitOutcome, owner_id: u64) -> Result<Wallet, WalletError> {
        outcome
            .wallet(owner_id)
            .cloned()
            .ok_or_else(|| WalletError::Internal(format!("commit returned no wallet for owner {}", owner_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::wallet::store::MemoryLedgerStore;

    fn service() -> LedgerService {
        LedgerService::new(Arc::new(MemoryLedgerStore::new()))
    }

    fn amount(raw: &str) -> Amount {
        Amount::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn wrong_direction_kind_is_rejected() {
        let ledger = service();
        let err = ledger
            .credit(1, amount("5"), EntryKind::Payment, "x", Reference::None)
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::InvalidEntryKind { kind: EntryKind::Payment }));

        let err = ledger
            .debit(1, amount("5"), EntryKind::Refund, "x", Reference::None)
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::InvalidEntryKind { kind: EntryKind::Refund }));
    }

    #[tokio::test]
    async fn self_transfer_is_rejected() {
        let ledger = service();
        let err = ledger.transfer(3, 3, amount("1"), "loop").await.unwrap_err();
        assert!(matches!(err, WalletError::SelfTransfer));
    }

    #[tokio::test]
    async fn order_payment_and_refund_reference_the_order() {
        let ledger = service();
        ledger
            .credit(8, amount("20"), EntryKind::Deposit, "seed", Reference::None)
            .await
            .unwrap();
        ledger.pay_order(8, amount("12.00"), "ORD-1").await.unwrap();
        let wallet = ledger.refund_order(8, amount("2.00"), "ORD-1").await.unwrap();
        assert_eq!(wallet.balance, "10.00".parse().unwrap());

        let page = ledger.list_transactions(8, TransactionQuery::default()).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items[0].kind, EntryKind::Refund);
        assert_eq!(page.items[0].reference, Reference::Order("ORD-1".into()));
    }
}
