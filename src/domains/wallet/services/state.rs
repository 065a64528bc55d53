// Wallet domain state
// 지갑 도메인 상태
use std::sync::Arc;

use crate::domains::wallet::services::{LedgerService, Notifier, WalletRequestService};
use crate::domains::wallet::store::LedgerStore;

/// Wallet domain state
/// 지갑 도메인에서 필요한 서비스들을 포함하는 상태
#[derive(Clone)]
pub struct WalletState {
    pub ledger_service: LedgerService,
    pub request_service: WalletRequestService,
}

impl WalletState {
    /// 원장 저장소 + 알림 발송기로 생성
    /// Both services share one ledger (and therefore one store)
    pub fn new(store: Arc<dyn LedgerStore>, notifier: Arc<dyn Notifier>) -> Self {
        let ledger_service = LedgerService::new(store);
        let request_service = WalletRequestService::new(ledger_service.clone(), notifier);

        Self {
            ledger_service,
            request_service,
        }
    }
}
