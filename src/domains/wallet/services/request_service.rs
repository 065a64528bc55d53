use std::sync::Arc;

use crate::domains::wallet::models::{
    Amount, EntryKind, NewWalletRequest, PageRequest, Reference, RequestDecisionResponse,
    RequestFilter, RequestStatus, RequestType, WalletRequest, WalletRequestPage,
};
use crate::domains::wallet::services::{LedgerService, Notifier, WalletEvent};
use crate::domains::wallet::store::{LedgerCommand, Posting, RequestDecision};
use crate::shared::errors::WalletError;

/// 입출금 요청 서비스
/// Wallet Request Workflow
///
/// 상태 전이:
/// - pending -> approved: 원장 변경 + 요청 상태 변경을 한 원자 단위로 처리
/// - pending -> rejected: 원장 변경 없음
/// - 종료 상태에서 다시 결정하면 AlreadyDecided (요청당 원장 변경은 최대 1회)
#[derive(Clone)]
pub struct WalletRequestService {
    ledger: LedgerService,
    notifier: Arc<dyn Notifier>,
}

fn required(value: &str, missing: WalletError) -> Result<String, WalletError> {
    let value = value.trim();
    if value.is_empty() {
        Err(missing)
    } else {
        Ok(value.to_string())
    }
}

impl WalletRequestService {
    pub fn new(ledger: LedgerService, notifier: Arc<dyn Notifier>) -> Self {
        Self { ledger, notifier }
    }

    /// 입금 요청 생성
    /// Create a pending deposit request; evidence is required up front
    pub async fn create_deposit_request(
        &self,
        owner_id: u64,
        amount: Amount,
        evidence_image: &str,
    ) -> Result<WalletRequest, WalletError> {
        let evidence_image = required(evidence_image, WalletError::MissingEvidence)?;

        let request = self
            .ledger
            .store()
            .insert_request(NewWalletRequest {
                owner_id,
                request_type: RequestType::Deposit,
                amount,
                evidence_image: Some(evidence_image),
                wallet_destination: None,
            })
            .await?;

        tracing::info!(request_id = request.id, owner_id, amount = %amount, "deposit request created");
        Ok(request)
    }

    /// 출금 요청 생성
    /// Create a pending withdrawal request
    ///
    /// 잔고 확인은 참고용 (승인 시 잠금 안에서 다시 확인)
    pub async fn create_withdrawal_request(
        &self,
        owner_id: u64,
        amount: Amount,
        destination: &str,
    ) -> Result<WalletRequest, WalletError> {
        let destination = required(destination, WalletError::MissingDestination)?;

        let available = self.ledger.get_balance(owner_id).await?;
        if available < amount.value() {
            return Err(WalletError::InsufficientBalance {
                required: amount.value(),
                available,
            });
        }

        let request = self
            .ledger
            .store()
            .insert_request(NewWalletRequest {
                owner_id,
                request_type: RequestType::Withdrawal,
                amount,
                evidence_image: None,
                wallet_destination: Some(destination),
            })
            .await?;

        tracing::info!(request_id = request.id, owner_id, amount = %amount, "withdrawal request created");
        Ok(request)
    }

    /// 입금 승인
    /// Approve a deposit: credit the owner and mark the request approved together
    pub async fn approve_deposit(
        &self,
        request_id: i64,
        admin_id: u64,
    ) -> Result<RequestDecisionResponse, WalletError> {
        let request = self.pending_of_type(request_id, RequestType::Deposit).await?;

        let command = LedgerCommand::postings(vec![Posting::new(
            request.owner_id,
            EntryKind::Deposit,
            request.amount,
            format!("Deposit request #{}", request.id),
            Reference::WalletRequest(request.id),
        )])
        .with_decision(RequestDecision {
            request_id,
            status: RequestStatus::Approved,
            admin_id,
            evidence_image: None,
            rejection_reason: None,
        });

        self.decide(command).await
    }

    /// 출금 승인
    /// Approve a withdrawal with proof-of-payout; balance is re-checked under lock
    pub async fn approve_withdrawal(
        &self,
        request_id: i64,
        admin_id: u64,
        evidence_image: &str,
    ) -> Result<RequestDecisionResponse, WalletError> {
        let request = self.pending_of_type(request_id, RequestType::Withdrawal).await?;
        let evidence_image = required(evidence_image, WalletError::MissingEvidence)?;

        let command = LedgerCommand::postings(vec![Posting::new(
            request.owner_id,
            EntryKind::Withdrawal,
            request.amount,
            format!("Withdrawal request #{}", request.id),
            Reference::WalletRequest(request.id),
        )])
        .with_decision(RequestDecision {
            request_id,
            status: RequestStatus::Approved,
            admin_id,
            evidence_image: Some(evidence_image),
            rejection_reason: None,
        });

        self.decide(command).await
    }

    /// 요청 거절 (원장 변경 없음)
    /// Reject a pending request with a reason
    pub async fn reject(
        &self,
        request_id: i64,
        admin_id: u64,
        reason: &str,
    ) -> Result<RequestDecisionResponse, WalletError> {
        let request = self.get_by_id(request_id).await?;
        if !request.is_pending() {
            return Err(WalletError::AlreadyDecided { id: request.id, status: request.status });
        }
        let reason = required(reason, WalletError::MissingReason)?;

        let command = LedgerCommand::default().with_decision(RequestDecision {
            request_id,
            status: RequestStatus::Rejected,
            admin_id,
            evidence_image: None,
            rejection_reason: Some(reason),
        });

        self.decide(command).await
    }

    /// 사용자 본인 요청 목록 (최신순)
    pub async fn list_for_owner(
        &self,
        owner_id: u64,
        request_type: Option<RequestType>,
        status: Option<RequestStatus>,
    ) -> Result<Vec<WalletRequest>, WalletError> {
        let filter = RequestFilter {
            owner_id: Some(owner_id),
            request_type,
            status,
        };
        let (items, _) = self.ledger.store().list_requests(&filter, None).await?;
        Ok(items)
    }

    /// 전체 요청 목록 (관리자)
    /// Admin listing, 1-based pages, newest first
    pub async fn list_all(
        &self,
        filter: RequestFilter,
        page: PageRequest,
    ) -> Result<WalletRequestPage, WalletError> {
        let (items, total) = self.ledger.store().list_requests(&filter, Some(page)).await?;
        Ok(WalletRequestPage {
            items,
            total,
            page: page.page,
            limit: page.limit,
        })
    }

    pub async fn get_by_id(&self, request_id: i64) -> Result<WalletRequest, WalletError> {
        self.ledger
            .store()
            .find_request(request_id)
            .await?
            .ok_or(WalletError::RequestNotFound { id: request_id })
    }

    /// 본인 요청만 조회 (다른 사용자 요청은 존재 여부도 노출하지 않음)
    pub async fn get_for_owner(&self, owner_id: u64, request_id: i64) -> Result<WalletRequest, WalletError> {
        match self.get_by_id(request_id).await? {
            request if request.owner_id == owner_id => Ok(request),
            _ => Err(WalletError::RequestNotFound { id: request_id }),
        }
    }

    async fn pending_of_type(
        &self,
        request_id: i64,
        expected: RequestType,
    ) -> Result<WalletRequest, WalletError> {
        let request = self.get_by_id(request_id).await?;
        if !request.is_pending() {
            return Err(WalletError::AlreadyDecided { id: request.id, status: request.status });
        }
        if request.request_type != expected {
            return Err(WalletError::RequestTypeMismatch {
                id: request.id,
                expected,
                actual: request.request_type,
            });
        }
        Ok(request)
    }

    async fn decide(&self, command: LedgerCommand) -> Result<RequestDecisionResponse, WalletError> {
        let outcome = self.ledger.commit(command).await?;

        let request = outcome
            .request
            .ok_or_else(|| WalletError::Internal("decision commit returned no request".to_string()))?;

        tracing::info!(
            request_id = request.id,
            owner_id = request.owner_id,
            status = %request.status,
            admin_id = ?request.decided_by_admin_id,
            "wallet request decided"
        );
        self.notifier.dispatch(WalletEvent::request_decided(&request));

        Ok(RequestDecisionResponse {
            request,
            transaction: outcome.entries.into_iter().next(),
        })
    }
}
