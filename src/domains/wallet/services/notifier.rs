use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domains::wallet::models::{RequestStatus, RequestType, WalletRequest, amount::money};

// =====================================================
// 알림 발송 (Notification dispatch)
// =====================================================
// 관리자 결정 이후 요청자에게 알림을 보냅니다.
// 원장 트랜잭션과는 분리되어 있으며, 발송 실패는 로그만 남깁니다.
// dispatch()는 호출자를 블로킹하지 않아야 합니다.
// =====================================================

/// 지갑 이벤트
/// Events published after a committed wallet decision
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WalletEvent {
    RequestDecided {
        request_id: i64,
        owner_id: u64,
        request_type: RequestType,
        status: RequestStatus,
        #[serde(with = "money")]
        amount: Decimal,
        rejection_reason: Option<String>,
        decided_at: Option<DateTime<Utc>>,
    },
}

impl WalletEvent {
    pub fn request_decided(request: &WalletRequest) -> Self {
        WalletEvent::RequestDecided {
            request_id: request.id,
            owner_id: request.owner_id,
            request_type: request.request_type,
            status: request.status,
            amount: request.amount.value(),
            rejection_reason: request.rejection_reason.clone(),
            decided_at: request.decided_at,
        }
    }
}

/// 알림 발송 인터페이스
/// Fire-and-forget notification sink
pub trait Notifier: Send + Sync {
    fn dispatch(&self, event: WalletEvent);
}

/// 로그로만 남기는 기본 구현
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn dispatch(&self, event: WalletEvent) {
        match &event {
            WalletEvent::RequestDecided { request_id, owner_id, request_type, status, .. } => {
                tracing::info!(
                    request_id,
                    owner_id,
                    request_type = %request_type,
                    status = %status,
                    "notification (log only)"
                );
            }
        }
    }
}

/// 웹훅 알림 (JSON POST)
/// Posts each event as JSON to a configured endpoint
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: Arc<str>,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: Arc::from(url.into()),
        }
    }
}

impl Notifier for WebhookNotifier {
    fn dispatch(&self, event: WalletEvent) {
        let client = self.client.clone();
        let url = self.url.clone();

        // 요청 처리 경로와 분리 (응답 지연 없음)
        tokio::spawn(async move {
            let result = client
                .post(url.as_ref())
                .json(&event)
                .send()
                .await
                .and_then(|response| response.error_for_status());

            if let Err(e) = result {
                tracing::warn!(error = %e, url = %url, "wallet notification failed");
            }
        });
    }
}
