use std::sync::Arc;

use anyhow::{Context, Result};

use crate::domains::auth::services::{AuthState, JwtService};
use crate::domains::wallet::services::{LogNotifier, Notifier, WalletState, WebhookNotifier};
use crate::domains::wallet::store::{LedgerStore, MemoryLedgerStore, PgLedgerStore};
use crate::shared::config::{AppConfig, LedgerBackend};
use crate::shared::database::Database;

/// Application state (combines all domain states)
/// 애플리케이션 상태 (모든 도메인 상태를 조합)
#[derive(Clone)]
pub struct AppState {
    pub auth_state: AuthState,
    pub wallet_state: WalletState,
}

impl AppState {
    /// 구성 요소를 직접 주입 (테스트에서 메모리 저장소 사용)
    /// Compose from an explicit store and notifier
    pub fn new(
        store: Arc<dyn LedgerStore>,
        jwt_service: JwtService,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            auth_state: AuthState::new(jwt_service),
            wallet_state: WalletState::new(store, notifier),
        }
    }

    /// 설정으로부터 생성 (DB 연결 + 마이그레이션 포함)
    /// Build from configuration: connects and migrates when backed by PostgreSQL
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let store: Arc<dyn LedgerStore> = match config.ledger_backend {
            LedgerBackend::Postgres => {
                let url = config
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL is required for the postgres ledger")?;
                let db = Database::new(url, config.db_max_connections, config.lock_timeout).await?;
                db.initialize().await?;
                tracing::info!("ledger backend: postgres");
                Arc::new(PgLedgerStore::new(db, config.lock_timeout))
            }
            LedgerBackend::Memory => {
                tracing::warn!("ledger backend: memory (balances are lost on restart)");
                Arc::new(MemoryLedgerStore::with_lock_timeout(config.lock_timeout))
            }
        };

        let notifier: Arc<dyn Notifier> = match &config.notify_webhook_url {
            Some(url) => Arc::new(WebhookNotifier::new(url.clone())),
            None => Arc::new(LogNotifier),
        };

        Ok(Self::new(
            store,
            JwtService::new(&config.jwt_secret),
            notifier,
        ))
    }
}
