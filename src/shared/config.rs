use std::env;
use std::time::Duration;

use anyhow::{Context, Result, bail};

// =====================================================
// 애플리케이션 설정 (환경 변수)
// =====================================================
// DATABASE_URL           PostgreSQL 연결 문자열 (LEDGER_BACKEND=postgres일 때 필수)
// BIND_ADDR              기본 0.0.0.0:3002
// JWT_SECRET             토큰 검증 키 (HS256)
// CORS_ORIGIN            기본 http://localhost:3003
// LEDGER_BACKEND         postgres | memory (기본 postgres)
// LEDGER_LOCK_TIMEOUT_MS 원자 단위 잠금 대기 상한 (기본 5000)
// DB_MAX_CONNECTIONS     기본 10
// NOTIFY_WEBHOOK_URL     설정 시 결정 이벤트를 웹훅으로 전송
// =====================================================

const DEFAULT_JWT_SECRET: &str = "your-secret-key-change-in-production";

/// 원장 저장소 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerBackend {
    Postgres,
    Memory,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub bind_addr: String,
    pub jwt_secret: String,
    pub cors_origin: String,
    pub ledger_backend: LedgerBackend,
    pub lock_timeout: Duration,
    pub db_max_connections: u32,
    pub notify_webhook_url: Option<String>,
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let ledger_backend = match optional("LEDGER_BACKEND").as_deref() {
            None | Some("postgres") => LedgerBackend::Postgres,
            Some("memory") => LedgerBackend::Memory,
            Some(other) => bail!("LEDGER_BACKEND must be 'postgres' or 'memory', got '{}'", other),
        };

        let database_url = optional("DATABASE_URL");
        if ledger_backend == LedgerBackend::Postgres && database_url.is_none() {
            bail!("DATABASE_URL is required when LEDGER_BACKEND=postgres");
        }

        let lock_timeout_ms: u64 = optional("LEDGER_LOCK_TIMEOUT_MS")
            .unwrap_or_else(|| "5000".into())
            .parse()
            .context("LEDGER_LOCK_TIMEOUT_MS must be a number of milliseconds")?;

        let jwt_secret = optional("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set, using development default");
            DEFAULT_JWT_SECRET.to_string()
        });

        Ok(Self {
            database_url,
            bind_addr: optional("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3002".into()),
            jwt_secret,
            cors_origin: optional("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:3003".into()),
            ledger_backend,
            lock_timeout: Duration::from_millis(lock_timeout_ms.max(1)),
            db_max_connections: optional("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|| "10".into())
                .parse()
                .context("DB_MAX_CONNECTIONS must be a positive integer")?,
            notify_webhook_url: optional("NOTIFY_WEBHOOK_URL"),
        })
    }
}
