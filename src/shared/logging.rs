use std::env;
use std::io::{IsTerminal, stdout};

use tracing_subscriber::EnvFilter;

/// 로깅 초기화
/// RUST_LOG (기본 info), 터미널이면 사람이 읽는 형식, 아니면 JSON
pub fn setup_logging() {
    let is_terminal = stdout().is_terminal();
    let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

    if is_terminal {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    }

    tracing::info!(level = %log_level, "logging initialized");
}
