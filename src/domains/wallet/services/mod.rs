// Wallet services module
// 지갑 서비스 모듈

pub mod ledger_service;
pub mod notifier;
pub mod request_service;
pub mod state;

pub use ledger_service::*;
pub use notifier::*;
pub use request_service::*;
pub use state::*;
