// Wallet repositories
pub mod transaction_repository;
pub mod wallet_repository;
pub mod wallet_request_repository;

pub use transaction_repository::*;
pub use wallet_repository::*;
pub use wallet_request_repository::*;
