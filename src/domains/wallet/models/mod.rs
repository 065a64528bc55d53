// Wallet domain models
pub mod amount;
pub mod wallet;
pub mod transaction;
pub mod request;

pub use amount::*;
pub use wallet::*;
pub use transaction::*;
pub use request::*;
