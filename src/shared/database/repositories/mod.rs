// All repositories module
pub mod wallet;

pub use wallet::*;
