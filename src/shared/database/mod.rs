pub mod connection;
pub mod repositories;

pub use connection::*;
pub use repositories::*;
