// Shared module
pub mod config;
pub mod database;
pub mod errors;
pub mod logging;
pub mod middleware;
pub mod services;
pub mod utils;

pub use errors::*;
pub use middleware::*;
pub use services::*;
pub use utils::*;
