// Auth domain module
// 지갑 서비스에서는 토큰 검증만 담당 (발급/회원 관리는 인증 서비스 소관)
pub mod models;
pub mod services;

pub use models::*;
pub use services::*;
