/// 공유 유틸리티 모듈
/// Shared Utilities Module
///
/// 역할:
/// - 공통 응답 봉투 (status / message / data)
pub mod response;

pub use response::*;
