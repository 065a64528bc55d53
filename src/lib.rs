// Wallet ledger service library
// 지갑 원장 + 입출금 요청 승인 워크플로우
pub mod domains;
pub mod routes;
pub mod shared;
