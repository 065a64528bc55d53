// Wallet domain routes
// 지갑 도메인 라우터
use axum::{
    Router,
    routing::{get, post, put},
};

use crate::domains::wallet::handlers::{admin_handler, request_handler, wallet_handler};
use crate::shared::services::AppState;

/// Create wallet router (/api/wallet)
/// 사용자 지갑 라우터 생성 (모두 인증 필요)
pub fn create_wallet_router() -> Router<AppState> {
    Router::new()
        .route("/", get(wallet_handler::get_wallet))
        .route("/transactions", get(wallet_handler::get_transactions))
        .route("/requests", get(request_handler::list_my_requests))
        .route("/requests/deposit", post(request_handler::create_deposit_request))
        .route("/requests/withdrawal", post(request_handler::create_withdrawal_request))
        .route("/requests/:id", get(request_handler::get_my_request))
}

/// Create admin router (/api/admin)
/// 관리자 라우터 생성 (role = admin)
pub fn create_admin_router() -> Router<AppState> {
    Router::new()
        .route("/wallet/requests", get(admin_handler::list_requests))
        .route("/wallets/:owner_id", get(admin_handler::get_owner_wallet))
        .route("/wallet/requests/:id/approve-deposit", put(admin_handler::approve_deposit))
        .route("/wallet/requests/:id/approve-withdrawal", put(admin_handler::approve_withdrawal))
        .route("/wallet/requests/:id/reject", put(admin_handler::reject_request))
}
