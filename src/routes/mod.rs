// Routes module: 라우팅 설정
// 역할: 모든 도메인의 라우터를 조합
// Routes module: combines all domain routers

use axum::{Json, Router, routing::get};
use serde_json::{Value, json};

use crate::domains::wallet::routes::{create_admin_router, create_wallet_router};
use crate::shared::services::AppState;

/// Create main router (combines all domain routers)
/// 메인 라우터 생성 (모든 도메인 라우터 조합)
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/api/wallet", create_wallet_router())
        .nest("/api/admin", create_admin_router())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": 200, "message": "OK", "data": null }))
}
