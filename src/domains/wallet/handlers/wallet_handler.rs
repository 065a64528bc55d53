use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};

use crate::domains::wallet::handlers::{query_params, reject};
use crate::domains::wallet::models::{TransactionListParams, TransactionPage, WalletResponse};
use crate::shared::middleware::auth::AuthenticatedUser;
use crate::shared::services::AppState;
use crate::shared::utils::{ApiResponse, ApiResult};

/// 내 지갑 조회 핸들러 (없으면 잔고 0으로 생성)
/// Get the caller's wallet
#[utoipa::path(
    get,
    path = "/api/wallet",
    responses(
        (status = 200, description = "Wallet retrieved", body = WalletResponse),
        (status = 401, description = "Unauthorized (missing or invalid token)"),
        (status = 503, description = "Ledger busy, retry"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Wallet",
    security(("BearerAuth" = []))
)]
pub async fn get_wallet(
    State(app_state): State<AppState>,
    authenticated_user: AuthenticatedUser,
) -> ApiResult<WalletResponse> {
    let wallet = app_state
        .wallet_state
        .ledger_service
        .get_or_create_wallet(authenticated_user.user_id)
        .await
        .map_err(reject)?;

    Ok(ApiResponse::ok("Wallet retrieved", WalletResponse { wallet }))
}

/// 내 원장 엔트리 조회 핸들러 (최신순)
/// List the caller's ledger entries, newest first
#[utoipa::path(
    get,
    path = "/api/wallet/transactions",
    params(TransactionListParams),
    responses(
        (status = 200, description = "Transactions retrieved", body = TransactionPage),
        (status = 400, description = "Invalid query (unknown type)"),
        (status = 401, description = "Unauthorized (missing or invalid token)"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Wallet",
    security(("BearerAuth" = []))
)]
pub async fn get_transactions(
    State(app_state): State<AppState>,
    authenticated_user: AuthenticatedUser,
    params: Result<Query<TransactionListParams>, QueryRejection>,
) -> ApiResult<TransactionPage> {
    let query = query_params(params)
        .and_then(TransactionListParams::into_query)
        .map_err(reject)?;

    let page = app_state
        .wallet_state
        .ledger_service
        .list_transactions(authenticated_user.user_id, query)
        .await
        .map_err(reject)?;

    Ok(ApiResponse::ok("Transactions retrieved", page))
}
