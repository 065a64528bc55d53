use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;

use crate::domains::wallet::handlers::{json_body, path_id, query_params, reject};
use crate::domains::wallet::models::{
    ApproveWithdrawalRequest, RejectWalletRequest, RequestDecisionResponse, RequestListParams,
    WalletRequestPage, WalletResponse,
};
use crate::shared::middleware::auth::AdminUser;
use crate::shared::services::AppState;
use crate::shared::utils::{ApiResponse, ApiResult};

// =====================================================
// 관리자 전용 핸들러 (AdminUser extractor: role = admin)
// =====================================================

/// 전체 요청 목록 (관리자)
/// List all requests with filters, 1-based pages
#[utoipa::path(
    get,
    path = "/api/admin/wallet/requests",
    params(RequestListParams),
    responses(
        (status = 200, description = "Requests retrieved", body = WalletRequestPage),
        (status = 400, description = "Invalid type or status filter"),
        (status = 401, description = "Unauthorized (missing or invalid token)"),
        (status = 403, description = "Administrator role required")
    ),
    tag = "Admin",
    security(("BearerAuth" = []))
)]
pub async fn list_requests(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    params: Result<Query<RequestListParams>, QueryRejection>,
) -> ApiResult<WalletRequestPage> {
    let params = query_params(params).map_err(reject)?;
    let filter = params.filter().map_err(reject)?;

    let page = app_state
        .wallet_state
        .request_service
        .list_all(filter, params.page())
        .await
        .map_err(reject)?;

    Ok(ApiResponse::ok("Requests retrieved", page))
}

/// 사용자 지갑 조회 (관리자)
/// Look up any owner's wallet
#[utoipa::path(
    get,
    path = "/api/admin/wallets/{owner_id}",
    params(
        ("owner_id" = u64, Path, description = "Wallet owner ID")
    ),
    responses(
        (status = 200, description = "Wallet retrieved", body = WalletResponse),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "Wallet not found")
    ),
    tag = "Admin",
    security(("BearerAuth" = []))
)]
pub async fn get_owner_wallet(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    owner_id: Result<Path<u64>, PathRejection>,
) -> ApiResult<WalletResponse> {
    let owner_id = path_id(owner_id).map_err(reject)?;

    let wallet = app_state
        .wallet_state
        .ledger_service
        .get_wallet(owner_id)
        .await
        .map_err(reject)?;

    Ok(ApiResponse::ok("Wallet retrieved", WalletResponse { wallet }))
}

/// 입금 승인
/// Approve a pending deposit request
#[utoipa::path(
    put,
    path = "/api/admin/wallet/requests/{id}/approve-deposit",
    params(
        ("id" = i64, Path, description = "Wallet request ID")
    ),
    responses(
        (status = 200, description = "Deposit approved", body = RequestDecisionResponse),
        (status = 400, description = "Request is not a deposit"),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request already decided"),
        (status = 503, description = "Ledger busy, retry")
    ),
    tag = "Admin",
    security(("BearerAuth" = []))
)]
pub async fn approve_deposit(
    State(app_state): State<AppState>,
    admin: AdminUser,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<RequestDecisionResponse> {
    let request_id = path_id(id).map_err(reject)?;

    let decision = app_state
        .wallet_state
        .request_service
        .approve_deposit(request_id, admin.admin_id())
        .await
        .map_err(reject)?;

    Ok(ApiResponse::ok("Deposit approved", decision))
}

/// 출금 승인 (지급 증빙 필수)
/// Approve a pending withdrawal with proof-of-payout
#[utoipa::path(
    put,
    path = "/api/admin/wallet/requests/{id}/approve-withdrawal",
    params(
        ("id" = i64, Path, description = "Wallet request ID")
    ),
    request_body = ApproveWithdrawalRequest,
    responses(
        (status = 200, description = "Withdrawal approved", body = RequestDecisionResponse),
        (status = 400, description = "Missing evidence or request is not a withdrawal"),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request already decided"),
        (status = 422, description = "Insufficient balance at approval time"),
        (status = 503, description = "Ledger busy, retry")
    ),
    tag = "Admin",
    security(("BearerAuth" = []))
)]
pub async fn approve_withdrawal(
    State(app_state): State<AppState>,
    admin: AdminUser,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ApproveWithdrawalRequest>, JsonRejection>,
) -> ApiResult<RequestDecisionResponse> {
    let request_id = path_id(id).map_err(reject)?;
    let body = json_body(payload).map_err(reject)?;

    let decision = app_state
        .wallet_state
        .request_service
        .approve_withdrawal(request_id, admin.admin_id(), &body.evidence_image)
        .await
        .map_err(reject)?;

    Ok(ApiResponse::ok("Withdrawal approved", decision))
}

/// 요청 거절 (원장 변경 없음)
/// Reject a pending request
#[utoipa::path(
    put,
    path = "/api/admin/wallet/requests/{id}/reject",
    params(
        ("id" = i64, Path, description = "Wallet request ID")
    ),
    request_body = RejectWalletRequest,
    responses(
        (status = 200, description = "Request rejected", body = RequestDecisionResponse),
        (status = 400, description = "Missing reason"),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request already decided")
    ),
    tag = "Admin",
    security(("BearerAuth" = []))
)]
pub async fn reject_request(
    State(app_state): State<AppState>,
    admin: AdminUser,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<RejectWalletRequest>, JsonRejection>,
) -> ApiResult<RequestDecisionResponse> {
    let request_id = path_id(id).map_err(reject)?;
    let body = json_body(payload).map_err(reject)?;

    let decision = app_state
        .wallet_state
        .request_service
        .reject(request_id, admin.admin_id(), &body.reason)
        .await
        .map_err(reject)?;

    Ok(ApiResponse::ok("Request rejected", decision))
}
