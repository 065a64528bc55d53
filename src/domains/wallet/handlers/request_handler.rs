use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;

use crate::domains::wallet::handlers::{json_body, path_id, query_params, reject};
use crate::domains::wallet::models::{
    CreateDepositRequest, CreateWithdrawalRequest, RequestListParams, WalletRequest,
};
use crate::shared::middleware::auth::AuthenticatedUser;
use crate::shared::services::AppState;
use crate::shared::utils::{ApiResponse, ApiResult};

/// 입금 요청 생성 핸들러
/// Create a deposit request (evidence image reference required)
#[utoipa::path(
    post,
    path = "/api/wallet/requests/deposit",
    request_body = CreateDepositRequest,
    responses(
        (status = 201, description = "Deposit request created", body = WalletRequest),
        (status = 400, description = "Invalid amount or missing evidence"),
        (status = 401, description = "Unauthorized (missing or invalid token)"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Wallet Requests",
    security(("BearerAuth" = []))
)]
pub async fn create_deposit_request(
    State(app_state): State<AppState>,
    authenticated_user: AuthenticatedUser,
    payload: Result<Json<CreateDepositRequest>, JsonRejection>,
) -> ApiResult<WalletRequest> {
    let body = json_body(payload).map_err(reject)?;

    let request = app_state
        .wallet_state
        .request_service
        .create_deposit_request(authenticated_user.user_id, body.amount, &body.evidence_image)
        .await
        .map_err(reject)?;

    Ok(ApiResponse::created("Deposit request created", request))
}

/// 출금 요청 생성 핸들러
/// Create a withdrawal request (balance checked at creation and again at approval)
#[utoipa::path(
    post,
    path = "/api/wallet/requests/withdrawal",
    request_body = CreateWithdrawalRequest,
    responses(
        (status = 201, description = "Withdrawal request created", body = WalletRequest),
        (status = 400, description = "Invalid amount or missing destination"),
        (status = 401, description = "Unauthorized (missing or invalid token)"),
        (status = 422, description = "Insufficient balance"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Wallet Requests",
    security(("BearerAuth" = []))
)]
pub async fn create_withdrawal_request(
    State(app_state): State<AppState>,
    authenticated_user: AuthenticatedUser,
    payload: Result<Json<CreateWithdrawalRequest>, JsonRejection>,
) -> ApiResult<WalletRequest> {
    let body = json_body(payload).map_err(reject)?;

    let request = app_state
        .wallet_state
        .request_service
        .create_withdrawal_request(authenticated_user.user_id, body.amount, &body.destination)
        .await
        .map_err(reject)?;

    Ok(ApiResponse::created("Withdrawal request created", request))
}

/// 내 요청 목록 핸들러
/// List the caller's requests, newest first
#[utoipa::path(
    get,
    path = "/api/wallet/requests",
    params(RequestListParams),
    responses(
        (status = 200, description = "Requests retrieved", body = [WalletRequest]),
        (status = 400, description = "Invalid type or status filter"),
        (status = 401, description = "Unauthorized (missing or invalid token)")
    ),
    tag = "Wallet Requests",
    security(("BearerAuth" = []))
)]
pub async fn list_my_requests(
    State(app_state): State<AppState>,
    authenticated_user: AuthenticatedUser,
    params: Result<Query<RequestListParams>, QueryRejection>,
) -> ApiResult<Vec<WalletRequest>> {
    let filter = query_params(params)
        .and_then(|params| params.filter())
        .map_err(reject)?;

    let requests = app_state
        .wallet_state
        .request_service
        .list_for_owner(authenticated_user.user_id, filter.request_type, filter.status)
        .await
        .map_err(reject)?;

    Ok(ApiResponse::ok("Requests retrieved", requests))
}

/// 내 요청 단건 조회 핸들러
/// Get one of the caller's requests
#[utoipa::path(
    get,
    path = "/api/wallet/requests/{id}",
    params(
        ("id" = i64, Path, description = "Wallet request ID")
    ),
    responses(
        (status = 200, description = "Request retrieved", body = WalletRequest),
        (status = 401, description = "Unauthorized (missing or invalid token)"),
        (status = 404, description = "Request not found")
    ),
    tag = "Wallet Requests",
    security(("BearerAuth" = []))
)]
pub async fn get_my_request(
    State(app_state): State<AppState>,
    authenticated_user: AuthenticatedUser,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<WalletRequest> {
    let request_id = path_id(id).map_err(reject)?;

    let request = app_state
        .wallet_state
        .request_service
        .get_for_owner(authenticated_user.user_id, request_id)
        .await
        .map_err(reject)?;

    Ok(ApiResponse::ok("Request retrieved", request))
}
