// Wallet handlers module
// 지갑 핸들러 모듈

pub mod admin_handler;
pub mod request_handler;
pub mod wallet_handler;

pub use admin_handler::*;
pub use request_handler::*;
pub use wallet_handler::*;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query};
use axum::{Json, http::StatusCode};

use crate::shared::errors::WalletError;

// axum 기본 거절 응답(평문)을 공통 에러 봉투로 통일

pub(crate) fn reject(err: WalletError) -> (StatusCode, Json<serde_json::Value>) {
    err.into()
}

pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, WalletError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| WalletError::InvalidPayload(e.body_text()))
}

pub(crate) fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, WalletError> {
    query
        .map(|Query(params)| params)
        .map_err(|e| WalletError::InvalidQuery(e.body_text()))
}

pub(crate) fn path_id<T>(path: Result<Path<T>, PathRejection>) -> Result<T, WalletError> {
    path.map(|Path(id)| id)
        .map_err(|e| WalletError::InvalidQuery(e.body_text()))
}
