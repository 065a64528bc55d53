use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
};

use crate::domains::auth::models::Role;
use crate::shared::errors::AuthError;
use crate::shared::services::AppState;

/// 인증된 사용자 정보 (JWT 토큰에서 추출)
/// Authenticated user information (extracted from JWT token)
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: u64,
    pub email: String,
    pub role: Role,
}

/// 관리자 (role = admin)
/// Authenticated administrator
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthenticatedUser);

impl AdminUser {
    pub fn admin_id(&self) -> u64 {
        self.0.user_id
    }
}

/// AuthenticatedUser를 Axum Extractor로 구현
///
/// 사용법:
/// ```rust,ignore
/// pub async fn get_wallet(
///     State(app_state): State<AppState>,
///     authenticated_user: AuthenticatedUser,
/// ) -> ApiResult<WalletResponse> {
///     let owner_id = authenticated_user.user_id;
///     // ...
/// }
/// ```
#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = (StatusCode, axum::Json<serde_json::Value>);

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // 1. Authorization 헤더에서 토큰 추출
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingToken)?
            .to_str()
            .map_err(|_| AuthError::InvalidFormat)?;

        // 2. "Bearer <token>" 형식 파싱
        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidFormat)?;

        // 3. 서명/만료 검증
        let claims = state.auth_state.jwt_service.verify_access_token(token)?;

        Ok(AuthenticatedUser {
            user_id: claims.user_id,
            email: claims.email,
            role: claims.role,
        })
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = (StatusCode, axum::Json<serde_json::Value>);

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = AuthenticatedUser::from_request_parts(parts, state).await?;

        if !user.role.is_admin() {
            tracing::warn!(user_id = user.user_id, "admin endpoint called without admin role");
            return Err(AuthError::AdminRequired.into());
        }

        Ok(AdminUser(user))
    }
}
