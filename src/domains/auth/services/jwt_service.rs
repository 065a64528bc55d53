use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::domains::auth::models::jwt::{Claims, Role};
use crate::shared::errors::AuthError;

/// JWT 서비스
/// JWT Service for token verification (and issuing, for tooling and tests)
///
/// 토큰 발급 주체는 인증 서비스이며, 지갑 서비스는 검증만 합니다.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    /// JWT Service 생성
    /// Create JWT Service (HS256 shared secret)
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Access Token 발급 (1시간 만료)
    /// Generate Access Token
    pub fn generate_access_token(&self, user_id: u64, email: String, role: Role) -> Result<String, AuthError> {
        let claims = Claims::new(user_id, email, role, 1);

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Failed to generate access token: {}", e)))
    }

    /// Access Token 검증 (서명 + 만료)
    /// Verify Access Token
    pub fn verify_access_token(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidToken)
    }
}
