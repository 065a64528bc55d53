use std::fmt;

use serde::{Deserialize, Serialize};

/// 사용자 역할
/// Caller role carried in the access token
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => f.write_str("user"),
            Role::Admin => f.write_str("admin"),
        }
    }
}

/// JWT Claims (토큰에 포함될 데이터)
/// JWT Claims (data to be included in token)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// 사용자 ID
    /// User ID
    pub user_id: u64,

    /// 이메일
    /// Email
    pub email: String,

    /// 역할 (없으면 user)
    #[serde(default)]
    pub role: Role,

    /// 만료 시간 (Unix timestamp)
    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// 발급 시간 (Unix timestamp)
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

impl Claims {
    /// 새 Claims 생성 (만료 시간 자동 계산)
    /// Create new Claims (expiration time automatically calculated)
    pub fn new(user_id: u64, email: String, role: Role, expiration_hours: i64) -> Self {
        let now = chrono::Utc::now().timestamp();

        Self {
            user_id,
            email,
            role,
            exp: now + expiration_hours * 3600,
            iat: now,
        }
    }
}
