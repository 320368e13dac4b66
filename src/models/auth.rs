//! Authentication-related models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    pub user: super::user::UserResponse,
}

/// Token refresh request
#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Logout request
#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub refresh_token: String,
}

/// Password change request
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Refresh token record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RefreshToken {
    pub id: Uuid,
    pub token_hash: String,
    pub user_id: Uuid,
    pub user_agent: Option<String>,
    pub ip_address: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub revoked_at: Option<chrono::DateTime<chrono::Utc>>,
    pub replaced_by: Option<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Login event
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LoginEvent {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub email: String,
    pub event_type: String,
    pub failure_reason: Option<String>,
    pub source_ip: String,
    pub user_agent: Option<String>,
    pub occurred_at: chrono::DateTime<chrono::Utc>,
}
