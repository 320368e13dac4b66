//! User domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 用户角色（权限等级递增）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    User,
    Marketing,
    Branding,
    // snake_case 会把数字并入前一个词，这里需要显式重命名
    #[sqlx(rename = "soc_level_1")]
    #[serde(rename = "soc_level_1")]
    SocLevel1,
    #[sqlx(rename = "soc_level_3")]
    #[serde(rename = "soc_level_3")]
    SocLevel3,
    Ciso,
    Admin,
    SuperAdmin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Marketing => "marketing",
            UserRole::Branding => "branding",
            UserRole::SocLevel1 => "soc_level_1",
            UserRole::SocLevel3 => "soc_level_3",
            UserRole::Ciso => "ciso",
            UserRole::Admin => "admin",
            UserRole::SuperAdmin => "super_admin",
        }
    }

    /// 数字权限等级，用于比较类权限判断
    pub fn permission_level(&self) -> u8 {
        match self {
            UserRole::User => 1,
            UserRole::Marketing => 2,
            UserRole::Branding => 3,
            UserRole::SocLevel1 => 4,
            UserRole::SocLevel3 => 5,
            UserRole::Ciso => 6,
            UserRole::Admin => 7,
            UserRole::SuperAdmin => 8,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::SuperAdmin)
    }

    pub fn parse(s: &str) -> Option<UserRole> {
        match s {
            "user" => Some(UserRole::User),
            "marketing" => Some(UserRole::Marketing),
            "branding" => Some(UserRole::Branding),
            "soc_level_1" => Some(UserRole::SocLevel1),
            "soc_level_3" => Some(UserRole::SocLevel3),
            "ciso" => Some(UserRole::Ciso),
            "admin" => Some(UserRole::Admin),
            "super_admin" => Some(UserRole::SuperAdmin),
            _ => None,
        }
    }
}

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: UserRole,

    // Account state
    pub status: String, // enabled, disabled, locked
    pub failed_login_attempts: i32,
    pub last_failed_login_at: Option<DateTime<Utc>>,
    pub locked_until: Option<DateTime<Utc>>,
    pub password_changed_at: DateTime<Utc>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Update role request (admin only)
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: UserRole,
}

/// User response (without sensitive data)
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub permission_level: u8,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            permission_level: user.role.permission_level(),
            status: user.status,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_levels_strictly_increase() {
        let roles = [
            UserRole::User,
            UserRole::Marketing,
            UserRole::Branding,
            UserRole::SocLevel1,
            UserRole::SocLevel3,
            UserRole::Ciso,
            UserRole::Admin,
            UserRole::SuperAdmin,
        ];

        for pair in roles.windows(2) {
            assert!(pair[0].permission_level() < pair[1].permission_level());
        }

        assert_eq!(UserRole::User.permission_level(), 1);
        assert_eq!(UserRole::SuperAdmin.permission_level(), 8);
    }

    #[test]
    fn test_parse_round_trip() {
        for role in [
            UserRole::User,
            UserRole::Marketing,
            UserRole::Branding,
            UserRole::SocLevel1,
            UserRole::SocLevel3,
            UserRole::Ciso,
            UserRole::Admin,
            UserRole::SuperAdmin,
        ] {
            assert_eq!(UserRole::parse(role.as_str()), Some(role));
        }

        assert_eq!(UserRole::parse("root"), None);
    }
}
