//! 密码哈希功能单元测试
//!
//! 测试 Argon2id 密码哈希和验证功能

mod common;

use common::create_test_config;
use newsdesk::auth::password::PasswordHasher;

#[test]
fn test_password_hash_and_verify() {
    let hasher = PasswordHasher::new();
    let password = "TestPassword123!";

    let hash = hasher.hash(password).expect("Hashing should succeed");
    assert!(hash.starts_with("$argon2id$"));

    hasher.verify(password, &hash).expect("Verification should succeed");
}

#[test]
fn test_wrong_password_fails_verification() {
    let hasher = PasswordHasher::new();
    let hash = hasher.hash("TestPassword123!").expect("Hashing should succeed");

    assert!(hasher.verify("WrongPassword456!", &hash).is_err());
}

#[test]
fn test_same_password_different_hashes() {
    // 每次哈希使用随机盐
    let hasher = PasswordHasher::new();
    let password = "TestPassword123!";

    let hash1 = hasher.hash(password).expect("Hashing should succeed");
    let hash2 = hasher.hash(password).expect("Hashing should succeed");

    assert_ne!(hash1, hash2);
    hasher.verify(password, &hash1).expect("First hash should verify");
    hasher.verify(password, &hash2).expect("Second hash should verify");
}

#[test]
fn test_malformed_hash_rejected() {
    let hasher = PasswordHasher::new();
    assert!(hasher.verify("TestPassword123!", "not-a-valid-hash").is_err());
}

// ==================== 密码策略测试 ====================

#[test]
fn test_password_policy_accepts_valid_password() {
    let config = create_test_config();
    assert!(PasswordHasher::validate_password_policy("GoodPass1", &config).is_ok());
}

#[test]
fn test_password_policy_rejects_short_password() {
    let config = create_test_config();
    assert!(PasswordHasher::validate_password_policy("Ab1", &config).is_err());
}

#[test]
fn test_password_policy_requires_uppercase() {
    let config = create_test_config();
    assert!(PasswordHasher::validate_password_policy("lowercase1", &config).is_err());
}

#[test]
fn test_password_policy_requires_digit() {
    let config = create_test_config();
    assert!(PasswordHasher::validate_password_policy("NoDigitsHere", &config).is_err());
}

// ==================== 修改密码测试（需要数据库） ====================

mod change_password {
    use super::*;
    use super::common::{create_test_user, setup_test_db};
    use newsdesk::{
        auth::jwt::JwtService,
        error::AppError,
        models::auth::{ChangePasswordRequest, LoginRequest},
        services::AuthService,
    };
    use serial_test::serial;
    use std::sync::Arc;

    fn build_service(pool: sqlx::PgPool) -> AuthService {
        let config = Arc::new(create_test_config());
        let jwt_service = Arc::new(JwtService::from_config(&config).unwrap());
        AuthService::new(pool, jwt_service, config)
    }

    #[tokio::test]
    #[serial]
    #[ignore] // 需要数据库
    async fn test_change_password_rejects_weak_or_wrong_input() {
        let config = create_test_config();
        let pool = setup_test_db(&config).await;
        let user_id = create_test_user(&pool, "pwchange1@test.com", "OldPassword1", "marketing")
            .await
            .unwrap();
        let service = build_service(pool);

        // 新密码不符合策略 → 400，旧密码此时尚未被校验
        let result = service
            .change_password(
                user_id,
                ChangePasswordRequest {
                    current_password: "OldPassword1".to_string(),
                    new_password: "weak".to_string(),
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));

        // 当前密码错误 → 401
        let result = service
            .change_password(
                user_id,
                ChangePasswordRequest {
                    current_password: "NotTheOldOne1".to_string(),
                    new_password: "NewPassword2".to_string(),
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Unauthorized)));

        // 失败的尝试不得改掉密码
        service
            .login(
                LoginRequest {
                    email: "pwchange1@test.com".to_string(),
                    password: "OldPassword1".to_string(),
                },
                "127.0.0.1",
                None,
            )
            .await
            .expect("old password should still work");
    }

    #[tokio::test]
    #[serial]
    #[ignore] // 需要数据库
    async fn test_change_password_rotates_credential_and_revokes_sessions() {
        let config = create_test_config();
        let pool = setup_test_db(&config).await;
        let user_id = create_test_user(&pool, "pwchange2@test.com", "OldPassword1", "marketing")
            .await
            .unwrap();
        let service = build_service(pool);

        // 先登录拿到一个刷新令牌
        let session = service
            .login(
                LoginRequest {
                    email: "pwchange2@test.com".to_string(),
                    password: "OldPassword1".to_string(),
                },
                "127.0.0.1",
                None,
            )
            .await
            .unwrap();

        let revoked = service
            .change_password(
                user_id,
                ChangePasswordRequest {
                    current_password: "OldPassword1".to_string(),
                    new_password: "NewPassword2".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(revoked, 1);

        // 旧密码失效，新密码生效
        let old_login = service
            .login(
                LoginRequest {
                    email: "pwchange2@test.com".to_string(),
                    password: "OldPassword1".to_string(),
                },
                "127.0.0.1",
                None,
            )
            .await;
        assert!(matches!(old_login, Err(AppError::Unauthorized)));

        service
            .login(
                LoginRequest {
                    email: "pwchange2@test.com".to_string(),
                    password: "NewPassword2".to_string(),
                },
                "127.0.0.1",
                None,
            )
            .await
            .expect("new password should log in");

        // 改密前的刷新令牌已被撤销
        let refresh = service
            .refresh_token(
                newsdesk::models::auth::RefreshTokenRequest {
                    refresh_token: session.refresh_token,
                },
                "127.0.0.1",
            )
            .await;
        assert!(matches!(refresh, Err(AppError::Unauthorized)));
    }
}
