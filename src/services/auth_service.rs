//! 认证服务：登录、登出、令牌刷新

use crate::{
    auth::jwt::{JwtService, TokenPair},
    auth::password::PasswordHasher,
    config::AppConfig,
    error::AppError,
    models::{auth::*, user::*},
    repository::{auth_repo::AuthRepository, user_repo::UserRepository},
};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

pub struct AuthService {
    db: PgPool,
    jwt_service: Arc<JwtService>,
    config: Arc<AppConfig>,
}

impl AuthService {
    pub fn new(db: PgPool, jwt_service: Arc<JwtService>, config: Arc<AppConfig>) -> Self {
        Self {
            db,
            jwt_service,
            config,
        }
    }

    /// 用户登录
    pub async fn login(
        &self,
        req: LoginRequest,
        client_ip: &str,
        user_agent: Option<&str>,
    ) -> Result<LoginResponse, AppError> {
        // 检查该 IP 最近的失败频率
        self.check_login_rate_limit(client_ip).await?;

        let user_repo = UserRepository::new(self.db.clone());
        let auth_repo = AuthRepository::new(self.db.clone());

        let user: User = match user_repo.find_by_email(&req.email).await? {
            Some(user) => user,
            None => {
                self.record_login_event(
                    None,
                    &req.email,
                    "login_failure",
                    Some("unknown_email"),
                    client_ip,
                    user_agent,
                )
                .await;
                return Err(AppError::Unauthorized);
            }
        };

        // 检查账户状态
        Self::check_account_status(&user)?;

        // 检查账户是否被临时锁定
        if let Some(locked_until) = user.locked_until {
            if locked_until > chrono::Utc::now() {
                self.record_login_event(
                    Some(user.id),
                    &req.email,
                    "login_failure",
                    Some("account_locked"),
                    client_ip,
                    user_agent,
                )
                .await;
                return Err(AppError::BadRequest("账户已被临时锁定".to_string()));
            }
        }

        // 验证密码，失败则累加计数，达到上限后锁定
        let hasher = PasswordHasher::new();
        if hasher.verify(&req.password, &user.password_hash).is_err() {
            let _ = user_repo.increment_failed_attempts(user.id).await;

            if user.failed_login_attempts + 1 >= self.config.security.max_login_attempts as i32 {
                let locked_until = chrono::Utc::now()
                    + chrono::Duration::seconds(
                        self.config.security.login_lockout_duration_secs as i64,
                    );
                let _ = user_repo.lock_account(user.id, locked_until).await;
                tracing::warn!(user_id = %user.id, "Account locked after repeated login failures");
            }

            self.record_login_event(
                Some(user.id),
                &req.email,
                "login_failure",
                Some("invalid_password"),
                client_ip,
                user_agent,
            )
            .await;
            return Err(AppError::Unauthorized);
        }

        // 重置失败次数
        if user.failed_login_attempts > 0 {
            let _ = user_repo.reset_failed_attempts(user.id).await;
        }

        // 生成令牌
        let token_pair =
            self.jwt_service
                .generate_token_pair(&user.id, &user.email, user.role.as_str())?;

        // 存储刷新令牌
        let token_hash = AuthRepository::hash_token(&token_pair.refresh_token);
        let refresh_token = RefreshToken {
            id: Uuid::new_v4(),
            token_hash,
            user_id: user.id,
            user_agent: user_agent.map(|s| s.to_string()),
            ip_address: client_ip.to_string(),
            expires_at: chrono::Utc::now()
                + chrono::Duration::seconds(self.config.security.refresh_token_exp_secs as i64),
            revoked_at: None,
            replaced_by: None,
            created_at: chrono::Utc::now(),
        };

        auth_repo.store_refresh_token(&refresh_token).await?;

        // 记录成功登录
        self.record_login_event(
            Some(user.id),
            &user.email,
            "login_success",
            None,
            client_ip,
            user_agent,
        )
        .await;

        Ok(LoginResponse {
            access_token: token_pair.access_token,
            refresh_token: token_pair.refresh_token,
            expires_in: token_pair.expires_in,
            user: UserResponse::from(user),
        })
    }

    /// 刷新令牌（旧令牌轮换后即撤销）
    pub async fn refresh_token(
        &self,
        req: RefreshTokenRequest,
        client_ip: &str,
    ) -> Result<TokenPair, AppError> {
        // 验证刷新令牌
        let _claims = self.jwt_service.validate_refresh_token(&req.refresh_token)?;

        // 检查令牌是否被撤销
        let auth_repo = AuthRepository::new(self.db.clone());
        let token_hash = AuthRepository::hash_token(&req.refresh_token);
        let refresh_token_record: RefreshToken = auth_repo
            .find_refresh_token_by_hash(&token_hash)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if refresh_token_record.revoked_at.is_some() {
            return Err(AppError::Unauthorized);
        }

        if refresh_token_record.expires_at < chrono::Utc::now() {
            return Err(AppError::Unauthorized);
        }

        // 获取用户
        let user_repo = UserRepository::new(self.db.clone());
        let user: User = user_repo
            .find_by_id(&refresh_token_record.user_id)
            .await?
            .ok_or(AppError::Unauthorized)?;

        // 检查账户状态
        Self::check_account_status(&user)?;

        // 生成新的令牌对
        let new_token_pair =
            self.jwt_service
                .generate_token_pair(&user.id, &user.email, user.role.as_str())?;

        // 撤销旧的刷新令牌
        let _ = auth_repo.revoke_refresh_token(refresh_token_record.id).await;

        // 存储新的刷新令牌
        let new_token_hash = AuthRepository::hash_token(&new_token_pair.refresh_token);
        let new_refresh_token = RefreshToken {
            id: Uuid::new_v4(),
            token_hash: new_token_hash,
            user_id: user.id,
            user_agent: None,
            ip_address: client_ip.to_string(),
            expires_at: chrono::Utc::now()
                + chrono::Duration::seconds(self.config.security.refresh_token_exp_secs as i64),
            revoked_at: None,
            replaced_by: Some(refresh_token_record.id),
            created_at: chrono::Utc::now(),
        };

        auth_repo.store_refresh_token(&new_refresh_token).await?;

        Ok(new_token_pair)
    }

    /// 登出（撤销刷新令牌）
    pub async fn logout(&self, refresh_token: &str, user_id: Uuid) -> Result<(), AppError> {
        let auth_repo = AuthRepository::new(self.db.clone());
        let token_hash = AuthRepository::hash_token(refresh_token);

        auth_repo
            .revoke_refresh_token_by_hash(&token_hash, user_id)
            .await?;

        Ok(())
    }

    /// 从所有设备登出
    pub async fn logout_all(&self, user_id: Uuid) -> Result<u64, AppError> {
        let auth_repo = AuthRepository::new(self.db.clone());
        auth_repo.revoke_all_refresh_tokens(user_id).await
    }

    /// 获取当前用户
    pub async fn current_user(&self, user_id: Uuid) -> Result<UserResponse, AppError> {
        let user_repo = UserRepository::new(self.db.clone());
        let user = user_repo
            .find_by_id(&user_id)
            .await?
            .ok_or(AppError::NotFound)?;

        Ok(UserResponse::from(user))
    }

    /// 修改密码。成功后撤销该用户的所有刷新令牌
    pub async fn change_password(
        &self,
        user_id: Uuid,
        req: ChangePasswordRequest,
    ) -> Result<u64, AppError> {
        let user_repo = UserRepository::new(self.db.clone());
        let user: User = user_repo
            .find_by_id(&user_id)
            .await?
            .ok_or(AppError::NotFound)?;

        Self::check_account_status(&user)?;

        // 先校验新密码策略，再验证当前密码，避免无谓的 Argon2 计算
        PasswordHasher::validate_password_policy(&req.new_password, &self.config)?;

        let hasher = PasswordHasher::new();
        hasher.verify(&req.current_password, &user.password_hash)?;

        let new_hash = hasher.hash(&req.new_password)?;
        user_repo.update_password(user.id, &new_hash).await?;

        // 旧会话全部失效，客户端需重新登录
        let auth_repo = AuthRepository::new(self.db.clone());
        let revoked = auth_repo.revoke_all_refresh_tokens(user.id).await?;

        tracing::info!(user_id = %user.id, revoked, "Password changed, sessions revoked");

        Ok(revoked)
    }

    /// 检查账户状态
    fn check_account_status(user: &User) -> Result<(), AppError> {
        match user.status.as_str() {
            "enabled" => Ok(()),
            "disabled" => Err(AppError::BadRequest("账户已被禁用".to_string())),
            "locked" => Err(AppError::BadRequest("账户已锁定，请联系管理员".to_string())),
            other => {
                tracing::error!(status = other, "Unknown account status");
                Err(AppError::Internal)
            }
        }
    }

    /// 检查登录速率限制
    async fn check_login_rate_limit(&self, client_ip: &str) -> Result<(), AppError> {
        let auth_repo = AuthRepository::new(self.db.clone());

        // 最近 5 分钟的失败登录次数
        let recent_failures = auth_repo
            .count_recent_login_failures(client_ip, 300)
            .await?;

        if recent_failures >= 10 {
            tracing::warn!(
                %client_ip,
                recent_failures,
                "Rate limit exceeded for login"
            );
            return Err(AppError::RateLimitExceeded);
        }

        Ok(())
    }

    /// 记录登录事件
    async fn record_login_event(
        &self,
        user_id: Option<Uuid>,
        email: &str,
        event_type: &str,
        failure_reason: Option<&str>,
        source_ip: &str,
        user_agent: Option<&str>,
    ) {
        let auth_repo = AuthRepository::new(self.db.clone());

        let event = LoginEvent {
            id: Uuid::new_v4(),
            user_id,
            email: email.to_string(),
            event_type: event_type.to_string(),
            failure_reason: failure_reason.map(|s| s.to_string()),
            source_ip: source_ip.to_string(),
            user_agent: user_agent.map(|s| s.to_string()),
            occurred_at: chrono::Utc::now(),
        };

        // 忽略登录事件写入错误，不要破坏请求流程
        let _ = auth_repo.record_login_event(&event).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_status(status: &str) -> User {
        let now = chrono::Utc::now();
        User {
            id: Uuid::new_v4(),
            email: "reviewer@example.com".to_string(),
            password_hash: "unused".to_string(),
            name: "Reviewer".to_string(),
            role: UserRole::Marketing,
            status: status.to_string(),
            failed_login_attempts: 0,
            last_failed_login_at: None,
            locked_until: None,
            password_changed_at: now,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_enabled_account_passes_status_check() {
        assert!(AuthService::check_account_status(&user_with_status("enabled")).is_ok());
    }

    #[test]
    fn test_disabled_and_locked_map_to_bad_request() {
        for status in ["disabled", "locked"] {
            match AuthService::check_account_status(&user_with_status(status)) {
                Err(AppError::BadRequest(_)) => {}
                other => panic!("{} should map to BadRequest, got {:?}", status, other),
            }
        }
    }

    #[test]
    fn test_unknown_status_is_internal_error() {
        match AuthService::check_account_status(&user_with_status("suspended")) {
            Err(AppError::Internal) => {}
            other => panic!("unknown status should map to Internal, got {:?}", other),
        }
    }
}
