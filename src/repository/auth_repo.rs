//! 认证令牌与登录事件的数据访问

use crate::{error::AppError, models::auth::*};
use sha2::{Digest, Sha256};
use sqlx::{PgPool, Row};
use uuid::Uuid;

pub struct AuthRepository {
    db: PgPool,
}

impl AuthRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// 刷新令牌只存哈希，不落原文
    pub fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// 存储刷新令牌
    pub async fn store_refresh_token(&self, token: &RefreshToken) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (
                id, token_hash, user_id, user_agent, ip_address,
                expires_at, revoked_at, replaced_by, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(token.id)
        .bind(&token.token_hash)
        .bind(token.user_id)
        .bind(&token.user_agent)
        .bind(&token.ip_address)
        .bind(token.expires_at)
        .bind(token.revoked_at)
        .bind(token.replaced_by)
        .bind(token.created_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// 根据哈希查找刷新令牌
    pub async fn find_refresh_token_by_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshToken>, AppError> {
        let token = sqlx::query_as::<_, RefreshToken>(
            "SELECT * FROM refresh_tokens WHERE token_hash = $1"
        )
        .bind(token_hash)
        .fetch_optional(&self.db)
        .await?;

        Ok(token)
    }

    /// 撤销刷新令牌
    pub async fn revoke_refresh_token(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = NOW() WHERE id = $1 AND revoked_at IS NULL"
        )
        .bind(id)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// 根据哈希撤销指定用户的刷新令牌
    pub async fn revoke_refresh_token_by_hash(
        &self,
        token_hash: &str,
        user_id: Uuid,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = NOW()
            WHERE token_hash = $1 AND user_id = $2 AND revoked_at IS NULL
            "#
        )
        .bind(token_hash)
        .bind(user_id)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// 撤销用户的全部刷新令牌
    pub async fn revoke_all_refresh_tokens(&self, user_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = NOW() WHERE user_id = $1 AND revoked_at IS NULL"
        )
        .bind(user_id)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected())
    }

    /// 记录登录事件
    pub async fn record_login_event(&self, event: &LoginEvent) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO login_events (
                id, user_id, email, event_type, failure_reason,
                source_ip, user_agent, occurred_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(event.id)
        .bind(event.user_id)
        .bind(&event.email)
        .bind(&event.event_type)
        .bind(&event.failure_reason)
        .bind(&event.source_ip)
        .bind(&event.user_agent)
        .bind(event.occurred_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// 统计某 IP 最近 window_secs 秒内的失败登录次数
    pub async fn count_recent_login_failures(
        &self,
        source_ip: &str,
        window_secs: i64,
    ) -> Result<i64, AppError> {
        let count: i64 = sqlx::query(
            r#"
            SELECT COUNT(*) FROM login_events
            WHERE source_ip = $1
              AND event_type = 'login_failure'
              AND occurred_at > NOW() - make_interval(secs => $2::double precision)
            "#,
        )
        .bind(source_ip)
        .bind(window_secs as f64)
        .fetch_one(&self.db)
        .await?
        .get(0);

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_token_is_deterministic() {
        let h1 = AuthRepository::hash_token("some-refresh-token");
        let h2 = AuthRepository::hash_token("some-refresh-token");
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64); // hex-encoded SHA-256
    }

    #[test]
    fn test_hash_token_differs_per_input() {
        let h1 = AuthRepository::hash_token("token-a");
        let h2 = AuthRepository::hash_token("token-b");
        assert_ne!(h1, h2);
    }
}
