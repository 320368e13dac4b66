//! User repository (数据库访问层)

use crate::{error::AppError, models::user::*};
use sqlx::{PgPool, Row};
use uuid::Uuid;

pub struct UserRepository {
    db: PgPool,
}

impl UserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// 根据邮箱查找用户
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE email = $1"
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    /// 根据 ID 查找用户
    pub async fn find_by_id(&self, id: &Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    /// 更新用户角色
    pub async fn update_role(&self, id: Uuid, role: UserRole) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET role = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#
        )
        .bind(id)
        .bind(role)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    /// 更新密码哈希
    pub async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE users
            SET
                password_hash = $2,
                password_changed_at = NOW(),
                updated_at = NOW()
            WHERE id = $1
            "#
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// 增加失败登录次数
    pub async fn increment_failed_attempts(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE users
            SET
                failed_login_attempts = failed_login_attempts + 1,
                last_failed_login_at = NOW(),
                updated_at = NOW()
            WHERE id = $1
            "#
        )
        .bind(id)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// 重置失败登录次数
    pub async fn reset_failed_attempts(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE users
            SET
                failed_login_attempts = 0,
                last_failed_login_at = NULL,
                locked_until = NULL,
                updated_at = NOW()
            WHERE id = $1
            "#
        )
        .bind(id)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// 临时锁定账户
    pub async fn lock_account(&self, id: Uuid, locked_until: chrono::DateTime<chrono::Utc>) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE users
            SET locked_until = $2, updated_at = NOW()
            WHERE id = $1
            "#
        )
        .bind(id)
        .bind(locked_until)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// 列出所有用户
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        Ok(users)
    }

    /// 统计用户数量
    pub async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query("SELECT COUNT(*) FROM users")
            .fetch_one(&self.db)
            .await?
            .get(0);

        Ok(count)
    }
}
