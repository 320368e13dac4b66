//! 收藏与阅读历史数据访问

use crate::{error::AppError, models::engagement::*};
use sqlx::PgPool;
use uuid::Uuid;

pub struct EngagementRepository {
    db: PgPool,
}

impl EngagementRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// 添加收藏（重复收藏幂等）
    pub async fn add_bookmark(&self, user_id: Uuid, article_id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO bookmarks (id, user_id, article_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, article_id) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(article_id)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    pub async fn remove_bookmark(&self, user_id: Uuid, article_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "DELETE FROM bookmarks WHERE user_id = $1 AND article_id = $2"
        )
        .bind(user_id)
        .bind(article_id)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list_bookmarks(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<EngagementListItem>, AppError> {
        let items = sqlx::query_as::<_, EngagementListItem>(
            r#"
            SELECT b.article_id, a.title, a.slug, a.severity, b.created_at AS occurred_at
            FROM bookmarks b
            JOIN articles a ON b.article_id = a.id
            WHERE b.user_id = $1
            ORDER BY b.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        Ok(items)
    }

    /// 记录一次阅读
    pub async fn record_read(&self, user_id: Uuid, article_id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO reading_history (id, user_id, article_id) VALUES ($1, $2, $3)"
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(article_id)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// 阅读历史，同一篇文章只保留最近一次
    pub async fn list_reading_history(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<EngagementListItem>, AppError> {
        let items = sqlx::query_as::<_, EngagementListItem>(
            r#"
            SELECT h.article_id, a.title, a.slug, a.severity, h.read_at AS occurred_at
            FROM (
                SELECT DISTINCT ON (article_id) article_id, read_at
                FROM reading_history
                WHERE user_id = $1
                ORDER BY article_id, read_at DESC
            ) h
            JOIN articles a ON h.article_id = a.id
            ORDER BY h.read_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        Ok(items)
    }
}
