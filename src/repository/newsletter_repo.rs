//! Newsletter 配置数据访问

use crate::{
    error::AppError,
    models::newsletter::{CreateNewsletterConfigRequest, NewsletterConfig, UpdateNewsletterConfigRequest},
};
use sqlx::PgPool;
use uuid::Uuid;

pub struct NewsletterRepository {
    db: PgPool,
}

impl NewsletterRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        req: &CreateNewsletterConfigRequest,
        created_by: Uuid,
    ) -> Result<NewsletterConfig, AppError> {
        let config = sqlx::query_as::<_, NewsletterConfig>(
            r#"
            INSERT INTO newsletter_configs (
                id, name, description, cadence, send_day_of_week, timezone,
                max_blocks, education_ratio_min, content_freshness_days,
                approval_tier, risk_level, is_active, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, TRUE, $12)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&req.name)
        .bind(&req.description)
        .bind(req.cadence)
        .bind(req.send_day_of_week)
        .bind(&req.timezone)
        .bind(req.max_blocks)
        .bind(req.education_ratio_min)
        .bind(req.content_freshness_days)
        .bind(req.approval_tier)
        .bind(req.risk_level)
        .bind(created_by)
        .fetch_one(&self.db)
        .await?;

        Ok(config)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<NewsletterConfig>, AppError> {
        let config = sqlx::query_as::<_, NewsletterConfig>(
            "SELECT * FROM newsletter_configs WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(config)
    }

    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<NewsletterConfig>, AppError> {
        let configs = sqlx::query_as::<_, NewsletterConfig>(
            "SELECT * FROM newsletter_configs ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        Ok(configs)
    }

    /// 部分更新，未提供的字段保持原值
    pub async fn update(
        &self,
        id: Uuid,
        req: &UpdateNewsletterConfigRequest,
    ) -> Result<Option<NewsletterConfig>, AppError> {
        let config = sqlx::query_as::<_, NewsletterConfig>(
            r#"
            UPDATE newsletter_configs
            SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                cadence = COALESCE($4, cadence),
                send_day_of_week = COALESCE($5, send_day_of_week),
                timezone = COALESCE($6, timezone),
                max_blocks = COALESCE($7, max_blocks),
                education_ratio_min = COALESCE($8, education_ratio_min),
                content_freshness_days = COALESCE($9, content_freshness_days),
                approval_tier = COALESCE($10, approval_tier),
                risk_level = COALESCE($11, risk_level),
                is_active = COALESCE($12, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&req.name)
        .bind(&req.description)
        .bind(req.cadence)
        .bind(req.send_day_of_week)
        .bind(&req.timezone)
        .bind(req.max_blocks)
        .bind(req.education_ratio_min)
        .bind(req.content_freshness_days)
        .bind(req.approval_tier)
        .bind(req.risk_level)
        .bind(req.is_active)
        .fetch_optional(&self.db)
        .await?;

        Ok(config)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM newsletter_configs WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
