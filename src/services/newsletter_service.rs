//! Newsletter 配置服务

use sqlx::PgPool;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthContext;
use crate::error::AppError;
use crate::models::newsletter::*;
use crate::repository::newsletter_repo::NewsletterRepository;
use crate::services::audit_service::{AuditAction, AuditService};

pub struct NewsletterService {
    db: PgPool,
    audit_service: Arc<AuditService>,
}

impl NewsletterService {
    pub fn new(db: PgPool, audit_service: Arc<AuditService>) -> Self {
        Self { db, audit_service }
    }

    /// 配置管理仅限管理员
    fn require_admin(ctx: &AuthContext) -> Result<(), AppError> {
        if !ctx.role.is_admin() {
            return Err(AppError::Forbidden);
        }
        Ok(())
    }

    #[instrument(skip(self, req))]
    pub async fn create(
        &self,
        ctx: &AuthContext,
        req: CreateNewsletterConfigRequest,
    ) -> Result<NewsletterConfig, AppError> {
        Self::require_admin(ctx)?;
        req.validate()?;

        let repo = NewsletterRepository::new(self.db.clone());
        let config = repo.create(&req, ctx.user_id).await?;

        info!(config_id = %config.id, name = %config.name, "Newsletter config created");

        self.audit_service
            .log_action_simple(
                ctx.user_id,
                AuditAction::NewsletterConfigCreate,
                Some("newsletter_configs"),
                Some(config.id),
                Some(&format!("Created config '{}'", config.name)),
                None,
            )
            .await;

        Ok(config)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<NewsletterConfig, AppError> {
        let repo = NewsletterRepository::new(self.db.clone());
        repo.find_by_id(id).await?.ok_or(AppError::NotFound)
    }

    #[instrument(skip(self))]
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<NewsletterConfig>, AppError> {
        let repo = NewsletterRepository::new(self.db.clone());
        repo.list(limit, offset).await
    }

    #[instrument(skip(self, req))]
    pub async fn update(
        &self,
        ctx: &AuthContext,
        id: Uuid,
        req: UpdateNewsletterConfigRequest,
    ) -> Result<NewsletterConfig, AppError> {
        Self::require_admin(ctx)?;
        req.validate()?;

        let repo = NewsletterRepository::new(self.db.clone());
        let config = repo.update(id, &req).await?.ok_or(AppError::NotFound)?;

        self.audit_service
            .log_action_simple(
                ctx.user_id,
                AuditAction::NewsletterConfigUpdate,
                Some("newsletter_configs"),
                Some(id),
                Some(&format!("Updated config '{}'", config.name)),
                None,
            )
            .await;

        Ok(config)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, ctx: &AuthContext, id: Uuid) -> Result<(), AppError> {
        Self::require_admin(ctx)?;

        let repo = NewsletterRepository::new(self.db.clone());
        if !repo.delete(id).await? {
            return Err(AppError::NotFound);
        }

        self.audit_service
            .log_action_simple(
                ctx.user_id,
                AuditAction::NewsletterConfigDelete,
                Some("newsletter_configs"),
                Some(id),
                None,
                None,
            )
            .await;

        Ok(())
    }
}
