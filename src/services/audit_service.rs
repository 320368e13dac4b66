//! 审计日志服务

use crate::{error::AppError, models::audit::*, repository::audit_repo::AuditRepository};
use sqlx::PgPool;
use uuid::Uuid;

/// 审计操作类型
#[derive(Debug, Clone, Copy)]
pub enum AuditAction {
    // 用户相关
    UserLogin,
    UserLogout,
    UserRoleUpdate,
    UserPasswordChange,

    // 审批流相关
    ArticleApprove,
    ArticleReject,
    ArticleRelease,
    ArticleReset,

    // Newsletter 配置相关
    NewsletterConfigCreate,
    NewsletterConfigUpdate,
    NewsletterConfigDelete,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::UserLogin => "user.login",
            AuditAction::UserLogout => "user.logout",
            AuditAction::UserRoleUpdate => "user.role_update",
            AuditAction::UserPasswordChange => "user.password_change",

            AuditAction::ArticleApprove => "article.approve",
            AuditAction::ArticleReject => "article.reject",
            AuditAction::ArticleRelease => "article.release",
            AuditAction::ArticleReset => "article.reset",

            AuditAction::NewsletterConfigCreate => "newsletter_config.create",
            AuditAction::NewsletterConfigUpdate => "newsletter_config.update",
            AuditAction::NewsletterConfigDelete => "newsletter_config.delete",
        }
    }
}

pub struct AuditService {
    db: PgPool,
}

impl AuditService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// 记录审计日志条目
    pub async fn log_action(&self, log: AuditLog) -> Result<(), AppError> {
        let repo = AuditRepository::new(self.db.clone());
        repo.insert_audit_log(&log).await?;

        Ok(())
    }

    /// 简化记录入口。审计失败只告警，不破坏业务请求流程
    pub async fn log_action_simple(
        &self,
        subject_id: Uuid,
        action: AuditAction,
        resource_type: Option<&str>,
        resource_id: Option<Uuid>,
        changes_summary: Option<&str>,
        error_message: Option<&str>,
    ) {
        let log = AuditLog {
            id: Uuid::new_v4(),
            subject_id,
            subject_type: "user".to_string(),
            action: action.as_str().to_string(),
            resource_type: resource_type.unwrap_or("unknown").to_string(),
            resource_id,
            changes_summary: changes_summary.map(|s| s.to_string()),
            source_ip: None,
            trace_id: None,
            result: if error_message.is_some() { "failure" } else { "success" }.to_string(),
            error_message: error_message.map(|s| s.to_string()),
            occurred_at: chrono::Utc::now(),
        };

        if let Err(e) = self.log_action(log).await {
            tracing::warn!(error = %e, action = action.as_str(), "Failed to write audit log");
        }
    }

    /// 查询审计日志
    pub async fn query_logs(
        &self,
        filters: &AuditLogFilters,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AuditLog>, AppError> {
        let repo = AuditRepository::new(self.db.clone());
        repo.query_audit_logs(filters, limit, offset).await
    }

    /// 查询审计日志数量
    pub async fn count_logs(&self, filters: &AuditLogFilters) -> Result<i64, AppError> {
        let repo = AuditRepository::new(self.db.clone());
        repo.count_audit_logs(filters).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_action_names() {
        assert_eq!(AuditAction::ArticleApprove.as_str(), "article.approve");
        assert_eq!(AuditAction::ArticleReset.as_str(), "article.reset");
        assert_eq!(AuditAction::NewsletterConfigDelete.as_str(), "newsletter_config.delete");
    }
}
