//! 审批流服务
//! 文章逐级门禁推进、驳回、发布与重置，全部在事务内完成

use sqlx::{PgPool, Row};
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthContext;
use crate::error::AppError;
use crate::models::approval::*;
use crate::models::article::{Article, ArticleQuery, Pagination};
use crate::services::audit_service::{AuditAction, AuditService};

pub struct ApprovalService {
    db: PgPool,
    audit_service: Arc<AuditService>,
}

impl ApprovalService {
    pub fn new(db: PgPool, audit_service: Arc<AuditService>) -> Self {
        Self { db, audit_service }
    }

    /// 审批队列：审阅角色看到自己门禁的待审文章，管理员看到全部待审
    #[instrument(skip(self, query))]
    pub async fn queue(
        &self,
        ctx: &AuthContext,
        query: &ArticleQuery,
    ) -> Result<(Vec<Article>, Pagination, QueueMeta), AppError> {
        let target_gate = ctx.role.target_gate();

        // 无审批权限的角色没有队列
        if target_gate.is_none() && !ctx.role.is_admin() {
            return Err(AppError::Forbidden);
        }

        let (page, page_size) = query.pagination()?;

        let mut where_clause = String::from("a.rejected = false");
        let mut index = 0;

        if target_gate.is_some() {
            index += 1;
            where_clause.push_str(&format!(" AND a.approval_status = ${}", index));
        } else {
            where_clause.push_str(
                " AND a.approval_status IN ('pending_marketing', 'pending_branding', \
                 'pending_soc_l1', 'pending_soc_l3', 'pending_ciso')",
            );
        }

        if query.severity.is_some() {
            index += 1;
            where_clause.push_str(&format!(" AND a.severity = ${}", index));
        }
        if query.category_id.is_some() {
            index += 1;
            where_clause.push_str(&format!(" AND a.category_id = ${}", index));
        }
        if query.date_from.is_some() {
            index += 1;
            where_clause.push_str(&format!(" AND a.created_at >= ${}", index));
        }
        if query.date_to.is_some() {
            index += 1;
            where_clause.push_str(&format!(" AND a.created_at <= ${}", index));
        }

        let list_sql = format!(
            r#"
            SELECT a.* FROM articles a
            LEFT JOIN categories c ON a.category_id = c.id
            WHERE {}
            ORDER BY {}
            LIMIT ${} OFFSET ${}
            "#,
            where_clause,
            query.order_clause(),
            index + 1,
            index + 2,
        );
        let count_sql = format!(
            "SELECT COUNT(*) FROM articles a LEFT JOIN categories c ON a.category_id = c.id WHERE {}",
            where_clause
        );

        let mut list_query = sqlx::query_as::<_, Article>(&list_sql);
        let mut count_query = sqlx::query(&count_sql);

        if let Some(gate) = target_gate {
            let status = gate.pending_status();
            list_query = list_query.bind(status);
            count_query = count_query.bind(status);
        }
        if let Some(severity) = query.severity {
            list_query = list_query.bind(severity);
            count_query = count_query.bind(severity);
        }
        if let Some(category_id) = query.category_id {
            list_query = list_query.bind(category_id);
            count_query = count_query.bind(category_id);
        }
        if let Some(date_from) = query.date_from {
            list_query = list_query.bind(date_from);
            count_query = count_query.bind(date_from);
        }
        if let Some(date_to) = query.date_to {
            list_query = list_query.bind(date_to);
            count_query = count_query.bind(date_to);
        }

        let articles = list_query
            .bind(page_size as i64)
            .bind(ArticleQuery::offset(page, page_size))
            .fetch_all(&self.db)
            .await?;

        let total: i64 = count_query.fetch_one(&self.db).await?.get(0);

        let meta = QueueMeta {
            role: ctx.role,
            target_gate,
            total_pending: total,
        };

        Ok((articles, Pagination::new(page, page_size, total), meta))
    }

    /// 审批历史与派生进度
    #[instrument(skip(self))]
    pub async fn history(&self, article_id: Uuid) -> Result<ApprovalHistoryResponse, AppError> {
        let article = self.find_article(article_id).await?;
        let approvals = self.list_approvals(article_id).await?;

        let progress = ApprovalProgress::build(article.approval_status, &approvals);
        let progress_percentage = progress.percentage();

        let rejection = match (&article.rejection_reason, article.rejected_by, article.rejected_at)
        {
            (Some(reason), Some(rejected_by), Some(rejected_at)) => Some(RejectionDetails {
                reason: reason.clone(),
                rejected_by,
                rejector_name: self.lookup_user_name(rejected_by).await?,
                rejected_at,
            }),
            _ => None,
        };

        let release = match (article.released_by, article.released_at) {
            (Some(released_by), Some(released_at)) => Some(ReleaseDetails {
                released_by,
                releaser_name: self.lookup_user_name(released_by).await?,
                released_at,
            }),
            _ => None,
        };

        Ok(ApprovalHistoryResponse {
            article_id,
            approval_status: article.approval_status,
            approvals,
            progress,
            progress_percentage,
            rejection,
            release,
        })
    }

    /// 批准当前门禁，推进文章状态
    #[instrument(skip(self, req))]
    pub async fn approve(
        &self,
        article_id: Uuid,
        ctx: &AuthContext,
        req: ApproveArticleRequest,
    ) -> Result<ApprovalHistoryResponse, AppError> {
        req.validate()?;

        let mut tx = self.db.begin().await?;

        let article = sqlx::query_as::<_, Article>(
            "SELECT * FROM articles WHERE id = $1 FOR UPDATE",
        )
        .bind(article_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound)?;

        // 授权以文章当前状态对应的门禁为准
        let gate = article
            .approval_status
            .required_gate()
            .ok_or_else(|| {
                AppError::BadRequest(format!(
                    "Article is not awaiting approval (status: {})",
                    article.approval_status.as_str()
                ))
            })?;

        if !ctx.role.can_approve_gate(gate) {
            return Err(AppError::Forbidden);
        }

        let next_status = article
            .approval_status
            .next_on_approve()
            .ok_or(AppError::Internal)?;

        sqlx::query(
            r#"
            INSERT INTO article_approvals (id, article_id, gate, approved_by, approved_at, notes)
            VALUES ($1, $2, $3, $4, NOW(), $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(article_id)
        .bind(gate)
        .bind(ctx.user_id)
        .bind(&req.notes)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE articles SET approval_status = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(next_status)
        .bind(article_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            article_id = %article_id,
            gate = gate.as_str(),
            next_status = next_status.as_str(),
            "Article approved at gate"
        );

        // 审计在提交后记录，失败不回滚业务操作
        self.audit_service
            .log_action_simple(
                ctx.user_id,
                AuditAction::ArticleApprove,
                Some("articles"),
                Some(article_id),
                Some(&format!("Approved at gate {}", gate.as_str())),
                None,
            )
            .await;

        self.history(article_id).await
    }

    /// 驳回待审文章，理由必填且原文保存
    #[instrument(skip(self, req))]
    pub async fn reject(
        &self,
        article_id: Uuid,
        ctx: &AuthContext,
        req: RejectArticleRequest,
    ) -> Result<ApprovalHistoryResponse, AppError> {
        // 校验在任何状态变更之前
        req.validate()?;

        let mut tx = self.db.begin().await?;

        let article = sqlx::query_as::<_, Article>(
            "SELECT * FROM articles WHERE id = $1 FOR UPDATE",
        )
        .bind(article_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound)?;

        let gate = article
            .approval_status
            .required_gate()
            .ok_or_else(|| {
                AppError::BadRequest(format!(
                    "Article cannot be rejected (status: {})",
                    article.approval_status.as_str()
                ))
            })?;

        if !ctx.role.can_approve_gate(gate) {
            return Err(AppError::Forbidden);
        }

        sqlx::query(
            r#"
            UPDATE articles
            SET
                approval_status = 'rejected',
                rejected = true,
                rejection_reason = $1,
                rejected_by = $2,
                rejected_at = NOW(),
                updated_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(&req.reason)
        .bind(ctx.user_id)
        .bind(article_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(article_id = %article_id, gate = gate.as_str(), "Article rejected");

        self.audit_service
            .log_action_simple(
                ctx.user_id,
                AuditAction::ArticleReject,
                Some("articles"),
                Some(article_id),
                Some(&format!("Rejected at gate {}", gate.as_str())),
                None,
            )
            .await;

        self.history(article_id).await
    }

    /// 发布已通过全部门禁的文章
    ///
    /// UPDATE 谓词限定 approval_status = 'approved'，并发重复发布
    /// 只会有一次生效。
    #[instrument(skip(self))]
    pub async fn release(
        &self,
        article_id: Uuid,
        ctx: &AuthContext,
    ) -> Result<ApprovalHistoryResponse, AppError> {
        if !ctx.role.can_release() {
            return Err(AppError::Forbidden);
        }

        let result = sqlx::query(
            r#"
            UPDATE articles
            SET
                approval_status = 'released',
                released_by = $1,
                released_at = NOW(),
                is_published = true,
                published_at = NOW(),
                updated_at = NOW()
            WHERE id = $2 AND approval_status = 'approved'
            "#,
        )
        .bind(ctx.user_id)
        .bind(article_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            // 区分不存在与状态不符
            let exists = self.find_article(article_id).await;
            return match exists {
                Ok(article) => Err(AppError::BadRequest(format!(
                    "Article is not ready for release (status: {})",
                    article.approval_status.as_str()
                ))),
                Err(e) => Err(e),
            };
        }

        info!(article_id = %article_id, "Article released");

        self.audit_service
            .log_action_simple(
                ctx.user_id,
                AuditAction::ArticleRelease,
                Some("articles"),
                Some(article_id),
                Some("Article released to the public"),
                None,
            )
            .await;

        self.history(article_id).await
    }

    /// 管理员将已驳回文章重置回流程起点
    #[instrument(skip(self))]
    pub async fn reset(
        &self,
        article_id: Uuid,
        ctx: &AuthContext,
    ) -> Result<ApprovalHistoryResponse, AppError> {
        if !ctx.role.can_reset() {
            return Err(AppError::Forbidden);
        }

        let mut tx = self.db.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE articles
            SET
                approval_status = 'pending_marketing',
                rejected = false,
                rejection_reason = NULL,
                rejected_by = NULL,
                rejected_at = NULL,
                updated_at = NOW()
            WHERE id = $1 AND rejected = true
            "#,
        )
        .bind(article_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await.ok();
            let article = self.find_article(article_id).await?;
            return Err(AppError::BadRequest(format!(
                "Article is not in rejected status (status: {})",
                article.approval_status.as_str()
            )));
        }

        // 历史门禁记录一并清空，流程从头开始
        sqlx::query("DELETE FROM article_approvals WHERE article_id = $1")
            .bind(article_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(article_id = %article_id, "Article approval workflow reset");

        self.audit_service
            .log_action_simple(
                ctx.user_id,
                AuditAction::ArticleReset,
                Some("articles"),
                Some(article_id),
                Some("Approval workflow reset to pending_marketing"),
                None,
            )
            .await;

        self.history(article_id).await
    }

    /// 按状态统计（不含已驳回的脏计数）
    #[instrument(skip(self))]
    pub async fn statistics(&self) -> Result<Vec<StatusCount>, AppError> {
        let counts = sqlx::query_as::<_, StatusCount>(
            r#"
            SELECT approval_status AS status, COUNT(*) AS count
            FROM articles
            GROUP BY approval_status
            ORDER BY approval_status
            "#,
        )
        .fetch_all(&self.db)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to compute approval statistics");
            AppError::Database(e)
        })?;

        Ok(counts)
    }

    async fn find_article(&self, article_id: Uuid) -> Result<Article, AppError> {
        sqlx::query_as::<_, Article>("SELECT * FROM articles WHERE id = $1")
            .bind(article_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// 审批记录按时间升序，联查审批人姓名与邮箱
    async fn list_approvals(&self, article_id: Uuid) -> Result<Vec<ArticleApproval>, AppError> {
        let approvals = sqlx::query_as::<_, ArticleApproval>(
            r#"
            SELECT
                aa.id, aa.article_id, aa.gate, aa.approved_by, aa.approved_at, aa.notes,
                u.name AS approver_name, u.email AS approver_email
            FROM article_approvals aa
            JOIN users u ON aa.approved_by = u.id
            WHERE aa.article_id = $1
            ORDER BY aa.approved_at ASC
            "#,
        )
        .bind(article_id)
        .fetch_all(&self.db)
        .await?;

        Ok(approvals)
    }

    async fn lookup_user_name(&self, user_id: Uuid) -> Result<Option<String>, AppError> {
        let name: Option<String> = sqlx::query("SELECT name FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?
            .map(|row| row.get(0));

        Ok(name)
    }
}
