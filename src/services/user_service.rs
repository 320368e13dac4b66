//! 用户管理服务（管理员操作）

use sqlx::PgPool;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::middleware::AuthContext;
use crate::error::AppError;
use crate::models::user::{UserResponse, UserRole};
use crate::repository::user_repo::UserRepository;
use crate::services::audit_service::{AuditAction, AuditService};

pub struct UserService {
    db: PgPool,
    audit_service: Arc<AuditService>,
}

impl UserService {
    pub fn new(db: PgPool, audit_service: Arc<AuditService>) -> Self {
        Self { db, audit_service }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        ctx: &AuthContext,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<UserResponse>, i64), AppError> {
        if !ctx.role.is_admin() {
            return Err(AppError::Forbidden);
        }

        let repo = UserRepository::new(self.db.clone());
        let users = repo.list(limit, offset).await?;
        let total = repo.count().await?;

        Ok((users.into_iter().map(UserResponse::from).collect(), total))
    }

    /// 修改用户角色
    ///
    /// super_admin 角色只能由 super_admin 授予或回收。
    #[instrument(skip(self))]
    pub async fn update_role(
        &self,
        ctx: &AuthContext,
        user_id: Uuid,
        new_role: UserRole,
    ) -> Result<UserResponse, AppError> {
        if !ctx.role.is_admin() {
            return Err(AppError::Forbidden);
        }

        if new_role == UserRole::SuperAdmin && ctx.role != UserRole::SuperAdmin {
            return Err(AppError::Forbidden);
        }

        let repo = UserRepository::new(self.db.clone());

        let existing = repo.find_by_id(&user_id).await?.ok_or(AppError::NotFound)?;
        if existing.role == UserRole::SuperAdmin && ctx.role != UserRole::SuperAdmin {
            return Err(AppError::Forbidden);
        }

        let user = repo
            .update_role(user_id, new_role)
            .await?
            .ok_or(AppError::NotFound)?;

        info!(
            user_id = %user_id,
            from = existing.role.as_str(),
            to = new_role.as_str(),
            "User role updated"
        );

        self.audit_service
            .log_action_simple(
                ctx.user_id,
                AuditAction::UserRoleUpdate,
                Some("users"),
                Some(user_id),
                Some(&format!(
                    "Role changed from {} to {}",
                    existing.role.as_str(),
                    new_role.as_str()
                )),
                None,
            )
            .await;

        Ok(UserResponse::from(user))
    }
}
