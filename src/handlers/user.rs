//! 用户管理的 HTTP 处理器（管理员）

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    auth::middleware::AuthContext, error::AppError, handlers::article::PageQuery,
    middleware::AppState, models::auth::ChangePasswordRequest, models::user::UpdateRoleRequest,
    services::audit_service::AuditAction,
};

/// 用户列表
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Query(page): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (limit, offset) = page.bounds();
    let (users, total) = state.user_service.list(&auth_context, limit, offset).await?;

    Ok(Json(json!({
        "users": users,
        "total": total,
    })))
}

/// 修改用户角色
pub async fn update_role(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateRoleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .user_service
        .update_role(&auth_context, id, req.role)
        .await?;

    Ok(Json(user))
}

/// 修改当前用户密码
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    let revoked = state
        .auth_service
        .change_password(auth_context.user_id, req)
        .await?;

    // 审计日志
    state
        .audit_service
        .log_action_simple(
            auth_context.user_id,
            AuditAction::UserPasswordChange,
            Some("user"),
            Some(auth_context.user_id),
            Some(&format!("Password changed, {} sessions revoked", revoked)),
            None,
        )
        .await;

    Ok(Json(json!({"message": "密码已更新，请重新登录"})))
}
