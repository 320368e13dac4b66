//! 审计日志查询的 HTTP 处理器（管理员）

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::{
    auth::middleware::AuthContext, error::AppError, middleware::AppState,
    models::audit::AuditLogFilters,
};

#[derive(Debug, Deserialize)]
pub struct AuditLogQuery {
    #[serde(flatten)]
    pub filters: AuditLogFilters,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// 审计日志列表
pub async fn list_audit_logs(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Query(query): Query<AuditLogQuery>,
) -> Result<impl IntoResponse, AppError> {
    if !auth_context.role.is_admin() {
        return Err(AppError::Forbidden);
    }

    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let offset = query.offset.unwrap_or(0).max(0);

    let logs = state
        .audit_service
        .query_logs(&query.filters, limit, offset)
        .await?;
    let total = state.audit_service.count_logs(&query.filters).await?;

    Ok(Json(json!({
        "logs": logs,
        "total": total,
        "limit": limit,
        "offset": offset,
    })))
}
