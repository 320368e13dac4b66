//! 审批流 HTTP 处理器

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    auth::middleware::AuthContext,
    error::AppError,
    middleware::AppState,
    models::approval::{ApproveArticleRequest, RejectArticleRequest},
    models::article::ArticleQuery,
};

/// 审批队列
pub async fn queue(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Query(query): Query<ArticleQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (articles, pagination, meta) = state
        .approval_service
        .queue(&auth_context, &query)
        .await?;

    Ok(Json(json!({
        "articles": articles,
        "pagination": pagination,
        "queue": meta,
    })))
}

/// 审批历史与进度
pub async fn history(
    State(state): State<Arc<AppState>>,
    _auth_context: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let history = state.approval_service.history(id).await?;
    Ok(Json(history))
}

/// 批准当前门禁
pub async fn approve(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(id): Path<Uuid>,
    Json(req): Json<ApproveArticleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let history = state
        .approval_service
        .approve(id, &auth_context, req)
        .await?;

    Ok(Json(history))
}

/// 驳回
pub async fn reject(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(id): Path<Uuid>,
    Json(req): Json<RejectArticleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let history = state
        .approval_service
        .reject(id, &auth_context, req)
        .await?;

    Ok(Json(history))
}

/// 发布
pub async fn release(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let history = state.approval_service.release(id, &auth_context).await?;
    Ok(Json(history))
}

/// 重置（管理员）
pub async fn reset(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let history = state.approval_service.reset(id, &auth_context).await?;
    Ok(Json(history))
}

/// 按状态统计
pub async fn statistics(
    State(state): State<Arc<AppState>>,
    _auth_context: AuthContext,
) -> Result<impl IntoResponse, AppError> {
    let counts = state.approval_service.statistics().await?;
    Ok(Json(json!({ "by_status": counts })))
}
