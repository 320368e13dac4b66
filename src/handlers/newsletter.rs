//! Newsletter 配置管理的 HTTP 处理器

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
    handlers::article::PageQuery,
    middleware::AppState,
    models::newsletter::{CreateNewsletterConfigRequest, UpdateNewsletterConfigRequest},
};

/// 创建配置
pub async fn create(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Json(req): Json<CreateNewsletterConfigRequest>,
) -> Result<impl IntoResponse, AppError> {
    let config = state.newsletter_service.create(&auth_context, req).await?;
    Ok((axum::http::StatusCode::CREATED, Json(config)))
}

/// 配置详情
pub async fn get(
    State(state): State<Arc<AppState>>,
    _auth_context: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let config = state.newsletter_service.get(id).await?;
    Ok(Json(config))
}

/// 配置列表
pub async fn list(
    State(state): State<Arc<AppState>>,
    _auth_context: AuthContext,
    Query(page): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (limit, offset) = page.bounds();
    let configs = state.newsletter_service.list(limit, offset).await?;
    Ok(Json(json!({ "configs": configs })))
}

/// 更新配置
pub async fn update(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateNewsletterConfigRequest>,
) -> Result<impl IntoResponse, AppError> {
    let config = state
        .newsletter_service
        .update(&auth_context, id, req)
        .await?;
    Ok(Json(config))
}

/// 删除配置
pub async fn delete(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.newsletter_service.delete(&auth_context, id).await?;
    Ok(Json(json!({"message": "配置已删除"})))
}
