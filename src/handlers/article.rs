//! 文章浏览与互动的 HTTP 处理器

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    auth::middleware::AuthContext, error::AppError, middleware::AppState,
    models::article::ArticleQuery,
};

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PageQuery {
    pub(crate) fn bounds(&self) -> (i64, i64) {
        let limit = self.limit.unwrap_or(20).clamp(1, 100);
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}

/// 文章列表
pub async fn list(
    State(state): State<Arc<AppState>>,
    _auth_context: AuthContext,
    Query(query): Query<ArticleQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (articles, pagination) = state.article_service.list(&query).await?;

    Ok(Json(json!({
        "articles": articles,
        "pagination": pagination,
    })))
}

/// 文章详情
pub async fn get(
    State(state): State<Arc<AppState>>,
    _auth_context: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let article = state.article_service.get(id).await?;
    Ok(Json(article))
}

/// 收藏
pub async fn bookmark(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.article_service.bookmark(auth_context.user_id, id).await?;
    Ok(Json(json!({"message": "已收藏"})))
}

/// 取消收藏
pub async fn remove_bookmark(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state
        .article_service
        .remove_bookmark(auth_context.user_id, id)
        .await?;
    Ok(Json(json!({"message": "已取消收藏"})))
}

/// 收藏列表
pub async fn list_bookmarks(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Query(page): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (limit, offset) = page.bounds();
    let items = state
        .article_service
        .bookmarks(auth_context.user_id, limit, offset)
        .await?;

    Ok(Json(json!({ "bookmarks": items })))
}

/// 记录阅读
pub async fn record_read(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state
        .article_service
        .record_read(auth_context.user_id, id)
        .await?;
    Ok(Json(json!({"message": "已记录"})))
}

/// 阅读历史
pub async fn reading_history(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Query(page): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (limit, offset) = page.bounds();
    let items = state
        .article_service
        .reading_history(auth_context.user_id, limit, offset)
        .await?;

    Ok(Json(json!({ "history": items })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_query_bounds() {
        let page = PageQuery { limit: None, offset: None };
        assert_eq!(page.bounds(), (20, 0));

        let page = PageQuery { limit: Some(500), offset: Some(-5) };
        assert_eq!(page.bounds(), (100, 0));
    }
}
