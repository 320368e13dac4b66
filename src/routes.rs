//! 路由注册
//! 创建所有 API 路由并应用中间件

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer,
};

use crate::{handlers, middleware::AppState};

/// 请求体大小上限（审批备注与驳回理由都远小于此值）
const MAX_BODY_BYTES: usize = 256 * 1024;

/// 创建应用路由
///
/// 服务实例在 main.rs 中构建并通过 AppState 注入。
pub fn create_router(state: Arc<AppState>) -> Router {
    // 公开端点（健康检查）
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check));

    // 认证路由（无需认证）
    let auth_routes = Router::new()
        .route("/api/v1/auth/login", post(handlers::auth::login))
        .route("/api/v1/auth/refresh", post(handlers::auth::refresh_token));

    // 需要认证的路由
    let authenticated_routes = Router::new()
        // 当前用户信息
        .route("/api/v1/auth/me", get(handlers::auth::get_current_user))
        .route("/api/v1/auth/logout", post(handlers::auth::logout))
        .route("/api/v1/auth/logout-all", post(handlers::auth::logout_all))

        // 审批工作流
        .route("/api/v1/approvals/queue", get(handlers::approval::queue))
        .route(
            "/api/v1/approvals/statistics",
            get(handlers::approval::statistics),
        )
        .route(
            "/api/v1/articles/{id}/approval-history",
            get(handlers::approval::history),
        )
        .route(
            "/api/v1/articles/{id}/approve",
            post(handlers::approval::approve),
        )
        .route(
            "/api/v1/articles/{id}/reject",
            post(handlers::approval::reject),
        )
        .route(
            "/api/v1/articles/{id}/release",
            post(handlers::approval::release),
        )
        .route(
            "/api/v1/articles/{id}/reset",
            post(handlers::approval::reset),
        )

        // 文章浏览
        .route("/api/v1/articles", get(handlers::article::list))
        .route("/api/v1/articles/{id}", get(handlers::article::get))

        // 收藏与阅读历史
        .route(
            "/api/v1/articles/{id}/bookmark",
            post(handlers::article::bookmark).delete(handlers::article::remove_bookmark),
        )
        .route("/api/v1/bookmarks", get(handlers::article::list_bookmarks))
        .route(
            "/api/v1/articles/{id}/read",
            post(handlers::article::record_read),
        )
        .route(
            "/api/v1/reading-history",
            get(handlers::article::reading_history),
        )

        // Newsletter 配置管理
        .route(
            "/api/v1/newsletter/configs",
            get(handlers::newsletter::list).post(handlers::newsletter::create),
        )
        .route(
            "/api/v1/newsletter/configs/{id}",
            get(handlers::newsletter::get)
                .put(handlers::newsletter::update)
                .delete(handlers::newsletter::delete),
        )

        // 用户管理
        .route("/api/v1/users", get(handlers::user::list_users))
        .route("/api/v1/users/{id}/role", put(handlers::user::update_role))
        .route(
            "/api/v1/users/me/password",
            put(handlers::user::change_password),
        )

        // 审计日志
        .route("/api/v1/audit/logs", get(handlers::audit::list_audit_logs))
        .layer(axum::middleware::from_fn_with_state(
            state.jwt_service.clone(),
            crate::auth::middleware::jwt_auth_middleware,
        ));

    // 指标端点
    let metrics_routes = Router::new().route("/metrics", get(handlers::metrics::metrics_export));

    // 组合所有路由
    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(authenticated_routes)
        .merge(metrics_routes)
        .layer(axum::middleware::from_fn(crate::middleware::request_tracking_middleware))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}
