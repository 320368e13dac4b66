//! 认证相关的 HTTP 处理器

use crate::{
    auth::middleware::AuthContext, error::AppError, middleware::AppState, models::auth::*,
    services::audit_service::AuditAction,
};
use axum::{
    extract::{ConnectInfo, State},
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;

/// 登录
pub async fn login(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let client_ip = resolve_client_ip(&headers, peer, state.config.security.trust_proxy);
    let user_agent = headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    let response = state
        .auth_service
        .login(req, &client_ip, user_agent.as_deref())
        .await?;

    Ok(Json(response))
}

/// 刷新令牌
pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(req): Json<RefreshTokenRequest>,
) -> Result<impl IntoResponse, AppError> {
    let client_ip = resolve_client_ip(&headers, peer, state.config.security.trust_proxy);

    let token_pair = state.auth_service.refresh_token(req, &client_ip).await?;

    Ok(Json(token_pair))
}

/// 登出
pub async fn logout(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Json(req): Json<LogoutRequest>,
) -> Result<impl IntoResponse, AppError> {
    state
        .auth_service
        .logout(&req.refresh_token, auth_context.user_id)
        .await?;

    // 审计日志
    state
        .audit_service
        .log_action_simple(
            auth_context.user_id,
            AuditAction::UserLogout,
            Some("session"),
            Some(auth_context.user_id),
            Some("User logged out"),
            None,
        )
        .await;

    Ok(Json(json!({"message": "已成功登出"})))
}

/// 从所有设备登出
pub async fn logout_all(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
) -> Result<impl IntoResponse, AppError> {
    let revoked_count = state.auth_service.logout_all(auth_context.user_id).await?;

    state
        .audit_service
        .log_action_simple(
            auth_context.user_id,
            AuditAction::UserLogout,
            Some("session"),
            Some(auth_context.user_id),
            Some(&format!("Logged out from all devices, revoked {} sessions", revoked_count)),
            None,
        )
        .await;

    Ok(Json(json!({
        "message": format!("已从 {} 个设备登出", revoked_count)
    })))
}

/// 获取当前用户信息
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
) -> Result<impl IntoResponse, AppError> {
    let user = state.auth_service.current_user(auth_context.user_id).await?;
    Ok(Json(user))
}

/// 解析客户端 IP
///
/// 转发头只有在 trust_proxy 开启时才被采信，否则一律使用对端地址。
/// 这个值进入登录限速和 login_events，不能由客户端自由伪造。
pub(crate) fn resolve_client_ip(headers: &HeaderMap, peer: SocketAddr, trust_proxy: bool) -> String {
    get_forwarded_ip(headers, trust_proxy).unwrap_or_else(|| peer.ip().to_string())
}

/// 从转发头中提取客户端 IP（仅在 trust_proxy 开启时）
pub(crate) fn get_forwarded_ip(headers: &HeaderMap, trust_proxy: bool) -> Option<String> {
    if !trust_proxy {
        return None;
    }

    // 首先检查 X-Forwarded-For（代理情况）
    if let Some(forwarded) = headers.get("x-forwarded-for") {
        if let Ok(forwarded_str) = forwarded.to_str() {
            // X-Forwarded-For 可能包含多个 IP，取第一个
            if let Some(first_ip) = forwarded_str.split(',').next() {
                return Some(first_ip.trim().to_string());
            }
        }
    }

    // 然后检查 X-Real-IP
    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(ip_str) = real_ip.to_str() {
            return Some(ip_str.to_string());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer() -> SocketAddr {
        "10.1.2.3:45678".parse().unwrap()
    }

    #[test]
    fn test_forwarded_ip_from_x_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "192.168.1.1, 10.0.0.1".parse().unwrap());

        let ip = get_forwarded_ip(&headers, true);
        assert_eq!(ip, Some("192.168.1.1".to_string()));
    }

    #[test]
    fn test_forwarded_ip_from_x_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", "192.168.1.2".parse().unwrap());

        let ip = get_forwarded_ip(&headers, true);
        assert_eq!(ip, Some("192.168.1.2".to_string()));
    }

    #[test]
    fn test_forwarded_headers_ignored_when_proxy_untrusted() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "6.6.6.6".parse().unwrap());
        headers.insert("x-real-ip", "6.6.6.6".parse().unwrap());

        assert_eq!(get_forwarded_ip(&headers, false), None);
        // 伪造的转发头不影响实际采用的地址
        assert_eq!(resolve_client_ip(&headers, peer(), false), "10.1.2.3");
    }

    #[test]
    fn test_resolve_falls_back_to_peer_without_headers() {
        let headers = HeaderMap::new();
        assert_eq!(resolve_client_ip(&headers, peer(), true), "10.1.2.3");
    }
}
