//! 错误处理单元测试
//!
//! 测试应用错误类型的各种行为

use axum::http::StatusCode;
use newsdesk::error::AppError;

// ==================== 错误状态码测试 ====================

#[test]
fn test_error_status_codes() {
    assert_eq!(AppError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(AppError::Forbidden.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(AppError::NotFound.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(
        AppError::BadRequest("invalid".to_string()).status_code(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(AppError::RateLimitExceeded.status_code(), StatusCode::TOO_MANY_REQUESTS);
}

#[test]
fn test_database_error_status_code() {
    let db_error = sqlx::Error::RowNotFound;
    let app_error = AppError::Database(db_error);
    assert_eq!(app_error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn test_config_error_status_code() {
    let app_error = AppError::Config("Invalid config".to_string());
    assert_eq!(app_error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn test_internal_error_status_code() {
    assert_eq!(AppError::Internal.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}

// ==================== 用户消息测试 ====================

#[test]
fn test_user_messages_no_sensitive_info() {
    // 数据库错误不应该暴露技术细节
    let db_error = AppError::Database(sqlx::Error::RowNotFound);
    let message = db_error.user_message();
    assert_eq!(message, "Database error occurred");
    assert!(!message.to_lowercase().contains("sqlx"));
    assert!(!message.to_lowercase().contains("row"));

    // 配置错误不应该暴露配置内容
    let config_error = AppError::Config("secret=abc123".to_string());
    let message = config_error.user_message();
    assert_eq!(message, "Configuration error");
    assert!(!message.contains("abc123"));
}

#[test]
fn test_bad_request_preserves_message() {
    let err = AppError::BadRequest("page_size must not exceed 100".to_string());
    assert_eq!(err.user_message(), "page_size must not exceed 100");
}

#[test]
fn test_error_code_matches_status() {
    assert_eq!(AppError::Unauthorized.code(), 401);
    assert_eq!(AppError::Forbidden.code(), 403);
    assert_eq!(AppError::NotFound.code(), 404);
    assert_eq!(AppError::RateLimitExceeded.code(), 429);
    assert_eq!(AppError::Internal.code(), 500);
}

// ==================== 错误转换测试 ====================

#[test]
fn test_validation_errors_become_bad_request() {
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 10))]
        reason: String,
    }

    let probe = Probe { reason: "too short".to_string() };
    let err: AppError = probe.validate().unwrap_err().into();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
}

#[test]
fn test_string_becomes_config_error() {
    let err: AppError = "bad setting".to_string().into();
    assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}
