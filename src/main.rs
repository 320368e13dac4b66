//! 安全资讯平台后台主入口

use newsdesk::{
    auth::jwt::JwtService, config::AppConfig, db, handlers::health, middleware::AppState, routes,
    services, telemetry,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ===== CLI 参数处理 =====
    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "--version" => {
                println!("newsdesk {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("未知参数: {}", args[1]);
                print_help();
                std::process::exit(1);
            }
        }
    }

    // 加载 .env 文件（开发环境）
    // 按优先级加载：.env.local > .env.development > .env
    // 生产环境应该直接设置环境变量，不依赖 .env 文件
    if let Ok(path) = std::env::var("NEWSDESK_ENV") {
        dotenv::from_filename(format!(".env.{}", path)).ok();
    } else {
        dotenv::from_filename(".env.local").ok();
        dotenv::from_filename(".env.development").ok();
        dotenv::dotenv().ok();
    }

    // 设置应用启动时间
    health::set_start_time();

    // 1. 加载配置
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        anyhow::anyhow!("Failed to load configuration: {}", e)
    })?;

    // 2. 初始化日志与指标
    telemetry::init_telemetry(&config);
    telemetry::init_metrics();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Newsdesk starting...");

    // 3. 数据库连接池 + 迁移
    let db_pool = db::create_pool(&config.database).await?;
    db::run_migrations(&db_pool).await?;

    tracing::info!("Database initialized");

    // 4. 构建服务与应用状态
    let jwt_service = Arc::new(JwtService::from_config(&config)?);

    // 审计服务被多个服务共享
    let audit_service = Arc::new(services::AuditService::new(db_pool.clone()));

    let auth_service = Arc::new(services::AuthService::new(
        db_pool.clone(),
        jwt_service.clone(),
        Arc::new(config.clone()),
    ));
    let approval_service = Arc::new(services::ApprovalService::new(
        db_pool.clone(),
        audit_service.clone(),
    ));
    let article_service = Arc::new(services::ArticleService::new(db_pool.clone()));
    let newsletter_service = Arc::new(services::NewsletterService::new(
        db_pool.clone(),
        audit_service.clone(),
    ));
    let user_service = Arc::new(services::UserService::new(
        db_pool.clone(),
        audit_service.clone(),
    ));

    let app_state = Arc::new(AppState {
        config: config.clone(),
        db: db_pool.clone(),
        auth_service,
        approval_service,
        article_service,
        newsletter_service,
        user_service,
        audit_service,
        jwt_service,
    });

    // 5. 构建路由
    let app = routes::create_router(app_state.clone());

    // 6. 启动服务器
    let addr = &config.server.addr;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(
        addr = %addr,
        "Server listening"
    );

    // 7. 优雅关闭：收到信号后开始排空，超时则强制退出
    let (drain_tx, drain_rx) = tokio::sync::oneshot::channel::<()>();
    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        shutdown_signal().await;
        let _ = drain_tx.send(());
    });

    tokio::select! {
        result = server => {
            result?;
            tracing::info!("Server shutdown complete");
        }
        _ = force_shutdown_deadline(drain_rx, config.server.graceful_shutdown_timeout_secs) => {
            tracing::warn!("Graceful shutdown timeout reached, forcing exit");
        }
    }

    Ok(())
}

/// 优雅关闭信号处理
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Ctrl+C received, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Terminate signal received, starting graceful shutdown");
        },
    }
}

/// 排空超时看门狗
///
/// 信号到达（drain 开始）后才开始计时；服务器未经信号直接退出时永不触发。
async fn force_shutdown_deadline(drain_started: tokio::sync::oneshot::Receiver<()>, timeout_secs: u64) {
    if drain_started.await.is_err() {
        std::future::pending::<()>().await;
    }
    tokio::time::sleep(tokio::time::Duration::from_secs(timeout_secs)).await;
}

/// 打印帮助信息
fn print_help() {
    println!("newsdesk {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("用法: newsdesk [选项]");
    println!();
    println!("选项:");
    println!("  --version     打印版本信息并退出");
    println!("  --help        打印此帮助信息并退出");
    println!();
    println!("环境变量:");
    println!("  所有配置通过环境变量完成");
    println!("  可用选项请参考 .env.example");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{timeout, Duration};

    #[tokio::test]
    async fn test_force_shutdown_fires_after_signal() {
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let _ = tx.send(());

        // 超时为 0，信号已到，看门狗应立即完成
        timeout(Duration::from_secs(1), force_shutdown_deadline(rx, 0))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_force_shutdown_never_fires_without_signal() {
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        drop(tx);

        // 服务器未经信号退出时，看门狗不得触发
        assert!(
            timeout(Duration::from_millis(100), force_shutdown_deadline(rx, 0))
                .await
                .is_err()
        );
    }
}
