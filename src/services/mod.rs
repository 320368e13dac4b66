//! Business logic services layer

pub mod approval_service;
pub mod article_service;
pub mod audit_service;
pub mod auth_service;
pub mod newsletter_service;
pub mod user_service;

pub use approval_service::ApprovalService;
pub use article_service::ArticleService;
pub use audit_service::AuditService;
pub use auth_service::AuthService;
pub use newsletter_service::NewsletterService;
pub use user_service::UserService;
