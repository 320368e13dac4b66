//! Database repository layer

pub mod article_repo;
pub mod audit_repo;
pub mod auth_repo;
pub mod engagement_repo;
pub mod newsletter_repo;
pub mod user_repo;
