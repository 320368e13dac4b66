//! 领域模型模块
//! 文章、审批流、用户、Newsletter 配置与审计模型

pub mod approval;
pub mod article;
pub mod audit;
pub mod auth;
pub mod engagement;
pub mod newsletter;
pub mod user;
