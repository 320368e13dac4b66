//! HTTP 处理器模块

pub mod approval;
pub mod article;
pub mod audit;
pub mod auth;
pub mod health;
pub mod metrics;
pub mod newsletter;
pub mod user;
