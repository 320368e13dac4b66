//! 收藏与阅读历史模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bookmark {
    pub id: Uuid,
    pub user_id: Uuid,
    pub article_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReadingHistoryEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub article_id: Uuid,
    pub read_at: DateTime<Utc>,
}

/// 收藏/历史列表条目（联查文章标题与严重性）
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct EngagementListItem {
    pub article_id: Uuid,
    pub title: String,
    pub slug: String,
    pub severity: crate::models::article::Severity,
    pub occurred_at: DateTime<Utc>,
}
