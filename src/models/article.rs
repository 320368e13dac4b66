//! Article domain models
//! 资讯文章及审批队列的查询参数

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::approval::ApprovalStatus;

/// 威胁严重性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "severity", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

/// 文章行（含审批流字段）
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub summary: Option<String>,
    pub category_id: Option<Uuid>,
    pub source_id: Option<Uuid>,
    pub source_url: Option<String>,
    pub severity: Severity,
    pub tags: Vec<String>,
    pub cves: Vec<String>,
    pub reading_time_minutes: i32,
    pub view_count: i64,
    pub is_published: bool,
    pub published_at: Option<DateTime<Utc>>,

    // 审批流
    pub approval_status: ApprovalStatus,
    pub rejected: bool,
    pub rejection_reason: Option<String>,
    pub rejected_by: Option<Uuid>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub released_by: Option<Uuid>,
    pub released_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Source {
    pub id: Uuid,
    pub name: String,
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// 排序字段白名单，直接拼入 SQL，禁止透传任意列名
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    CreatedAt,
    Severity,
    Category,
}

impl SortBy {
    pub fn as_column(&self) -> &'static str {
        match self {
            SortBy::CreatedAt => "a.created_at",
            SortBy::Severity => "a.severity",
            SortBy::Category => "c.name",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// 审批队列与文章列表的查询参数
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleQuery {
    pub severity: Option<Severity>,
    pub category_id: Option<Uuid>,
    pub search: Option<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub sort_by: Option<SortBy>,
    pub sort_order: Option<SortOrder>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl ArticleQuery {
    pub const MAX_PAGE_SIZE: u32 = 100;
    pub const DEFAULT_PAGE_SIZE: u32 = 20;

    /// 规范化分页参数，页大小超限直接拒绝
    pub fn pagination(&self) -> Result<(u32, u32), AppError> {
        let page = self.page.unwrap_or(1);
        if page < 1 {
            return Err(AppError::BadRequest("page must be at least 1".to_string()));
        }

        let page_size = self.page_size.unwrap_or(Self::DEFAULT_PAGE_SIZE);
        if page_size < 1 || page_size > Self::MAX_PAGE_SIZE {
            return Err(AppError::BadRequest(format!(
                "page_size must be between 1 and {}",
                Self::MAX_PAGE_SIZE
            )));
        }

        Ok((page, page_size))
    }

    pub fn offset(page: u32, page_size: u32) -> i64 {
        ((page - 1) as i64) * (page_size as i64)
    }

    pub fn order_clause(&self) -> String {
        let column = self.sort_by.unwrap_or(SortBy::CreatedAt).as_column();
        let order = self.sort_order.unwrap_or(SortOrder::Desc).as_sql();
        format!("{} {}", column, order)
    }
}

/// 分页元数据
#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(page: u32, page_size: u32, total: i64) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            (total + page_size as i64 - 1) / page_size as i64
        };
        Self {
            page,
            page_size,
            total,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_query() -> ArticleQuery {
        ArticleQuery {
            severity: None,
            category_id: None,
            search: None,
            date_from: None,
            date_to: None,
            sort_by: None,
            sort_order: None,
            page: None,
            page_size: None,
        }
    }

    #[test]
    fn test_pagination_defaults() {
        let (page, page_size) = empty_query().pagination().unwrap();
        assert_eq!(page, 1);
        assert_eq!(page_size, ArticleQuery::DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_page_size_capped() {
        let mut query = empty_query();
        query.page_size = Some(101);
        assert!(query.pagination().is_err());

        query.page_size = Some(100);
        assert!(query.pagination().is_ok());
    }

    #[test]
    fn test_order_clause_uses_whitelist() {
        let mut query = empty_query();
        assert_eq!(query.order_clause(), "a.created_at DESC");

        query.sort_by = Some(SortBy::Severity);
        query.sort_order = Some(SortOrder::Asc);
        assert_eq!(query.order_clause(), "a.severity ASC");
    }

    #[test]
    fn test_pagination_total_pages() {
        let p = Pagination::new(1, 20, 0);
        assert_eq!(p.total_pages, 0);

        let p = Pagination::new(1, 20, 41);
        assert_eq!(p.total_pages, 3);
    }
}
