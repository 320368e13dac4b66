//! 文章数据访问

use crate::{
    error::AppError,
    models::article::{Article, ArticleQuery},
};
use sqlx::{PgPool, Row};
use uuid::Uuid;

pub struct ArticleRepository {
    db: PgPool,
}

impl ArticleRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// 根据 ID 查找文章
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Article>, AppError> {
        let article = sqlx::query_as::<_, Article>(
            "SELECT * FROM articles WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(article)
    }

    /// 按过滤条件列出文章
    ///
    /// 排序列来自 SortBy 白名单，过滤值全部走参数绑定。
    pub async fn list(&self, query: &ArticleQuery) -> Result<(Vec<Article>, i64), AppError> {
        let (page, page_size) = query.pagination()?;

        let mut where_clause = String::from("1=1");
        let mut index = 0;

        if query.severity.is_some() {
            index += 1;
            where_clause.push_str(&format!(" AND a.severity = ${}", index));
        }
        if query.category_id.is_some() {
            index += 1;
            where_clause.push_str(&format!(" AND a.category_id = ${}", index));
        }
        if query.search.is_some() {
            index += 1;
            where_clause.push_str(&format!(
                " AND (a.title ILIKE ${i} OR a.summary ILIKE ${i})",
                i = index
            ));
        }
        if query.date_from.is_some() {
            index += 1;
            where_clause.push_str(&format!(" AND a.created_at >= ${}", index));
        }
        if query.date_to.is_some() {
            index += 1;
            where_clause.push_str(&format!(" AND a.created_at <= ${}", index));
        }

        let list_sql = format!(
            r#"
            SELECT a.* FROM articles a
            LEFT JOIN categories c ON a.category_id = c.id
            WHERE {}
            ORDER BY {}
            LIMIT ${} OFFSET ${}
            "#,
            where_clause,
            query.order_clause(),
            index + 1,
            index + 2,
        );

        let count_sql = format!(
            "SELECT COUNT(*) FROM articles a LEFT JOIN categories c ON a.category_id = c.id WHERE {}",
            where_clause
        );

        let mut list_query = sqlx::query_as::<_, Article>(&list_sql);
        let mut count_query = sqlx::query(&count_sql);

        if let Some(severity) = query.severity {
            list_query = list_query.bind(severity);
            count_query = count_query.bind(severity);
        }
        if let Some(category_id) = query.category_id {
            list_query = list_query.bind(category_id);
            count_query = count_query.bind(category_id);
        }
        if let Some(search) = &query.search {
            let pattern = format!("%{}%", search);
            list_query = list_query.bind(pattern.clone());
            count_query = count_query.bind(pattern);
        }
        if let Some(date_from) = query.date_from {
            list_query = list_query.bind(date_from);
            count_query = count_query.bind(date_from);
        }
        if let Some(date_to) = query.date_to {
            list_query = list_query.bind(date_to);
            count_query = count_query.bind(date_to);
        }

        let articles = list_query
            .bind(page_size as i64)
            .bind(ArticleQuery::offset(page, page_size))
            .fetch_all(&self.db)
            .await?;

        let total: i64 = count_query.fetch_one(&self.db).await?.get(0);

        Ok((articles, total))
    }

    /// 浏览计数
    pub async fn increment_view_count(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE articles SET view_count = view_count + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(())
    }
}
