//! 文章浏览与互动服务

use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::article::{Article, ArticleQuery, Pagination};
use crate::models::engagement::EngagementListItem;
use crate::repository::{article_repo::ArticleRepository, engagement_repo::EngagementRepository};

pub struct ArticleService {
    db: PgPool,
}

impl ArticleService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// 文章列表
    #[instrument(skip(self, query))]
    pub async fn list(&self, query: &ArticleQuery) -> Result<(Vec<Article>, Pagination), AppError> {
        let (page, page_size) = query.pagination()?;

        let repo = ArticleRepository::new(self.db.clone());
        let (articles, total) = repo.list(query).await?;

        Ok((articles, Pagination::new(page, page_size, total)))
    }

    /// 文章详情（访问计数随读递增）
    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<Article, AppError> {
        let repo = ArticleRepository::new(self.db.clone());
        let article = repo.find_by_id(id).await?.ok_or(AppError::NotFound)?;

        let _ = repo.increment_view_count(id).await;

        Ok(article)
    }

    /// 收藏文章
    #[instrument(skip(self))]
    pub async fn bookmark(&self, user_id: Uuid, article_id: Uuid) -> Result<(), AppError> {
        // 确认文章存在，外键错误对用户不友好
        let repo = ArticleRepository::new(self.db.clone());
        repo.find_by_id(article_id).await?.ok_or(AppError::NotFound)?;

        let engagement = EngagementRepository::new(self.db.clone());
        engagement.add_bookmark(user_id, article_id).await
    }

    /// 取消收藏
    #[instrument(skip(self))]
    pub async fn remove_bookmark(&self, user_id: Uuid, article_id: Uuid) -> Result<(), AppError> {
        let engagement = EngagementRepository::new(self.db.clone());
        let removed = engagement.remove_bookmark(user_id, article_id).await?;

        if !removed {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    /// 收藏列表
    #[instrument(skip(self))]
    pub async fn bookmarks(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<EngagementListItem>, AppError> {
        let engagement = EngagementRepository::new(self.db.clone());
        engagement.list_bookmarks(user_id, limit, offset).await
    }

    /// 记录阅读
    #[instrument(skip(self))]
    pub async fn record_read(&self, user_id: Uuid, article_id: Uuid) -> Result<(), AppError> {
        let repo = ArticleRepository::new(self.db.clone());
        repo.find_by_id(article_id).await?.ok_or(AppError::NotFound)?;

        let engagement = EngagementRepository::new(self.db.clone());
        engagement.record_read(user_id, article_id).await
    }

    /// 阅读历史
    #[instrument(skip(self))]
    pub async fn reading_history(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<EngagementListItem>, AppError> {
        let engagement = EngagementRepository::new(self.db.clone());
        engagement.list_reading_history(user_id, limit, offset).await
    }
}
