//! PostgreSQL-backed `ContentRepository` for FAQs and news posts.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ContentRepository, RepositoryError};
use crate::domain::{Faq, FaqId, NewsPost, NewsPostId};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{FaqRow, NewsPostRow};
use super::pool::DbPool;
use super::schema::{faqs, news_posts};

#[derive(Clone)]
pub struct DieselContentRepository {
    pool: DbPool,
}

impl DieselContentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentRepository for DieselContentRepository {
    async fn list_faqs(&self) -> Result<Vec<Faq>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<FaqRow> = faqs::table
            .select(FaqRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Faq::from).collect())
    }

    async fn find_faq(&self, id: &FaqId) -> Result<Option<Faq>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<FaqRow> = faqs::table
            .find(id.as_uuid())
            .select(FaqRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Faq::from))
    }

    async fn save_faq(&self, faq: &Faq) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = FaqRow::from(faq);
        diesel::insert_into(faqs::table)
            .values(&row)
            .on_conflict(faqs::id)
            .do_update()
            .set(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn delete_faq(&self, id: &FaqId) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(faqs::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }

    async fn list_news(&self) -> Result<Vec<NewsPost>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<NewsPostRow> = news_posts::table
            .select(NewsPostRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(NewsPost::from).collect())
    }

    async fn find_news(&self, id: &NewsPostId) -> Result<Option<NewsPost>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<NewsPostRow> = news_posts::table
            .find(id.as_uuid())
            .select(NewsPostRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(NewsPost::from))
    }

    async fn save_news(&self, post: &NewsPost) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewsPostRow::from(post);
        diesel::insert_into(news_posts::table)
            .values(&row)
            .on_conflict(news_posts::id)
            .do_update()
            .set(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn delete_news(&self, id: &NewsPostId) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(news_posts::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }
}
