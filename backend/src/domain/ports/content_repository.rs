//! Port for FAQs and news posts.

use async_trait::async_trait;

use crate::domain::{Faq, FaqId, NewsPost, NewsPostId};

use super::RepositoryError;

/// Persistence for editorial content. Ordering is applied by the service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentRepository: Send + Sync {
    async fn list_faqs(&self) -> Result<Vec<Faq>, RepositoryError>;

    async fn find_faq(&self, id: &FaqId) -> Result<Option<Faq>, RepositoryError>;

    async fn save_faq(&self, faq: &Faq) -> Result<(), RepositoryError>;

    async fn delete_faq(&self, id: &FaqId) -> Result<bool, RepositoryError>;

    async fn list_news(&self) -> Result<Vec<NewsPost>, RepositoryError>;

    async fn find_news(&self, id: &NewsPostId) -> Result<Option<NewsPost>, RepositoryError>;

    async fn save_news(&self, post: &NewsPost) -> Result<(), RepositoryError>;

    async fn delete_news(&self, id: &NewsPostId) -> Result<bool, RepositoryError>;
}
