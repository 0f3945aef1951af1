//! Publishing FAQs and news, and filtering them per permission.

use std::sync::Arc;

use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{ContentRepository, map_repository_error};
use crate::domain::{
    Capability, ContentValidationError, Error, Faq, FaqDraft, FaqId, NewsDraft, NewsPost,
    NewsPostId, Principal, sort_faqs, sort_news,
};

pub(crate) fn content_invalid(err: ContentValidationError) -> Error {
    Error::invalid_request(err.to_string())
        .with_details(json!({ "field": err.field(), "code": err.code() }))
}

#[derive(Clone)]
pub struct ContentService {
    repo: Arc<dyn ContentRepository>,
    clock: Arc<dyn Clock>,
}

impl ContentService {
    pub fn new(repo: Arc<dyn ContentRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// FAQs ordered by position, then question.
    pub async fn list_faqs(&self) -> Result<Vec<Faq>, Error> {
        let mut faqs = self
            .repo
            .list_faqs()
            .await
            .map_err(|err| map_repository_error("faq", err))?;
        sort_faqs(&mut faqs);
        Ok(faqs)
    }

    pub async fn create_faq(&self, principal: &Principal, draft: FaqDraft) -> Result<Faq, Error> {
        principal.require(Capability::ManageContent)?;
        let faq = Faq {
            id: FaqId::random(),
            question: draft.question,
            answer_html: draft.answer_html,
            category: draft.category,
            position: draft.position,
            image_key: draft.image_key,
            created_at: self.clock.utc(),
        };
        self.save_faq(&faq).await?;
        info!(faq_id = %faq.id, "faq created");
        Ok(faq)
    }

    pub async fn update_faq(
        &self,
        principal: &Principal,
        id: &FaqId,
        draft: FaqDraft,
    ) -> Result<Faq, Error> {
        principal.require(Capability::ManageContent)?;
        let existing = self
            .repo
            .find_faq(id)
            .await
            .map_err(|err| map_repository_error("faq", err))?
            .ok_or_else(|| Error::not_found("faq not found"))?;
        let faq = Faq {
            question: draft.question,
            answer_html: draft.answer_html,
            category: draft.category,
            position: draft.position,
            image_key: draft.image_key,
            ..existing
        };
        self.save_faq(&faq).await?;
        Ok(faq)
    }

    pub async fn delete_faq(&self, principal: &Principal, id: &FaqId) -> Result<(), Error> {
        principal.require(Capability::ManageContent)?;
        let removed = self
            .repo
            .delete_faq(id)
            .await
            .map_err(|err| map_repository_error("faq", err))?;
        if !removed {
            return Err(Error::not_found("faq not found"));
        }
        info!(faq_id = %id, "faq deleted");
        Ok(())
    }

    async fn save_faq(&self, faq: &Faq) -> Result<(), Error> {
        self.repo
            .save_faq(faq)
            .await
            .map_err(|err| map_repository_error("faq", err))
    }

    /// News posts, newest first. Drafts are only listed for admins.
    pub async fn list_news(&self, principal: &Principal) -> Result<Vec<NewsPost>, Error> {
        let mut posts = self
            .repo
            .list_news()
            .await
            .map_err(|err| map_repository_error("news", err))?;
        if !principal.permission.allows(Capability::ManageContent) {
            posts.retain(|post| post.published);
        }
        sort_news(&mut posts);
        Ok(posts)
    }

    /// A news post; drafts are hidden as not found from readers.
    pub async fn get_news(&self, principal: &Principal, id: &NewsPostId) -> Result<NewsPost, Error> {
        let editor = principal.permission.allows(Capability::ManageContent);
        self.repo
            .find_news(id)
            .await
            .map_err(|err| map_repository_error("news", err))?
            .filter(|post| editor || post.published)
            .ok_or_else(|| Error::not_found("news post not found"))
    }

    pub async fn create_news(
        &self,
        principal: &Principal,
        draft: NewsDraft,
    ) -> Result<NewsPost, Error> {
        principal.require(Capability::ManageContent)?;
        let now = self.clock.utc();
        let mut post = NewsPost {
            id: NewsPostId::random(),
            title: draft.title,
            body_html: draft.body_html,
            image_key: draft.image_key,
            published: false,
            published_at: None,
            created_at: now,
        };
        post.set_published(draft.published, now);
        self.save_news(&post).await?;
        info!(news_id = %post.id, published = post.published, "news post created");
        Ok(post)
    }

    pub async fn update_news(
        &self,
        principal: &Principal,
        id: &NewsPostId,
        draft: NewsDraft,
    ) -> Result<NewsPost, Error> {
        principal.require(Capability::ManageContent)?;
        let mut post = self.get_news(principal, id).await?;
        post.title = draft.title;
        post.body_html = draft.body_html;
        post.image_key = draft.image_key;
        post.set_published(draft.published, self.clock.utc());
        self.save_news(&post).await?;
        Ok(post)
    }

    pub async fn delete_news(&self, principal: &Principal, id: &NewsPostId) -> Result<(), Error> {
        principal.require(Capability::ManageContent)?;
        let removed = self
            .repo
            .delete_news(id)
            .await
            .map_err(|err| map_repository_error("news", err))?;
        if !removed {
            return Err(Error::not_found("news post not found"));
        }
        info!(news_id = %id, "news post deleted");
        Ok(())
    }

    async fn save_news(&self, post: &NewsPost) -> Result<(), Error> {
        self.repo
            .save_news(post)
            .await
            .map_err(|err| map_repository_error("news", err))
    }
}
