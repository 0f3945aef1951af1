//! FAQ entries and news posts.
//!
//! Answers and post bodies are stored as opaque HTML produced by the
//! portal's editor; the backend never parses or sanitises them.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::vehicle::trim_optional;
use super::{FaqId, NewsPostId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
}

impl ContentValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            Self::Empty { field } | Self::TooLong { field, .. } => field,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Empty { .. } => "empty_field",
            Self::TooLong { .. } => "too_long",
        }
    }
}

/// Maximum length of an FAQ category label.
pub const FAQ_CATEGORY_MAX: usize = 80;

fn required(raw: &str, field: &'static str) -> Result<String, ContentValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ContentValidationError::Empty { field });
    }
    Ok(trimmed.to_owned())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Faq {
    pub id: FaqId,
    pub question: String,
    pub answer_html: String,
    pub category: Option<String>,
    pub position: i32,
    pub image_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaqDraft {
    pub question: String,
    pub answer_html: String,
    pub category: Option<String>,
    pub position: i32,
    pub image_key: Option<String>,
}

impl FaqDraft {
    pub fn new(
        question: &str,
        answer_html: &str,
        category: Option<String>,
        position: i32,
        image_key: Option<String>,
    ) -> Result<Self, ContentValidationError> {
        let question = required(question, "question")?;
        let answer_html = required(answer_html, "answer")?;
        let category = trim_optional(category);
        if category
            .as_ref()
            .is_some_and(|label| label.chars().count() > FAQ_CATEGORY_MAX)
        {
            return Err(ContentValidationError::TooLong {
                field: "category",
                max: FAQ_CATEGORY_MAX,
            });
        }
        Ok(Self {
            question,
            answer_html,
            category,
            position,
            image_key: trim_optional(image_key),
        })
    }
}

/// Sort FAQs by position, then question.
pub fn sort_faqs(faqs: &mut [Faq]) {
    faqs.sort_by(|a, b| {
        a.position
            .cmp(&b.position)
            .then_with(|| a.question.cmp(&b.question))
    });
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsPost {
    pub id: NewsPostId,
    pub title: String,
    pub body_html: String,
    pub image_key: Option<String>,
    pub published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl NewsPost {
    /// Apply the publication flag, stamping `published_at` on first publish.
    pub fn set_published(&mut self, published: bool, now: DateTime<Utc>) {
        self.published = published;
        if published && self.published_at.is_none() {
            self.published_at = Some(now);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsDraft {
    pub title: String,
    pub body_html: String,
    pub image_key: Option<String>,
    pub published: bool,
}

impl NewsDraft {
    pub fn new(
        title: &str,
        body_html: &str,
        image_key: Option<String>,
        published: bool,
    ) -> Result<Self, ContentValidationError> {
        Ok(Self {
            title: required(title, "title")?,
            body_html: required(body_html, "body")?,
            image_key: trim_optional(image_key),
            published,
        })
    }
}

/// Newest first: publication date, falling back to creation date.
pub fn sort_news(posts: &mut [NewsPost]) {
    posts.sort_by(|a, b| match (b.published_at, a.published_at) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.created_at.cmp(&a.created_at),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rstest::rstest;

    fn faq(question: &str, position: i32) -> Faq {
        Faq {
            id: FaqId::random(),
            question: question.into(),
            answer_html: "<p>Antwort</p>".into(),
            category: None,
            position,
            image_key: None,
            created_at: Utc::now(),
        }
    }

    fn post(title: &str, published_at: Option<DateTime<Utc>>) -> NewsPost {
        NewsPost {
            id: NewsPostId::random(),
            title: title.into(),
            body_html: "<p>Text</p>".into(),
            image_key: None,
            published: published_at.is_some(),
            published_at,
            created_at: Utc::now(),
        }
    }

    #[rstest]
    fn faqs_sort_by_position_then_question() {
        let mut faqs = vec![faq("Zulassung?", 1), faq("Wartung?", 2), faq("Abholung?", 1)];
        sort_faqs(&mut faqs);
        let questions: Vec<_> = faqs.iter().map(|faq| faq.question.as_str()).collect();
        assert_eq!(questions, ["Abholung?", "Zulassung?", "Wartung?"]);
    }

    #[rstest]
    fn news_sorts_newest_first_with_drafts_first() {
        let now = Utc::now();
        let mut posts = vec![
            post("alt", Some(now - Duration::days(3))),
            post("entwurf", None),
            post("neu", Some(now)),
        ];
        sort_news(&mut posts);
        let titles: Vec<_> = posts.iter().map(|post| post.title.as_str()).collect();
        assert_eq!(titles, ["entwurf", "neu", "alt"]);
    }

    #[rstest]
    fn publishing_stamps_only_once() {
        let mut news = post("x", None);
        let first = Utc::now();
        news.set_published(true, first);
        news.set_published(false, first + Duration::hours(1));
        news.set_published(true, first + Duration::hours(2));
        assert_eq!(news.published_at, Some(first));
        assert!(news.published);
    }

    #[rstest]
    fn drafts_require_text() {
        assert_eq!(
            FaqDraft::new(" ", "a", None, 0, None),
            Err(ContentValidationError::Empty { field: "question" })
        );
        assert_eq!(
            NewsDraft::new("Titel", "", None, false),
            Err(ContentValidationError::Empty { field: "body" })
        );
    }

    #[rstest]
    fn faq_category_is_capped() {
        let category = Some(format!("  {}  ", "k".repeat(FAQ_CATEGORY_MAX)));
        let draft = FaqDraft::new("Frage?", "<p>a</p>", category, 0, None).expect("at the limit");
        assert_eq!(draft.category.map(|c| c.len()), Some(FAQ_CATEGORY_MAX));

        let err = FaqDraft::new("Frage?", "<p>a</p>", Some("k".repeat(FAQ_CATEGORY_MAX + 1)), 0, None)
            .expect_err("overlong category");
        assert_eq!(err.field(), "category");
        assert_eq!(err.code(), "too_long");
    }
}
