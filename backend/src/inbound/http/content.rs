//! FAQ and news handlers.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::Deserialize;

use crate::domain::{
    Faq, FaqDraft, FaqId, NewsDraft, NewsPost, NewsPostId, content_invalid,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, FaqSchema, NewsPostSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FaqRequest {
    #[schema(example = "Wer zahlt die Versicherung?")]
    pub question: String,
    /// Editor HTML, stored as is.
    pub answer_html: String,
    pub category: Option<String>,
    #[serde(default)]
    pub position: i32,
    pub image_key: Option<String>,
}

impl TryFrom<FaqRequest> for FaqDraft {
    type Error = crate::domain::Error;

    fn try_from(value: FaqRequest) -> Result<Self, Self::Error> {
        FaqDraft::new(
            &value.question,
            &value.answer_html,
            value.category,
            value.position,
            value.image_key,
        )
        .map_err(content_invalid)
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewsRequest {
    pub title: String,
    pub body_html: String,
    pub image_key: Option<String>,
    #[serde(default)]
    pub published: bool,
}

impl TryFrom<NewsRequest> for NewsDraft {
    type Error = crate::domain::Error;

    fn try_from(value: NewsRequest) -> Result<Self, Self::Error> {
        NewsDraft::new(
            &value.title,
            &value.body_html,
            value.image_key,
            value.published,
        )
        .map_err(content_invalid)
    }
}

fn faq_id(raw: &str) -> ApiResult<FaqId> {
    parse_id(raw, FieldName::new("id"))
}

fn news_id(raw: &str) -> ApiResult<NewsPostId> {
    parse_id(raw, FieldName::new("id"))
}

#[utoipa::path(
    get,
    path = "/api/v1/faqs",
    responses(
        (status = 200, description = "FAQs by position", body = [FaqSchema]),
        (status = 401, description = "Not signed in", body = ErrorSchema)
    ),
    tags = ["content"],
    operation_id = "listFaqs"
)]
#[get("/faqs")]
pub async fn list_faqs(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Faq>>> {
    session.principal(&state.auth).await?;
    Ok(web::Json(state.content.list_faqs().await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/faqs",
    request_body = FaqRequest,
    responses(
        (status = 201, description = "FAQ created", body = FaqSchema),
        (status = 400, description = "Invalid FAQ", body = ErrorSchema),
        (status = 403, description = "Admins only", body = ErrorSchema)
    ),
    tags = ["content"],
    operation_id = "createFaq"
)]
#[post("/faqs")]
pub async fn create_faq(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<FaqRequest>,
) -> ApiResult<HttpResponse> {
    let principal = session.principal(&state.auth).await?;
    let draft = FaqDraft::try_from(payload.into_inner())?;
    let faq = state.content.create_faq(&principal, draft).await?;
    Ok(HttpResponse::Created().json(faq))
}

#[utoipa::path(
    put,
    path = "/api/v1/faqs/{id}",
    params(("id" = String, Path, description = "FAQ id")),
    request_body = FaqRequest,
    responses(
        (status = 200, description = "FAQ updated", body = FaqSchema),
        (status = 404, description = "Unknown FAQ", body = ErrorSchema)
    ),
    tags = ["content"],
    operation_id = "updateFaq"
)]
#[put("/faqs/{id}")]
pub async fn update_faq(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<FaqRequest>,
) -> ApiResult<web::Json<Faq>> {
    let principal = session.principal(&state.auth).await?;
    let id = faq_id(&path)?;
    let draft = FaqDraft::try_from(payload.into_inner())?;
    Ok(web::Json(
        state.content.update_faq(&principal, &id, draft).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/faqs/{id}",
    params(("id" = String, Path, description = "FAQ id")),
    responses(
        (status = 204, description = "FAQ deleted"),
        (status = 404, description = "Unknown FAQ", body = ErrorSchema)
    ),
    tags = ["content"],
    operation_id = "deleteFaq"
)]
#[delete("/faqs/{id}")]
pub async fn delete_faq(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let principal = session.principal(&state.auth).await?;
    let id = faq_id(&path)?;
    state.content.delete_faq(&principal, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Published news, newest first; admins also see drafts.
#[utoipa::path(
    get,
    path = "/api/v1/news",
    responses(
        (status = 200, description = "News posts", body = [NewsPostSchema]),
        (status = 401, description = "Not signed in", body = ErrorSchema)
    ),
    tags = ["content"],
    operation_id = "listNews"
)]
#[get("/news")]
pub async fn list_news(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<NewsPost>>> {
    let principal = session.principal(&state.auth).await?;
    Ok(web::Json(state.content.list_news(&principal).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/news/{id}",
    params(("id" = String, Path, description = "News post id")),
    responses(
        (status = 200, description = "News post", body = NewsPostSchema),
        (status = 404, description = "Unknown or unpublished post", body = ErrorSchema)
    ),
    tags = ["content"],
    operation_id = "getNews"
)]
#[get("/news/{id}")]
pub async fn get_news(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<NewsPost>> {
    let principal = session.principal(&state.auth).await?;
    let id = news_id(&path)?;
    Ok(web::Json(state.content.get_news(&principal, &id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/news",
    request_body = NewsRequest,
    responses(
        (status = 201, description = "News post created", body = NewsPostSchema),
        (status = 400, description = "Invalid post", body = ErrorSchema),
        (status = 403, description = "Admins only", body = ErrorSchema)
    ),
    tags = ["content"],
    operation_id = "createNews"
)]
#[post("/news")]
pub async fn create_news(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<NewsRequest>,
) -> ApiResult<HttpResponse> {
    let principal = session.principal(&state.auth).await?;
    let draft = NewsDraft::try_from(payload.into_inner())?;
    let post = state.content.create_news(&principal, draft).await?;
    Ok(HttpResponse::Created().json(post))
}

#[utoipa::path(
    put,
    path = "/api/v1/news/{id}",
    params(("id" = String, Path, description = "News post id")),
    request_body = NewsRequest,
    responses(
        (status = 200, description = "News post updated", body = NewsPostSchema),
        (status = 404, description = "Unknown post", body = ErrorSchema)
    ),
    tags = ["content"],
    operation_id = "updateNews"
)]
#[put("/news/{id}")]
pub async fn update_news(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<NewsRequest>,
) -> ApiResult<web::Json<NewsPost>> {
    let principal = session.principal(&state.auth).await?;
    let id = news_id(&path)?;
    let draft = NewsDraft::try_from(payload.into_inner())?;
    Ok(web::Json(
        state.content.update_news(&principal, &id, draft).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/news/{id}",
    params(("id" = String, Path, description = "News post id")),
    responses(
        (status = 204, description = "News post deleted"),
        (status = 404, description = "Unknown post", body = ErrorSchema)
    ),
    tags = ["content"],
    operation_id = "deleteNews"
)]
#[delete("/news/{id}")]
pub async fn delete_news(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let principal = session.principal(&state.auth).await?;
    let id = news_id(&path)?;
    state.content.delete_news(&principal, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}
