//! Upload and file download handlers.
//!
//! ```text
//! POST /api/v1/uploads/vehicles   (Content-Type: image/jpeg, raw body)
//! GET  /api/v1/files/vehicles/3f6c….jpg
//! ```

use actix_web::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use actix_web::{HttpRequest, HttpResponse, get, post, web};
use serde::Serialize;

use crate::domain::{MAX_UPLOAD_BYTES, StorageKey, UploadScope, upload_invalid};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Stored files are immutable per key but only for signed-in users.
const FILE_CACHE_CONTROL: &str = "private, max-age=86400, immutable";

/// Body limit for raw uploads, one byte above the accepted size so
/// oversized files reach validation and get the API error payload.
pub fn payload_config() -> web::PayloadConfig {
    web::PayloadConfig::new(MAX_UPLOAD_BYTES + 1)
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UploadResponse {
    /// Storage key, `{scope}/{uuid}.{ext}`.
    #[schema(example = "vehicles/9b2e4c55-3a7f-4b7e-9a43-1f0f2d1f7b10.jpg")]
    pub key: String,
}

/// Store the raw request body under a scope.
#[utoipa::path(
    post,
    path = "/api/v1/uploads/{scope}",
    params(("scope" = String, Path, description = "vehicles, brands, faqs, news or tickets")),
    request_body(content = String, content_type = "application/octet-stream",
        description = "Raw file bytes"),
    responses(
        (status = 201, description = "File stored", body = UploadResponse),
        (status = 400, description = "Unknown scope, media type or size", body = ErrorSchema),
        (status = 403, description = "Scope not writable by the caller", body = ErrorSchema),
        (status = 413, description = "Body exceeds the upload limit")
    ),
    tags = ["uploads"],
    operation_id = "upload"
)]
#[post("/uploads/{scope}")]
pub async fn upload(
    state: web::Data<HttpState>,
    session: SessionContext,
    request: HttpRequest,
    path: web::Path<String>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let principal = session.principal(&state.auth).await?;
    let scope = path.parse::<UploadScope>().map_err(upload_invalid)?;
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let key = state
        .uploads
        .upload(&principal, scope, content_type, body.to_vec())
        .await?;
    Ok(HttpResponse::Created().json(UploadResponse {
        key: key.to_string(),
    }))
}

/// Serve a stored file to signed-in users.
#[utoipa::path(
    get,
    path = "/api/v1/files/{scope}/{name}",
    params(
        ("scope" = String, Path, description = "Upload scope"),
        ("name" = String, Path, description = "File name from the storage key")
    ),
    responses(
        (status = 200, description = "File contents", body = String,
            content_type = "application/octet-stream"),
        (status = 400, description = "Malformed key", body = ErrorSchema),
        (status = 401, description = "Not signed in", body = ErrorSchema),
        (status = 404, description = "Unknown file", body = ErrorSchema)
    ),
    tags = ["uploads"],
    operation_id = "downloadFile"
)]
#[get("/files/{scope}/{name}")]
pub async fn download(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    session.principal(&state.auth).await?;
    let (scope, name) = path.into_inner();
    let key = StorageKey::from_parts(&scope, &name).map_err(upload_invalid)?;
    let file = state.uploads.download(&key).await?;
    Ok(HttpResponse::Ok()
        .content_type(file.media_type.mime())
        .insert_header((CACHE_CONTROL, FILE_CACHE_CONTROL))
        .body(file.bytes))
}
