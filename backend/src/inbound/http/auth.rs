//! Sign-in, sign-out and password handlers.
//!
//! ```text
//! POST /api/v1/login {"email":"anna@firma.de","password":"sommer2024!"}
//! POST /api/v1/logout
//! GET  /api/v1/users/me
//! POST /api/v1/password-reset {"email":"anna@firma.de"}
//! POST /api/v1/password-reset/confirm {"token":"…","password":"…"}
//! POST /api/v1/users/me/password {"currentPassword":"…","newPassword":"…"}
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::domain::{
    EmailAddress, Error, LoginCredentials, NewPassword, Permission, Principal, UserProfile,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{CurrentUserSchema, ErrorSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, credential_invalid, user_invalid};

/// Login request body for `POST /api/v1/login`.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[schema(example = "anna.schmidt@firma.de")]
    pub email: String,
    #[schema(value_type = String, format = Password)]
    pub password: Zeroizing<String>,
}

/// Body of `POST /api/v1/password-reset`.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetRequest {
    pub email: String,
}

/// Body of `POST /api/v1/password-reset/confirm`.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetConfirmation {
    /// Token from the e-mailed link.
    pub token: String,
    #[schema(value_type = String, format = Password)]
    pub password: Zeroizing<String>,
}

/// Body of `POST /api/v1/users/me/password`.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    #[schema(value_type = String, format = Password)]
    pub current_password: Zeroizing<String>,
    #[schema(value_type = String, format = Password)]
    pub new_password: Zeroizing<String>,
}

/// The signed-in profile and its resolved permission.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub profile: UserProfile,
    pub permission: Permission,
}

impl From<Principal> for CurrentUser {
    fn from(principal: Principal) -> Self {
        Self {
            profile: principal.profile,
            permission: principal.permission,
        }
    }
}

pub(crate) fn parse_email(raw: &str) -> Result<EmailAddress, Error> {
    EmailAddress::new(raw).map_err(|err| user_invalid(err, FieldName::new("email")))
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = CurrentUserSchema,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<CurrentUser>> {
    let LoginRequest { email, password } = payload.into_inner();
    let credentials =
        LoginCredentials::try_from_parts(&email, &password).map_err(credential_invalid)?;
    let principal = state.auth.login(&credentials).await?;
    session.persist_user(&principal.profile.id)?;
    Ok(web::Json(principal.into()))
}

/// Drop the session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Signed out")),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.purge();
    HttpResponse::NoContent().finish()
}

/// Profile and permission of the signed-in user.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current user", body = CurrentUserSchema),
        (status = 401, description = "Not signed in", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<CurrentUser>> {
    let principal = session.principal(&state.auth).await?;
    Ok(web::Json(principal.into()))
}

/// Request a password reset link.
///
/// Answers `202` whether or not the address belongs to an account.
#[utoipa::path(
    post,
    path = "/api/v1/password-reset",
    request_body = PasswordResetRequest,
    responses(
        (status = 202, description = "Reset link sent if the account exists"),
        (status = 400, description = "Malformed e-mail", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "requestPasswordReset",
    security([])
)]
#[post("/password-reset")]
pub async fn request_password_reset(
    state: web::Data<HttpState>,
    payload: web::Json<PasswordResetRequest>,
) -> ApiResult<HttpResponse> {
    let email = parse_email(&payload.email)?;
    state.auth.request_password_reset(&email).await?;
    Ok(HttpResponse::Accepted().finish())
}

/// Set a new password with a reset token.
#[utoipa::path(
    post,
    path = "/api/v1/password-reset/confirm",
    request_body = PasswordResetConfirmation,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Weak password or expired link", body = ErrorSchema),
        (status = 404, description = "Unknown link", body = ErrorSchema),
        (status = 409, description = "Link already used", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "confirmPasswordReset",
    security([])
)]
#[post("/password-reset/confirm")]
pub async fn confirm_password_reset(
    state: web::Data<HttpState>,
    payload: web::Json<PasswordResetConfirmation>,
) -> ApiResult<HttpResponse> {
    let password = NewPassword::new(&payload.password).map_err(credential_invalid)?;
    state
        .auth
        .confirm_password_reset(&payload.token, &password)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Change the signed-in user's password.
#[utoipa::path(
    post,
    path = "/api/v1/users/me/password",
    request_body = PasswordChange,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Weak or wrong password", body = ErrorSchema),
        (status = 401, description = "Not signed in", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "changePassword"
)]
#[post("/users/me/password")]
pub async fn change_password(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<PasswordChange>,
) -> ApiResult<HttpResponse> {
    let principal = session.principal(&state.auth).await?;
    let password = NewPassword::new(&payload.new_password).map_err(credential_invalid)?;
    state
        .auth
        .change_password(&principal, &payload.current_password, &password)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
