//! Invitation and registration handlers.
//!
//! ```text
//! POST /api/v1/invites/employees {"email":"…","companyId":"…","portalType":"salary"}
//! POST /api/v1/invites/customers {"email":"…","firstName":"…","brokerId":"…"}
//! GET  /api/v1/invites/customers
//! GET  /api/v1/verifications/{token}
//! POST /api/v1/register {"token":"…","password":"…","firstName":"…","lastName":"…"}
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::Deserialize;
use zeroize::Zeroizing;

use crate::domain::{
    CustomerInvitation, CustomerInvite, EmployeeInvitation, InvitationPreview, NewPassword,
    PortalType, Registration, validate_name, validate_phone,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{CurrentUser, parse_email};
use crate::inbound::http::schemas::{
    CurrentUserSchema, CustomerInviteSchema, EmployeeInviteSchema, ErrorSchema,
    InvitationPreviewSchema,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, credential_invalid, parse_id, parse_optional_id, user_invalid,
};

/// Body of `POST /api/v1/invites/employees`.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeInviteRequest {
    pub email: String,
    pub company_id: String,
    /// `normal` or `salary`.
    #[schema(example = "normal")]
    pub portal_type: String,
}

/// Body of `POST /api/v1/invites/customers`.
///
/// `brokerId` is required when an admin invites on a broker's behalf and
/// ignored for brokers, who always invite for themselves.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInviteRequest {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub broker_id: Option<String>,
}

/// Body of `POST /api/v1/register`.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub token: String,
    #[schema(value_type = String, format = Password)]
    pub password: Zeroizing<String>,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
}

fn optional_name(raw: Option<String>, field: &'static str) -> ApiResult<Option<String>> {
    raw.filter(|value| !value.trim().is_empty())
        .map(|value| validate_name(&value, field).map_err(|err| user_invalid(err, FieldName::new(field))))
        .transpose()
}

impl TryFrom<EmployeeInviteRequest> for EmployeeInvitation {
    type Error = crate::domain::Error;

    fn try_from(value: EmployeeInviteRequest) -> Result<Self, Self::Error> {
        let portal_type = value
            .portal_type
            .parse::<PortalType>()
            .map_err(|err| user_invalid(err, FieldName::new("portalType")))?;
        Ok(Self {
            email: parse_email(&value.email)?,
            company_id: parse_id(&value.company_id, FieldName::new("companyId"))?,
            portal_type,
        })
    }
}

impl TryFrom<CustomerInviteRequest> for CustomerInvitation {
    type Error = crate::domain::Error;

    fn try_from(value: CustomerInviteRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            email: parse_email(&value.email)?,
            first_name: optional_name(value.first_name, "firstName")?,
            last_name: optional_name(value.last_name, "lastName")?,
            broker_id: parse_optional_id(value.broker_id.as_deref(), FieldName::new("brokerId"))?,
        })
    }
}

impl TryFrom<RegistrationRequest> for Registration {
    type Error = crate::domain::Error;

    fn try_from(value: RegistrationRequest) -> Result<Self, Self::Error> {
        let first_name = validate_name(&value.first_name, "firstName")
            .map_err(|err| user_invalid(err, FieldName::new("firstName")))?;
        let last_name = validate_name(&value.last_name, "lastName")
            .map_err(|err| user_invalid(err, FieldName::new("lastName")))?;
        let phone = validate_phone(value.phone)
            .map_err(|err| user_invalid(err, FieldName::new("phone")))?;
        Ok(Self {
            password: NewPassword::new(&value.password).map_err(credential_invalid)?,
            token: value.token,
            first_name,
            last_name,
            phone,
        })
    }
}

/// Invite an employee of a company.
#[utoipa::path(
    post,
    path = "/api/v1/invites/employees",
    request_body = EmployeeInviteRequest,
    responses(
        (status = 201, description = "Invitation sent", body = EmployeeInviteSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Admins only", body = ErrorSchema),
        (status = 409, description = "E-mail already registered", body = ErrorSchema),
        (status = 503, description = "Invitation e-mail could not be sent", body = ErrorSchema)
    ),
    tags = ["onboarding"],
    operation_id = "inviteEmployee"
)]
#[post("/invites/employees")]
pub async fn invite_employee(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<EmployeeInviteRequest>,
) -> ApiResult<HttpResponse> {
    let principal = session.principal(&state.auth).await?;
    let request = EmployeeInvitation::try_from(payload.into_inner())?;
    let invite = state.onboarding.invite_employee(&principal, request).await?;
    Ok(HttpResponse::Created().json(invite))
}

/// Invite a customer for a broker.
#[utoipa::path(
    post,
    path = "/api/v1/invites/customers",
    request_body = CustomerInviteRequest,
    responses(
        (status = 201, description = "Invitation sent", body = CustomerInviteSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Brokers and admins only", body = ErrorSchema),
        (status = 409, description = "E-mail already registered", body = ErrorSchema),
        (status = 503, description = "Invitation e-mail could not be sent", body = ErrorSchema)
    ),
    tags = ["onboarding"],
    operation_id = "inviteCustomer"
)]
#[post("/invites/customers")]
pub async fn invite_customer(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CustomerInviteRequest>,
) -> ApiResult<HttpResponse> {
    let principal = session.principal(&state.auth).await?;
    let request = CustomerInvitation::try_from(payload.into_inner())?;
    let invite = state.onboarding.invite_customer(&principal, request).await?;
    Ok(HttpResponse::Created().json(invite))
}

/// Customer invitations not yet accepted.
#[utoipa::path(
    get,
    path = "/api/v1/invites/customers",
    responses(
        (status = 200, description = "Pending invitations", body = [CustomerInviteSchema]),
        (status = 401, description = "Not signed in", body = ErrorSchema),
        (status = 403, description = "Brokers and admins only", body = ErrorSchema)
    ),
    tags = ["onboarding"],
    operation_id = "pendingCustomerInvites"
)]
#[get("/invites/customers")]
pub async fn pending_customer_invites(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<CustomerInvite>>> {
    let principal = session.principal(&state.auth).await?;
    let invites = state.onboarding.pending_customer_invites(&principal).await?;
    Ok(web::Json(invites))
}

/// Check an invitation link before showing the registration form.
#[utoipa::path(
    get,
    path = "/api/v1/verifications/{token}",
    params(("token" = String, Path, description = "Token from the invitation link")),
    responses(
        (status = 200, description = "Invitation details", body = InvitationPreviewSchema),
        (status = 400, description = "Link expired", body = ErrorSchema),
        (status = 404, description = "Unknown link", body = ErrorSchema),
        (status = 409, description = "Link already used", body = ErrorSchema)
    ),
    tags = ["onboarding"],
    operation_id = "verifyInvitation",
    security([])
)]
#[get("/verifications/{token}")]
pub async fn verify_invitation(
    state: web::Data<HttpState>,
    token: web::Path<String>,
) -> ApiResult<web::Json<InvitationPreview>> {
    let preview = state.onboarding.verify(&token).await?;
    Ok(web::Json(preview))
}

/// Create the invited account and sign it in.
#[utoipa::path(
    post,
    path = "/api/v1/register",
    request_body = RegistrationRequest,
    responses(
        (status = 201, description = "Account created", body = CurrentUserSchema),
        (status = 400, description = "Invalid form or expired link", body = ErrorSchema),
        (status = 404, description = "Unknown link", body = ErrorSchema),
        (status = 409, description = "Link used or e-mail taken", body = ErrorSchema)
    ),
    tags = ["onboarding"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegistrationRequest>,
) -> ApiResult<HttpResponse> {
    let registration = Registration::try_from(payload.into_inner())?;
    let principal = state.onboarding.register(registration).await?;
    session.persist_user(&principal.profile.id)?;
    Ok(HttpResponse::Created().json(CurrentUser::from(principal)))
}
