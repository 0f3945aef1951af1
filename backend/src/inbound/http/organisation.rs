//! Company, broker, user administration and portal settings handlers.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::ports::UserFilter;
use crate::domain::{
    Broker, BrokerDraft, BrokerId, Company, CompanyDraft, CompanyId, PortalSettings, PortalType,
    Role, UserId, UserProfile, UserUpdate,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::parse_email;
use crate::inbound::http::schemas::{
    BrokerSchema, CompanySchema, ErrorSchema, PortalSettingsSchema, UserProfileSchema,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id, parse_optional_id, user_invalid};

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRequest {
    #[schema(example = "Muster GmbH")]
    pub name: String,
    pub street: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub contact_email: Option<String>,
}

impl TryFrom<CompanyRequest> for CompanyDraft {
    type Error = crate::domain::Error;

    fn try_from(value: CompanyRequest) -> Result<Self, Self::Error> {
        CompanyDraft::new(
            &value.name,
            value.street,
            value.postal_code,
            value.city,
            value.contact_email.as_deref(),
        )
        .map_err(|err| user_invalid(err, FieldName::new("contactEmail")))
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BrokerRequest {
    #[schema(example = "Autohaus Becker")]
    pub company_name: String,
    #[schema(example = "Jonas Becker")]
    pub contact_name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl TryFrom<BrokerRequest> for BrokerDraft {
    type Error = crate::domain::Error;

    fn try_from(value: BrokerRequest) -> Result<Self, Self::Error> {
        BrokerDraft::new(
            &value.company_name,
            &value.contact_name,
            &value.email,
            value.phone,
        )
        .map_err(|err| user_invalid(err, FieldName::new("email")))
    }
}

#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct UserQuery {
    #[param(example = "employee")]
    pub role: Option<String>,
    pub company_id: Option<String>,
    pub broker_id: Option<String>,
}

impl TryFrom<UserQuery> for UserFilter {
    type Error = crate::domain::Error;

    fn try_from(value: UserQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            role: value
                .role
                .as_deref()
                .map(str::parse::<Role>)
                .transpose()
                .map_err(|err| user_invalid(err, FieldName::new("role")))?,
            company_id: parse_optional_id(value.company_id.as_deref(), FieldName::new("companyId"))?,
            broker_id: parse_optional_id(value.broker_id.as_deref(), FieldName::new("brokerId"))?,
        })
    }
}

/// Body of `PUT /api/v1/users/{id}`.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdateRequest {
    #[schema(example = "employee")]
    pub role: String,
    pub portal_type: Option<String>,
    pub company_id: Option<String>,
    pub broker_id: Option<String>,
    #[serde(default)]
    pub disabled: bool,
}

impl TryFrom<UserUpdateRequest> for UserUpdate {
    type Error = crate::domain::Error;

    fn try_from(value: UserUpdateRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            role: value
                .role
                .parse::<Role>()
                .map_err(|err| user_invalid(err, FieldName::new("role")))?,
            portal_type: value
                .portal_type
                .as_deref()
                .map(str::parse::<PortalType>)
                .transpose()
                .map_err(|err| user_invalid(err, FieldName::new("portalType")))?,
            company_id: parse_optional_id(value.company_id.as_deref(), FieldName::new("companyId"))?,
            broker_id: parse_optional_id(value.broker_id.as_deref(), FieldName::new("brokerId"))?,
            disabled: value.disabled,
        })
    }
}

/// Body of `PUT /api/v1/settings`.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettingsRequest {
    pub support_email: Option<String>,
    #[schema(example = 72)]
    pub invitation_ttl_hours: u32,
    #[schema(example = 60)]
    pub password_reset_ttl_minutes: u32,
}

impl TryFrom<SettingsRequest> for PortalSettings {
    type Error = crate::domain::Error;

    fn try_from(value: SettingsRequest) -> Result<Self, Self::Error> {
        let support_email = value
            .support_email
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(parse_email)
            .transpose()?;
        Ok(Self {
            support_email,
            invitation_ttl_hours: value.invitation_ttl_hours,
            password_reset_ttl_minutes: value.password_reset_ttl_minutes,
        })
    }
}

fn company_id(raw: &str) -> ApiResult<CompanyId> {
    parse_id(raw, FieldName::new("id"))
}

fn broker_id(raw: &str) -> ApiResult<BrokerId> {
    parse_id(raw, FieldName::new("id"))
}

#[utoipa::path(
    get,
    path = "/api/v1/companies",
    responses(
        (status = 200, description = "Companies by name", body = [CompanySchema]),
        (status = 403, description = "Admins only", body = ErrorSchema)
    ),
    tags = ["organisation"],
    operation_id = "listCompanies"
)]
#[get("/companies")]
pub async fn list_companies(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Company>>> {
    let principal = session.principal(&state.auth).await?;
    Ok(web::Json(state.organisations.list_companies(&principal).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/companies/{id}",
    params(("id" = String, Path, description = "Company id")),
    responses(
        (status = 200, description = "Company", body = CompanySchema),
        (status = 404, description = "Unknown company", body = ErrorSchema)
    ),
    tags = ["organisation"],
    operation_id = "getCompany"
)]
#[get("/companies/{id}")]
pub async fn get_company(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Company>> {
    let principal = session.principal(&state.auth).await?;
    let id = company_id(&path)?;
    Ok(web::Json(state.organisations.get_company(&principal, &id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/companies",
    request_body = CompanyRequest,
    responses(
        (status = 201, description = "Company created", body = CompanySchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Admins only", body = ErrorSchema)
    ),
    tags = ["organisation"],
    operation_id = "createCompany"
)]
#[post("/companies")]
pub async fn create_company(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CompanyRequest>,
) -> ApiResult<HttpResponse> {
    let principal = session.principal(&state.auth).await?;
    let draft = CompanyDraft::try_from(payload.into_inner())?;
    let company = state.organisations.create_company(&principal, draft).await?;
    Ok(HttpResponse::Created().json(company))
}

#[utoipa::path(
    put,
    path = "/api/v1/companies/{id}",
    params(("id" = String, Path, description = "Company id")),
    request_body = CompanyRequest,
    responses(
        (status = 200, description = "Company updated", body = CompanySchema),
        (status = 404, description = "Unknown company", body = ErrorSchema)
    ),
    tags = ["organisation"],
    operation_id = "updateCompany"
)]
#[put("/companies/{id}")]
pub async fn update_company(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<CompanyRequest>,
) -> ApiResult<web::Json<Company>> {
    let principal = session.principal(&state.auth).await?;
    let id = company_id(&path)?;
    let draft = CompanyDraft::try_from(payload.into_inner())?;
    let company = state
        .organisations
        .update_company(&principal, &id, draft)
        .await?;
    Ok(web::Json(company))
}

#[utoipa::path(
    delete,
    path = "/api/v1/companies/{id}",
    params(("id" = String, Path, description = "Company id")),
    responses(
        (status = 204, description = "Company deleted"),
        (status = 404, description = "Unknown company", body = ErrorSchema),
        (status = 409, description = "Company still has users", body = ErrorSchema)
    ),
    tags = ["organisation"],
    operation_id = "deleteCompany"
)]
#[delete("/companies/{id}")]
pub async fn delete_company(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let principal = session.principal(&state.auth).await?;
    let id = company_id(&path)?;
    state.organisations.delete_company(&principal, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    get,
    path = "/api/v1/brokers",
    responses(
        (status = 200, description = "Brokers by company name", body = [BrokerSchema]),
        (status = 403, description = "Admins only", body = ErrorSchema)
    ),
    tags = ["organisation"],
    operation_id = "listBrokers"
)]
#[get("/brokers")]
pub async fn list_brokers(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Broker>>> {
    let principal = session.principal(&state.auth).await?;
    Ok(web::Json(state.organisations.list_brokers(&principal).await?))
}

/// The signed-in broker's own record.
#[utoipa::path(
    get,
    path = "/api/v1/brokers/me",
    responses(
        (status = 200, description = "Own broker record", body = BrokerSchema),
        (status = 403, description = "Brokers only", body = ErrorSchema)
    ),
    tags = ["organisation"],
    operation_id = "ownBroker"
)]
#[get("/brokers/me")]
pub async fn own_broker(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Broker>> {
    let principal = session.principal(&state.auth).await?;
    Ok(web::Json(state.organisations.own_broker(&principal).await?))
}

/// Customers registered for the signed-in broker.
#[utoipa::path(
    get,
    path = "/api/v1/brokers/me/customers",
    responses(
        (status = 200, description = "Customers by name", body = [UserProfileSchema]),
        (status = 403, description = "Brokers only", body = ErrorSchema)
    ),
    tags = ["organisation"],
    operation_id = "brokerCustomers"
)]
#[get("/brokers/me/customers")]
pub async fn broker_customers(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<UserProfile>>> {
    let principal = session.principal(&state.auth).await?;
    Ok(web::Json(state.organisations.broker_customers(&principal).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/brokers/{id}",
    params(("id" = String, Path, description = "Broker id")),
    responses(
        (status = 200, description = "Broker", body = BrokerSchema),
        (status = 404, description = "Unknown broker", body = ErrorSchema)
    ),
    tags = ["organisation"],
    operation_id = "getBroker"
)]
#[get("/brokers/{id}")]
pub async fn get_broker(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Broker>> {
    let principal = session.principal(&state.auth).await?;
    let id = broker_id(&path)?;
    Ok(web::Json(state.organisations.get_broker(&principal, &id).await?))
}

/// Create a broker and invite its contact.
///
/// The broker record is kept when the invitation e-mail fails; the
/// invitation can be re-sent with `POST /brokers/{id}/invitation`.
#[utoipa::path(
    post,
    path = "/api/v1/brokers",
    request_body = BrokerRequest,
    responses(
        (status = 201, description = "Broker created and invited", body = BrokerSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Admins only", body = ErrorSchema),
        (status = 409, description = "E-mail already registered", body = ErrorSchema),
        (status = 503, description = "Invitation e-mail could not be sent", body = ErrorSchema)
    ),
    tags = ["organisation"],
    operation_id = "createBroker"
)]
#[post("/brokers")]
pub async fn create_broker(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<BrokerRequest>,
) -> ApiResult<HttpResponse> {
    let principal = session.principal(&state.auth).await?;
    let draft = BrokerDraft::try_from(payload.into_inner())?;
    let broker = state.organisations.create_broker(&principal, draft).await?;
    state.onboarding.invite_broker(&principal, &broker).await?;
    Ok(HttpResponse::Created().json(broker))
}

/// Re-send the invitation to a broker's contact.
#[utoipa::path(
    post,
    path = "/api/v1/brokers/{id}/invitation",
    params(("id" = String, Path, description = "Broker id")),
    responses(
        (status = 202, description = "Invitation sent"),
        (status = 404, description = "Unknown broker", body = ErrorSchema),
        (status = 409, description = "Contact already registered", body = ErrorSchema),
        (status = 503, description = "Invitation e-mail could not be sent", body = ErrorSchema)
    ),
    tags = ["organisation"],
    operation_id = "inviteBroker"
)]
#[post("/brokers/{id}/invitation")]
pub async fn invite_broker(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let principal = session.principal(&state.auth).await?;
    let id = broker_id(&path)?;
    let broker = state.organisations.get_broker(&principal, &id).await?;
    state.onboarding.invite_broker(&principal, &broker).await?;
    Ok(HttpResponse::Accepted().finish())
}

#[utoipa::path(
    put,
    path = "/api/v1/brokers/{id}",
    params(("id" = String, Path, description = "Broker id")),
    request_body = BrokerRequest,
    responses(
        (status = 200, description = "Broker updated", body = BrokerSchema),
        (status = 404, description = "Unknown broker", body = ErrorSchema)
    ),
    tags = ["organisation"],
    operation_id = "updateBroker"
)]
#[put("/brokers/{id}")]
pub async fn update_broker(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<BrokerRequest>,
) -> ApiResult<web::Json<Broker>> {
    let principal = session.principal(&state.auth).await?;
    let id = broker_id(&path)?;
    let draft = BrokerDraft::try_from(payload.into_inner())?;
    let broker = state
        .organisations
        .update_broker(&principal, &id, draft)
        .await?;
    Ok(web::Json(broker))
}

#[utoipa::path(
    delete,
    path = "/api/v1/brokers/{id}",
    params(("id" = String, Path, description = "Broker id")),
    responses(
        (status = 204, description = "Broker deleted"),
        (status = 404, description = "Unknown broker", body = ErrorSchema),
        (status = 409, description = "Broker still has customers", body = ErrorSchema)
    ),
    tags = ["organisation"],
    operation_id = "deleteBroker"
)]
#[delete("/brokers/{id}")]
pub async fn delete_broker(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let principal = session.principal(&state.auth).await?;
    let id = broker_id(&path)?;
    state.organisations.delete_broker(&principal, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(UserQuery),
    responses(
        (status = 200, description = "Matching users by name", body = [UserProfileSchema]),
        (status = 400, description = "Invalid filter", body = ErrorSchema),
        (status = 403, description = "Admins only", body = ErrorSchema)
    ),
    tags = ["organisation"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<UserQuery>,
) -> ApiResult<web::Json<Vec<UserProfile>>> {
    let principal = session.principal(&state.auth).await?;
    let filter = UserFilter::try_from(query.into_inner())?;
    Ok(web::Json(state.organisations.list_users(&principal, &filter).await?))
}

/// Change a user's role, assignment or disabled flag.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User id")),
    request_body = UserUpdateRequest,
    responses(
        (status = 200, description = "User updated", body = UserProfileSchema),
        (status = 400, description = "Invalid assignment", body = ErrorSchema),
        (status = 403, description = "Admins only", body = ErrorSchema),
        (status = 404, description = "Unknown user", body = ErrorSchema),
        (status = 409, description = "Admins may not lock themselves out", body = ErrorSchema)
    ),
    tags = ["organisation"],
    operation_id = "updateUser"
)]
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UserUpdateRequest>,
) -> ApiResult<web::Json<UserProfile>> {
    let principal = session.principal(&state.auth).await?;
    let id: UserId = parse_id(&path, FieldName::new("id"))?;
    let update = UserUpdate::try_from(payload.into_inner())?;
    let profile = state
        .organisations
        .update_user(&principal, &id, update)
        .await?;
    Ok(web::Json(profile))
}

#[utoipa::path(
    get,
    path = "/api/v1/settings",
    responses(
        (status = 200, description = "Portal settings", body = PortalSettingsSchema),
        (status = 403, description = "Admins only", body = ErrorSchema)
    ),
    tags = ["organisation"],
    operation_id = "getSettings"
)]
#[get("/settings")]
pub async fn get_settings(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<PortalSettings>> {
    let principal = session.principal(&state.auth).await?;
    Ok(web::Json(state.settings.get(&principal).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/settings",
    request_body = SettingsRequest,
    responses(
        (status = 200, description = "Settings saved", body = PortalSettingsSchema),
        (status = 400, description = "Durations must be positive", body = ErrorSchema),
        (status = 403, description = "Admins only", body = ErrorSchema)
    ),
    tags = ["organisation"],
    operation_id = "updateSettings"
)]
#[put("/settings")]
pub async fn update_settings(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SettingsRequest>,
) -> ApiResult<web::Json<PortalSettings>> {
    let principal = session.principal(&state.auth).await?;
    let settings = PortalSettings::try_from(payload.into_inner())?;
    Ok(web::Json(state.settings.update(&principal, settings).await?))
}
