//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.
//!
//! The schema wrappers mirror the JSON shape of their domain counterparts but
//! live in the inbound adapter layer where framework concerns belong.

#![expect(
    dead_code,
    reason = "Schema wrappers are only read by utoipa when generating the document"
)]

use utoipa::ToSchema;

/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist or is hidden from the caller.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request clashes with existing state, e.g. a taken e-mail address.
    #[schema(rename = "conflict")]
    Conflict,
    /// A backing service (database, mail provider, storage) is unreachable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// API error response payload.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
pub struct ErrorSchema {
    #[schema(example = "conflict")]
    code: ErrorCodeSchema,
    /// Developer-facing message.
    #[schema(example = "email already registered")]
    message: String,
    /// Correlation identifier, also sent as the `trace-id` header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// `{ field, code }` for validation failures.
    details: Option<serde_json::Value>,
    /// German message shown to portal users.
    #[schema(example = "Diese E-Mail-Adresse wird bereits verwendet.")]
    localized_message: String,
}

/// Portal account profile.
#[derive(ToSchema)]
#[schema(as = crate::domain::UserProfile, rename_all = "camelCase")]
pub struct UserProfileSchema {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    id: String,
    #[schema(example = "anna.schmidt@firma.de")]
    email: String,
    first_name: String,
    last_name: String,
    /// `admin`, `employee`, `broker` or `customer`.
    #[schema(example = "employee")]
    role: String,
    /// `normal` or `salary`; employees only.
    #[schema(example = "salary")]
    portal_type: Option<String>,
    company_id: Option<String>,
    broker_id: Option<String>,
    phone: Option<String>,
    disabled: bool,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
}

/// Signed-in profile with its resolved permission.
#[derive(ToSchema)]
#[schema(as = crate::inbound::http::auth::CurrentUser, rename_all = "camelCase")]
pub struct CurrentUserSchema {
    profile: UserProfileSchema,
    /// `admin`, `employee`, `salary_employee`, `broker` or `customer`.
    #[schema(example = "salary_employee")]
    permission: String,
}

#[derive(ToSchema)]
#[schema(as = crate::domain::Brand, rename_all = "camelCase")]
pub struct BrandSchema {
    id: String,
    #[schema(example = "Volkswagen")]
    name: String,
    #[schema(example = "brands/8d1c0d5e-3b9e-4d53-9a57-0d8e8f3b1f7a.png")]
    logo_key: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
}

/// Monthly rates in cents; `monthlyRatesCents[d][m]` is the rate for
/// `durationsMonths[d]` and `annualMileagesKm[m]`.
#[derive(ToSchema)]
#[schema(as = crate::domain::PriceMatrix, rename_all = "camelCase")]
pub struct PriceMatrixSchema {
    #[schema(example = json!([24, 36, 48]))]
    durations_months: Vec<u16>,
    #[schema(example = json!([10000, 15000]))]
    annual_mileages_km: Vec<u32>,
    #[schema(example = json!([[45900, 48900], [41900, 44900], [38900, 41900]]))]
    monthly_rates_cents: Vec<Vec<i64>>,
}

#[derive(ToSchema)]
#[schema(as = crate::domain::Vehicle, rename_all = "camelCase")]
pub struct VehicleSchema {
    id: String,
    brand_id: String,
    #[schema(example = "ID.4")]
    model: String,
    variant: Option<String>,
    /// `petrol`, `diesel`, `hybrid`, `plug_in_hybrid` or `electric`.
    #[schema(example = "electric")]
    fuel_type: String,
    power_kw: Option<u32>,
    list_price_cents: i64,
    /// Any of `regular`, `company`, `salary`.
    #[schema(example = json!(["company", "salary"]))]
    categories: Vec<String>,
    price_matrix: PriceMatrixSchema,
    image_keys: Vec<String>,
    description: Option<String>,
    available: bool,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
    #[schema(value_type = String, format = DateTime)]
    updated_at: String,
}

#[derive(ToSchema)]
#[schema(as = crate::domain::Quote, rename_all = "camelCase")]
pub struct QuoteSchema {
    vehicle_id: String,
    #[schema(example = 36)]
    duration_months: u16,
    #[schema(example = 15000)]
    annual_mileage_km: u32,
    #[schema(example = 44900)]
    monthly_rate_cents: i64,
}

#[derive(ToSchema)]
#[schema(as = crate::domain::TimelineStep, rename_all = "camelCase")]
pub struct TimelineStepSchema {
    #[schema(example = "contract_created")]
    status: String,
    #[schema(example = "Vertrag erstellt")]
    label: String,
    /// `completed`, `current` or `upcoming`.
    #[schema(example = "current")]
    state: String,
    #[schema(value_type = Option<String>, format = DateTime)]
    reached_at: Option<String>,
}

/// Order document with its display timeline.
#[derive(ToSchema)]
#[schema(as = crate::inbound::http::orders::OrderView, rename_all = "camelCase")]
pub struct OrderSchema {
    id: String,
    vehicle_id: String,
    ordered_by: String,
    company_id: Option<String>,
    broker_id: Option<String>,
    duration_months: u16,
    annual_mileage_km: u32,
    monthly_rate_cents: i64,
    /// `credit_check_started`, `credit_check_approved`, `contract_created`,
    /// `contract_signed`, `vehicle_ordered` or `delivered`.
    #[schema(example = "credit_check_started")]
    status: String,
    /// `[{ status, at }]` in the order reached.
    status_history: Vec<serde_json::Value>,
    notes: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
    #[schema(value_type = String, format = DateTime)]
    updated_at: String,
    timeline: Vec<TimelineStepSchema>,
}

#[derive(ToSchema)]
#[schema(as = crate::domain::TicketMessage, rename_all = "camelCase")]
pub struct TicketMessageSchema {
    author_id: String,
    body: String,
    #[schema(value_type = String, format = DateTime)]
    at: String,
}

#[derive(ToSchema)]
#[schema(as = crate::domain::Ticket, rename_all = "camelCase")]
pub struct TicketSchema {
    id: String,
    created_by: String,
    subject: String,
    description: String,
    /// `open`, `in_progress` or `closed`.
    #[schema(example = "open")]
    status: String,
    /// `low`, `normal` or `high`.
    #[schema(example = "normal")]
    priority: String,
    attachment_keys: Vec<String>,
    messages: Vec<TicketMessageSchema>,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
    #[schema(value_type = String, format = DateTime)]
    updated_at: String,
}

#[derive(ToSchema)]
#[schema(as = crate::domain::Faq, rename_all = "camelCase")]
pub struct FaqSchema {
    id: String,
    question: String,
    /// Opaque HTML.
    answer_html: String,
    category: Option<String>,
    position: i32,
    image_key: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
}

#[derive(ToSchema)]
#[schema(as = crate::domain::NewsPost, rename_all = "camelCase")]
pub struct NewsPostSchema {
    id: String,
    title: String,
    /// Opaque HTML.
    body_html: String,
    image_key: Option<String>,
    published: bool,
    #[schema(value_type = Option<String>, format = DateTime)]
    published_at: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
}

#[derive(ToSchema)]
#[schema(as = crate::domain::Company, rename_all = "camelCase")]
pub struct CompanySchema {
    id: String,
    #[schema(example = "Muster GmbH")]
    name: String,
    street: Option<String>,
    postal_code: Option<String>,
    city: Option<String>,
    contact_email: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
}

#[derive(ToSchema)]
#[schema(as = crate::domain::Broker, rename_all = "camelCase")]
pub struct BrokerSchema {
    id: String,
    company_name: String,
    contact_name: String,
    email: String,
    phone: Option<String>,
    /// Portal account of the contact once registered.
    user_id: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
}

#[derive(ToSchema)]
#[schema(as = crate::domain::EmployeeInvite, rename_all = "camelCase")]
pub struct EmployeeInviteSchema {
    id: String,
    email: String,
    company_id: String,
    #[schema(example = "normal")]
    portal_type: String,
    invited_by: String,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
    #[schema(value_type = Option<String>, format = DateTime)]
    accepted_at: Option<String>,
}

#[derive(ToSchema)]
#[schema(as = crate::domain::CustomerInvite, rename_all = "camelCase")]
pub struct CustomerInviteSchema {
    id: String,
    email: String,
    first_name: Option<String>,
    last_name: Option<String>,
    broker_id: String,
    invited_by: String,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
    #[schema(value_type = Option<String>, format = DateTime)]
    accepted_at: Option<String>,
}

/// What an invitation link grants, shown before registration.
#[derive(ToSchema)]
#[schema(as = crate::domain::InvitationPreview, rename_all = "camelCase")]
pub struct InvitationPreviewSchema {
    /// `employee_invite`, `customer_invite` or `broker_invite`.
    #[schema(example = "employee_invite")]
    kind: String,
    email: String,
    role: String,
    first_name: Option<String>,
    last_name: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    expires_at: String,
}

#[derive(ToSchema)]
#[schema(as = crate::domain::PortalSettings, rename_all = "camelCase")]
pub struct PortalSettingsSchema {
    support_email: Option<String>,
    #[schema(example = 72)]
    invitation_ttl_hours: u32,
    #[schema(example = 60)]
    password_reset_ttl_minutes: u32,
}
