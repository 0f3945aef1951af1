//! Domain primitives, aggregates and services.
//!
//! Purpose: define the portal's strongly typed entities, the role and
//! capability model guarding every operation, and the services the HTTP
//! adapter calls. Services talk to infrastructure only through [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable identifiers.
//! - Principal / Permission / Capability: resolved access of a caller.
//! - Vehicle / PriceMatrix / Order / Ticket / Faq / NewsPost: documents.
//! - `*Service`: use cases exposed to inbound adapters.

pub mod access;
pub mod auth;
mod auth_service;
mod catalogue_service;
pub mod company;
pub mod content;
mod content_service;
pub mod error;
pub mod ids;
pub mod invite;
pub mod links;
pub mod localization;
mod onboarding_service;
pub mod order;
mod order_service;
mod organisation_service;
pub mod ports;
mod service_support;
pub mod settings;
mod settings_service;
#[cfg(test)]
pub(crate) mod test_support;
pub mod ticket;
mod ticket_service;
pub mod trace_id;
pub mod upload;
mod upload_service;
pub mod user;
pub mod vehicle;

pub use self::access::{Capability, Permission, Principal, resolve_permission};
pub use self::auth::{CredentialValidationError, LoginCredentials, NewPassword, PASSWORD_MIN_LEN};
pub use self::auth_service::{AuthDeps, AuthService};
pub use self::catalogue_service::{CatalogueService, Quote};
pub use self::company::{Broker, BrokerDraft, Company, CompanyDraft};
pub use self::content::{
    ContentValidationError, Faq, FaqDraft, NewsDraft, NewsPost, sort_faqs, sort_news,
};
pub use self::content_service::ContentService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::ids::{
    BrandId, BrokerId, CompanyId, FaqId, InvalidIdError, InviteId, NewsPostId, OrderId, TicketId,
    UserId, VehicleId,
};
pub use self::invite::{
    CustomerInvite, EmployeeInvite, TOKEN_BYTES, UnknownVerificationKind, Verification,
    VerificationKind, VerificationStateError, VerificationToken, hash_token,
};
pub use self::links::PortalLinks;
pub use self::localization::localized_message;
pub use self::onboarding_service::{
    CustomerInvitation, EmployeeInvitation, InvitationPreview, OnboardingDeps, OnboardingService,
    Registration,
};
pub use self::order::{
    Order, OrderStatus, StatusChange, StepState, TimelineStep, UnknownOrderStatus, step_states,
};
pub use self::order_service::{OrderDeps, OrderRequest, OrderService};
pub use self::organisation_service::{OrganisationService, UserUpdate};
pub use self::settings::{
    DEFAULT_INVITATION_TTL_HOURS, DEFAULT_PASSWORD_RESET_TTL_MINUTES, PortalSettings,
    SettingsValidationError,
};
pub use self::settings_service::SettingsService;
pub use self::ticket::{
    SUBJECT_MAX, Ticket, TicketDraft, TicketMessage, TicketPriority, TicketStatus,
    TicketValidationError, validate_message_body,
};
pub use self::ticket_service::TicketService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::upload::{
    MAX_UPLOAD_BYTES, MediaType, StorageKey, UploadScope, UploadValidationError, validate_upload,
};
pub use self::upload_service::{StoredFile, UploadService};
pub use self::user::{
    EMAIL_MAX, EmailAddress, NAME_MAX, PHONE_MAX, PortalType, Role, UserProfile, UserValidationError,
    validate_name, validate_optional_text, validate_phone,
};
pub use self::vehicle::{
    Brand, CatalogueValidationError, FuelType, PriceMatrix, Vehicle, VehicleCategory,
    VehicleDraft, filter_by_categories,
};

pub(crate) use self::catalogue_service::catalogue_invalid;
pub(crate) use self::content_service::content_invalid;
pub(crate) use self::upload_service::upload_invalid;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use fleet_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
