//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] collects every `/api/v1` handler together with the schema
//! wrappers from [`crate::inbound::http::schemas`], so domain types stay free
//! of utoipa derives. The document is served by Swagger UI in debug builds and
//! exported with `cargo run --bin openapi-dump`.

use crate::inbound::http::auth::{
    LoginRequest, PasswordChange, PasswordResetConfirmation, PasswordResetRequest,
};
use crate::inbound::http::catalogue::{BrandRequest, PriceMatrixRequest, VehicleRequest};
use crate::inbound::http::content::{FaqRequest, NewsRequest};
use crate::inbound::http::onboarding::{
    CustomerInviteRequest, EmployeeInviteRequest, RegistrationRequest,
};
use crate::inbound::http::orders::{CreateOrderRequest, OrderStatusRequest};
use crate::inbound::http::organisation::{
    BrokerRequest, CompanyRequest, SettingsRequest, UserUpdateRequest,
};
use crate::inbound::http::schemas::{
    BrandSchema, BrokerSchema, CompanySchema, CurrentUserSchema, CustomerInviteSchema,
    EmployeeInviteSchema, ErrorCodeSchema, ErrorSchema, FaqSchema, InvitationPreviewSchema,
    NewsPostSchema, OrderSchema, PortalSettingsSchema, PriceMatrixSchema, QuoteSchema,
    TicketMessageSchema, TicketSchema, TimelineStepSchema, UserProfileSchema, VehicleSchema,
};
use crate::inbound::http::tickets::{TicketMessageRequest, TicketRequest, TicketStatusRequest};
use crate::inbound::http::uploads::UploadResponse;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the portal API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Fleet portal API",
        description = "Role-based portal for company-car leasing: onboarding, catalogue, orders, support and content."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::current_user,
        crate::inbound::http::auth::change_password,
        crate::inbound::http::auth::request_password_reset,
        crate::inbound::http::auth::confirm_password_reset,
        crate::inbound::http::onboarding::invite_employee,
        crate::inbound::http::onboarding::invite_customer,
        crate::inbound::http::onboarding::pending_customer_invites,
        crate::inbound::http::onboarding::verify_invitation,
        crate::inbound::http::onboarding::register,
        crate::inbound::http::organisation::list_companies,
        crate::inbound::http::organisation::get_company,
        crate::inbound::http::organisation::create_company,
        crate::inbound::http::organisation::update_company,
        crate::inbound::http::organisation::delete_company,
        crate::inbound::http::organisation::list_brokers,
        crate::inbound::http::organisation::own_broker,
        crate::inbound::http::organisation::broker_customers,
        crate::inbound::http::organisation::get_broker,
        crate::inbound::http::organisation::create_broker,
        crate::inbound::http::organisation::invite_broker,
        crate::inbound::http::organisation::update_broker,
        crate::inbound::http::organisation::delete_broker,
        crate::inbound::http::organisation::list_users,
        crate::inbound::http::organisation::update_user,
        crate::inbound::http::organisation::get_settings,
        crate::inbound::http::organisation::update_settings,
        crate::inbound::http::catalogue::list_brands,
        crate::inbound::http::catalogue::get_brand,
        crate::inbound::http::catalogue::create_brand,
        crate::inbound::http::catalogue::update_brand,
        crate::inbound::http::catalogue::delete_brand,
        crate::inbound::http::catalogue::list_vehicles,
        crate::inbound::http::catalogue::get_vehicle,
        crate::inbound::http::catalogue::create_vehicle,
        crate::inbound::http::catalogue::update_vehicle,
        crate::inbound::http::catalogue::delete_vehicle,
        crate::inbound::http::catalogue::quote_vehicle,
        crate::inbound::http::orders::list_orders,
        crate::inbound::http::orders::create_order,
        crate::inbound::http::orders::get_order,
        crate::inbound::http::orders::update_order_status,
        crate::inbound::http::orders::delete_order,
        crate::inbound::http::tickets::list_tickets,
        crate::inbound::http::tickets::open_ticket,
        crate::inbound::http::tickets::get_ticket,
        crate::inbound::http::tickets::add_ticket_message,
        crate::inbound::http::tickets::set_ticket_status,
        crate::inbound::http::content::list_faqs,
        crate::inbound::http::content::create_faq,
        crate::inbound::http::content::update_faq,
        crate::inbound::http::content::delete_faq,
        crate::inbound::http::content::list_news,
        crate::inbound::http::content::get_news,
        crate::inbound::http::content::create_news,
        crate::inbound::http::content::update_news,
        crate::inbound::http::content::delete_news,
        crate::inbound::http::uploads::upload,
        crate::inbound::http::uploads::download,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        UserProfileSchema,
        CurrentUserSchema,
        CompanySchema,
        BrokerSchema,
        EmployeeInviteSchema,
        CustomerInviteSchema,
        InvitationPreviewSchema,
        PortalSettingsSchema,
        BrandSchema,
        PriceMatrixSchema,
        VehicleSchema,
        QuoteSchema,
        OrderSchema,
        TimelineStepSchema,
        TicketSchema,
        TicketMessageSchema,
        FaqSchema,
        NewsPostSchema,
        UploadResponse,
        LoginRequest,
        PasswordChange,
        PasswordResetRequest,
        PasswordResetConfirmation,
        EmployeeInviteRequest,
        CustomerInviteRequest,
        RegistrationRequest,
        CompanyRequest,
        BrokerRequest,
        UserUpdateRequest,
        SettingsRequest,
        BrandRequest,
        PriceMatrixRequest,
        VehicleRequest,
        CreateOrderRequest,
        OrderStatusRequest,
        TicketRequest,
        TicketMessageRequest,
        TicketStatusRequest,
        FaqRequest,
        NewsRequest,
    )),
    tags(
        (name = "auth", description = "Sign-in, sessions and passwords"),
        (name = "onboarding", description = "Invitations and self-registration"),
        (name = "organisation", description = "Companies, brokers, users and portal settings"),
        (name = "catalogue", description = "Brands, vehicles and leasing quotes"),
        (name = "orders", description = "Vehicle orders and their delivery timeline"),
        (name = "tickets", description = "Support tickets"),
        (name = "content", description = "FAQ and news"),
        (name = "uploads", description = "File uploads and downloads"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
