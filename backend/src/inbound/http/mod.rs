//! HTTP inbound adapter exposing the portal's REST endpoints.
//!
//! Handlers are grouped by area; [`configure_api`] mounts all of them on a
//! scope so the server and the tests register the same routes.

pub mod auth;
pub mod catalogue;
pub mod content;
pub mod error;
pub mod health;
pub mod onboarding;
pub mod orders;
pub mod organisation;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod tickets;
pub mod uploads;
pub mod validation;

use actix_web::web;

pub use error::ApiResult;

/// Register every `/api/v1` handler and extractor config on `cfg`.
///
/// Literal paths such as `/brokers/me` are registered before their
/// `/{id}` siblings so they are not captured as identifiers.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(validation::json_config())
        .app_data(validation::query_config())
        .app_data(uploads::payload_config())
        // auth
        .service(auth::login)
        .service(auth::logout)
        .service(auth::current_user)
        .service(auth::change_password)
        .service(auth::request_password_reset)
        .service(auth::confirm_password_reset)
        // onboarding
        .service(onboarding::invite_employee)
        .service(onboarding::invite_customer)
        .service(onboarding::pending_customer_invites)
        .service(onboarding::verify_invitation)
        .service(onboarding::register)
        // organisation
        .service(organisation::list_companies)
        .service(organisation::create_company)
        .service(organisation::get_company)
        .service(organisation::update_company)
        .service(organisation::delete_company)
        .service(organisation::list_brokers)
        .service(organisation::create_broker)
        .service(organisation::own_broker)
        .service(organisation::broker_customers)
        .service(organisation::get_broker)
        .service(organisation::update_broker)
        .service(organisation::delete_broker)
        .service(organisation::invite_broker)
        .service(organisation::list_users)
        .service(organisation::update_user)
        .service(organisation::get_settings)
        .service(organisation::update_settings)
        // catalogue
        .service(catalogue::list_brands)
        .service(catalogue::create_brand)
        .service(catalogue::get_brand)
        .service(catalogue::update_brand)
        .service(catalogue::delete_brand)
        .service(catalogue::list_vehicles)
        .service(catalogue::create_vehicle)
        .service(catalogue::get_vehicle)
        .service(catalogue::update_vehicle)
        .service(catalogue::delete_vehicle)
        .service(catalogue::quote_vehicle)
        // orders
        .service(orders::list_orders)
        .service(orders::create_order)
        .service(orders::get_order)
        .service(orders::update_order_status)
        .service(orders::delete_order)
        // tickets
        .service(tickets::list_tickets)
        .service(tickets::open_ticket)
        .service(tickets::get_ticket)
        .service(tickets::add_ticket_message)
        .service(tickets::set_ticket_status)
        // content
        .service(content::list_faqs)
        .service(content::create_faq)
        .service(content::update_faq)
        .service(content::delete_faq)
        .service(content::list_news)
        .service(content::create_news)
        .service(content::get_news)
        .service(content::update_news)
        .service(content::delete_news)
        // uploads
        .service(uploads::upload)
        .service(uploads::download);
}
