//! Transactional e-mail adapters: Brevo over HTTPS, or a logging fallback.

mod brevo;
mod logging;

pub use brevo::{BREVO_SMTP_ENDPOINT, BrevoMailer, BrevoSettings};
pub use logging::LoggingMailer;
