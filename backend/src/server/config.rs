//! Portal configuration loaded via OrthoConfig and the HTTP server settings
//! derived from it.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;
use zeroize::Zeroizing;

use fleet_backend::domain::ports::EmailTemplate;
use fleet_backend::domain::{EmailAddress, NewPassword};
use fleet_backend::inbound::http::state::HttpState;

const DEFAULT_BIND_HOST: &str = "0.0.0.0";
const DEFAULT_STORAGE_DIR: &str = "/var/lib/portal/uploads";
const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:8080/";
const DEFAULT_SENDER_NAME: &str = "Leasing Portal";

/// Invalid or incomplete configuration values.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
    #[error("{field} is required when {because} is set")]
    Missing {
        field: &'static str,
        because: &'static str,
    },
}

impl ConfigError {
    fn invalid(field: &'static str, message: impl ToString) -> Self {
        Self::Invalid {
            field,
            message: message.to_string(),
        }
    }
}

/// Values controlling persistence, storage, mail and startup seeding.
///
/// Every field can be set with a `PORTAL_*` environment variable or the
/// matching command-line flag.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PORTAL")]
pub struct PortalConfig {
    /// Interface the HTTP server binds to.
    pub bind_host: Option<String>,
    /// Port the HTTP server listens on.
    #[ortho_config(default = 8080)]
    pub port: u16,
    /// PostgreSQL connection string; the in-memory store is used when unset.
    pub database_url: Option<String>,
    /// Root directory for uploaded files.
    pub storage_dir: Option<PathBuf>,
    /// Base URL of the portal UI, used for links in e-mails.
    pub public_base_url: Option<String>,
    /// Brevo API key; e-mails are only logged when unset.
    pub brevo_api_key: Option<String>,
    pub mail_sender_email: Option<String>,
    pub mail_sender_name: Option<String>,
    pub template_employee_invitation: Option<i64>,
    pub template_customer_invitation: Option<i64>,
    pub template_broker_invitation: Option<i64>,
    pub template_password_reset: Option<i64>,
    pub template_welcome: Option<i64>,
    pub template_order_status_changed: Option<i64>,
    /// Administrator created at startup when no account uses this address.
    pub bootstrap_admin_email: Option<String>,
    pub bootstrap_admin_password: Option<String>,
}

/// Validated Brevo transport settings.
pub struct MailConfig {
    pub api_key: Zeroizing<String>,
    pub sender_email: EmailAddress,
    pub sender_name: String,
    pub templates: HashMap<EmailTemplate, i64>,
}

impl PortalConfig {
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let host: IpAddr = self
            .bind_host
            .as_deref()
            .unwrap_or(DEFAULT_BIND_HOST)
            .parse()
            .map_err(|err| ConfigError::invalid("bind_host", err))?;
        Ok(SocketAddr::new(host, self.port))
    }

    pub fn storage_dir(&self) -> PathBuf {
        self.storage_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR))
    }

    pub fn public_base_url(&self) -> Result<Url, ConfigError> {
        Url::parse(
            self.public_base_url
                .as_deref()
                .unwrap_or(DEFAULT_PUBLIC_BASE_URL),
        )
        .map_err(|err| ConfigError::invalid("public_base_url", err))
    }

    /// Brevo settings, or `None` when no API key is configured.
    pub fn mail(&self) -> Result<Option<MailConfig>, ConfigError> {
        let Some(api_key) = self.brevo_api_key.as_deref().filter(|key| !key.is_empty()) else {
            return Ok(None);
        };
        let sender = self
            .mail_sender_email
            .as_deref()
            .ok_or(ConfigError::Missing {
                field: "mail_sender_email",
                because: "brevo_api_key",
            })?;
        let sender_email = EmailAddress::new(sender)
            .map_err(|err| ConfigError::invalid("mail_sender_email", err))?;
        Ok(Some(MailConfig {
            api_key: Zeroizing::new(api_key.to_owned()),
            sender_email,
            sender_name: self
                .mail_sender_name
                .clone()
                .unwrap_or_else(|| DEFAULT_SENDER_NAME.to_owned()),
            templates: self.templates(),
        }))
    }

    fn templates(&self) -> HashMap<EmailTemplate, i64> {
        [
            (
                EmailTemplate::EmployeeInvitation,
                self.template_employee_invitation,
            ),
            (
                EmailTemplate::CustomerInvitation,
                self.template_customer_invitation,
            ),
            (
                EmailTemplate::BrokerInvitation,
                self.template_broker_invitation,
            ),
            (EmailTemplate::PasswordReset, self.template_password_reset),
            (EmailTemplate::Welcome, self.template_welcome),
            (
                EmailTemplate::OrderStatusChanged,
                self.template_order_status_changed,
            ),
        ]
        .into_iter()
        .filter_map(|(template, id)| id.map(|id| (template, id)))
        .collect()
    }

    /// Credentials of the startup administrator, when both are set.
    pub fn bootstrap_admin(&self) -> Result<Option<(EmailAddress, NewPassword)>, ConfigError> {
        let (Some(email), Some(password)) = (
            self.bootstrap_admin_email.as_deref(),
            self.bootstrap_admin_password.as_deref(),
        ) else {
            return Ok(None);
        };
        let email = EmailAddress::new(email)
            .map_err(|err| ConfigError::invalid("bootstrap_admin_email", err))?;
        let password = NewPassword::new(password)
            .map_err(|err| ConfigError::invalid("bootstrap_admin_password", err))?;
        Ok(Some((email, password)))
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) http_state: HttpState,
}

impl ServerConfig {
    #[must_use]
    pub fn new(
        key: Key,
        cookie_secure: bool,
        same_site: SameSite,
        bind_addr: SocketAddr,
        http_state: HttpState,
    ) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            http_state,
        }
    }
}
