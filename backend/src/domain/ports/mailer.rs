//! Port for transactional e-mail.
//!
//! Messages reference provider-side templates; the backend only supplies the
//! template parameters.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::EmailAddress;

use super::define_port_error;

define_port_error! {
    /// Errors raised by mail adapters.
    pub enum MailerError {
        /// The provider could not be reached.
        Transport { message: String } => "mail transport failed: {message}",
        /// The provider rejected the message.
        Rejected { status: u16, message: String } =>
            "mail provider rejected message with status {status}: {message}",
        /// No template id is configured for the message kind.
        MissingTemplate { template: String } =>
            "no template configured for {template}",
    }
}

/// Kinds of transactional e-mail the portal sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmailTemplate {
    EmployeeInvitation,
    CustomerInvitation,
    BrokerInvitation,
    PasswordReset,
    Welcome,
    OrderStatusChanged,
}

impl EmailTemplate {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmployeeInvitation => "employee_invitation",
            Self::CustomerInvitation => "customer_invitation",
            Self::BrokerInvitation => "broker_invitation",
            Self::PasswordReset => "password_reset",
            Self::Welcome => "welcome",
            Self::OrderStatusChanged => "order_status_changed",
        }
    }
}

/// One outgoing templated e-mail.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub to: EmailAddress,
    pub to_name: Option<String>,
    pub template: EmailTemplate,
    pub params: Map<String, Value>,
}

impl EmailMessage {
    pub fn new(to: EmailAddress, template: EmailTemplate) -> Self {
        Self {
            to,
            to_name: None,
            template,
            params: Map::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.to_name = Some(name.into());
        self
    }

    pub fn with_param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.to_owned(), value.into());
        self
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailerError>;
}
