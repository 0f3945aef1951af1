use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{EmailMessage, Mailer, MailerError};

/// Mailer used when no provider key is configured.
///
/// Logs the recipient, template and parameter names. Parameter values can
/// hold one-time links, so only `link` is logged in debug builds.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingMailer;

#[async_trait]
impl Mailer for LoggingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailerError> {
        let params: Vec<&str> = message.params.keys().map(String::as_str).collect();
        info!(
            to = %message.to,
            template = message.template.as_str(),
            ?params,
            "e-mail not sent: no provider configured"
        );
        if cfg!(debug_assertions) {
            if let Some(link) = message.params.get("link") {
                info!(%link, "e-mail link");
            }
        }
        Ok(())
    }
}
