//! Reqwest-backed Brevo transactional e-mail adapter.
//!
//! The adapter owns transport details only: template id lookup, request
//! serialisation, timeout and HTTP status mapping. Content lives in the
//! provider-side templates.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;
use zeroize::Zeroizing;

use crate::domain::EmailAddress;
use crate::domain::ports::{EmailMessage, EmailTemplate, Mailer, MailerError};

/// Production endpoint for transactional e-mail.
pub const BREVO_SMTP_ENDPOINT: &str = "https://api.brevo.com/v3/smtp/email";

/// Sender identity and template ids for [`BrevoMailer`].
pub struct BrevoSettings {
    pub api_key: Zeroizing<String>,
    pub sender_email: EmailAddress,
    pub sender_name: String,
    pub templates: HashMap<EmailTemplate, i64>,
}

pub struct BrevoMailer {
    client: Client,
    endpoint: Url,
    settings: BrevoSettings,
}

impl BrevoMailer {
    /// Build an adapter with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        timeout: Duration,
        settings: BrevoSettings,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            settings,
        })
    }
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct Contact<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct SendRequest<'a> {
    sender: Contact<'a>,
    to: [Contact<'a>; 1],
    template_id: i64,
    params: &'a Map<String, Value>,
}

fn build_request<'a>(
    settings: &'a BrevoSettings,
    message: &'a EmailMessage,
) -> Result<SendRequest<'a>, MailerError> {
    let template_id = settings
        .templates
        .get(&message.template)
        .copied()
        .ok_or_else(|| MailerError::missing_template(message.template.as_str()))?;
    Ok(SendRequest {
        sender: Contact {
            email: settings.sender_email.as_ref(),
            name: Some(settings.sender_name.as_str()),
        },
        to: [Contact {
            email: message.to.as_ref(),
            name: message.to_name.as_deref(),
        }],
        template_id,
        params: &message.params,
    })
}

fn map_transport_error(error: reqwest::Error) -> MailerError {
    MailerError::transport(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> MailerError {
    const PREVIEW_CHAR_LIMIT: usize = 160;
    let preview: String = String::from_utf8_lossy(body)
        .chars()
        .take(PREVIEW_CHAR_LIMIT)
        .collect();
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        MailerError::transport(format!("status {}: {preview}", status.as_u16()))
    } else {
        MailerError::rejected(status.as_u16(), preview)
    }
}

#[async_trait]
impl Mailer for BrevoMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailerError> {
        let request = build_request(&self.settings, message)?;
        let response = self
            .client
            .post(self.endpoint.clone())
            .header("api-key", self.settings.api_key.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.map_err(map_transport_error)?;
            return Err(map_status_error(status, body.as_ref()));
        }
        info!(
            template = message.template.as_str(),
            template_id = request.template_id,
            "transactional e-mail accepted"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn settings() -> BrevoSettings {
        BrevoSettings {
            api_key: Zeroizing::new("xkeysib-test".to_owned()),
            sender_email: EmailAddress::new("portal@leasing.example").expect("sender"),
            sender_name: "Leasing Portal".to_owned(),
            templates: HashMap::from([(EmailTemplate::PasswordReset, 7)]),
        }
    }

    fn message(template: EmailTemplate) -> EmailMessage {
        EmailMessage::new(EmailAddress::new("kim@kunde.example").expect("to"), template)
            .with_name("Kim Kunde")
            .with_param("link", "https://portal.example/reset?token=abc")
    }

    #[rstest]
    fn request_carries_template_and_params(settings: BrevoSettings) {
        let message = message(EmailTemplate::PasswordReset);
        let request = build_request(&settings, &message).expect("request");
        let body = serde_json::to_value(&request).expect("json");
        assert_eq!(
            body,
            json!({
                "sender": { "email": "portal@leasing.example", "name": "Leasing Portal" },
                "to": [{ "email": "kim@kunde.example", "name": "Kim Kunde" }],
                "templateId": 7,
                "params": { "link": "https://portal.example/reset?token=abc" }
            })
        );
    }

    #[rstest]
    fn unmapped_template_is_reported(settings: BrevoSettings) {
        let message = message(EmailTemplate::Welcome);
        let err = build_request(&settings, &message).expect_err("no template");
        assert_eq!(err, MailerError::missing_template("welcome"));
    }

    #[rstest]
    #[case(StatusCode::BAD_REQUEST, false)]
    #[case(StatusCode::UNAUTHORIZED, false)]
    #[case(StatusCode::TOO_MANY_REQUESTS, true)]
    #[case(StatusCode::BAD_GATEWAY, true)]
    fn statuses_split_into_transport_and_rejection(
        #[case] status: StatusCode,
        #[case] transport: bool,
    ) {
        let err = map_status_error(status, br#"{"code":"invalid_parameter"}"#);
        assert_eq!(matches!(err, MailerError::Transport { .. }), transport);
    }
}
