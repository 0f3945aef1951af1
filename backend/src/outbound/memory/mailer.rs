use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::ports::{EmailMessage, EmailTemplate, Mailer, MailerError};

/// Mailer that keeps every message in memory.
///
/// Used by tests to read invitation links back out of sent e-mails.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<EmailMessage>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages sent so far, oldest first.
    pub fn sent(&self) -> Vec<EmailMessage> {
        match self.sent.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// The most recent message of a given template.
    pub fn last_of(&self, template: EmailTemplate) -> Option<EmailMessage> {
        self.sent()
            .into_iter()
            .rev()
            .find(|message| message.template == template)
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailerError> {
        self.sent
            .lock()
            .map_err(|_| MailerError::transport("recording mailer lock poisoned"))?
            .push(message.clone());
        Ok(())
    }
}
