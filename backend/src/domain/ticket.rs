//! Support tickets.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{TicketId, UserId};

/// Maximum subject length in characters.
pub const SUBJECT_MAX: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TicketValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
    #[error("subject must be at most {max} characters")]
    SubjectTooLong { max: usize },
    #[error("unknown ticket status: {value}")]
    UnknownStatus { value: String },
    #[error("unknown ticket priority: {value}")]
    UnknownPriority { value: String },
}

impl TicketValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Empty { .. } => "empty_field",
            Self::SubjectTooLong { .. } => "subject_too_long",
            Self::UnknownStatus { .. } => "invalid_status",
            Self::UnknownPriority { .. } => "invalid_priority",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    #[default]
    Open,
    InProgress,
    Closed,
}

impl TicketStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = TicketValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "in_progress" => Ok(Self::InProgress),
            "closed" => Ok(Self::Closed),
            other => Err(TicketValidationError::UnknownStatus {
                value: other.to_owned(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    Low,
    #[default]
    Normal,
    High,
}

impl TicketPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
        }
    }
}

impl FromStr for TicketPriority {
    type Err = TicketValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "normal" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            other => Err(TicketValidationError::UnknownPriority {
                value: other.to_owned(),
            }),
        }
    }
}

/// Message posted on a ticket by its owner or an admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketMessage {
    pub author_id: UserId,
    pub body: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: TicketId,
    pub created_by: UserId,
    pub subject: String,
    pub description: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub attachment_keys: Vec<String>,
    pub messages: Vec<TicketMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    pub fn is_closed(&self) -> bool {
        self.status == TicketStatus::Closed
    }
}

/// Validated input for opening a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketDraft {
    pub subject: String,
    pub description: String,
    pub priority: TicketPriority,
    pub attachment_keys: Vec<String>,
}

impl TicketDraft {
    pub fn new(
        subject: &str,
        description: &str,
        priority: TicketPriority,
        attachment_keys: Vec<String>,
    ) -> Result<Self, TicketValidationError> {
        let subject = subject.trim();
        if subject.is_empty() {
            return Err(TicketValidationError::Empty { field: "subject" });
        }
        if subject.chars().count() > SUBJECT_MAX {
            return Err(TicketValidationError::SubjectTooLong { max: SUBJECT_MAX });
        }
        let description = description.trim();
        if description.is_empty() {
            return Err(TicketValidationError::Empty {
                field: "description",
            });
        }
        Ok(Self {
            subject: subject.to_owned(),
            description: description.to_owned(),
            priority,
            attachment_keys,
        })
    }
}

/// Trim a message body, rejecting blank input.
pub fn validate_message_body(raw: &str) -> Result<String, TicketValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TicketValidationError::Empty { field: "body" });
    }
    Ok(trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "Beschreibung", "empty_field")]
    #[case("Betreff", "   ", "empty_field")]
    fn draft_rejects_blank_fields(
        #[case] subject: &str,
        #[case] description: &str,
        #[case] code: &str,
    ) {
        let err = TicketDraft::new(subject, description, TicketPriority::Normal, vec![])
            .expect_err("blank field");
        assert_eq!(err.code(), code);
    }

    #[rstest]
    fn draft_limits_subject_length() {
        let subject = "a".repeat(SUBJECT_MAX + 1);
        let err = TicketDraft::new(&subject, "text", TicketPriority::High, vec![])
            .expect_err("too long");
        assert_eq!(err, TicketValidationError::SubjectTooLong { max: SUBJECT_MAX });
    }

    #[rstest]
    #[case("open", TicketStatus::Open)]
    #[case("in_progress", TicketStatus::InProgress)]
    #[case("closed", TicketStatus::Closed)]
    fn status_round_trips_wire_value(#[case] raw: &str, #[case] status: TicketStatus) {
        assert_eq!(raw.parse::<TicketStatus>(), Ok(status));
        assert_eq!(status.as_str(), raw);
    }

    #[rstest]
    fn blank_message_body_is_rejected() {
        assert!(validate_message_body(" \n ").is_err());
        assert_eq!(validate_message_body(" Danke! "), Ok("Danke!".to_owned()));
    }
}
