//! Portal account profile and its validated building blocks.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{BrokerId, CompanyId, UserId};

/// Validation errors for profile fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyEmail,
    InvalidEmail,
    EmailTooLong { max: usize },
    EmptyName { field: &'static str },
    NameTooLong { field: &'static str, max: usize },
    TooLong { field: &'static str, max: usize },
    UnknownRole { value: String },
    UnknownPortalType { value: String },
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::EmailTooLong { max } => write!(f, "email must be at most {max} characters"),
            Self::EmptyName { field } => write!(f, "{field} must not be empty"),
            Self::NameTooLong { field, max } | Self::TooLong { field, max } => {
                write!(f, "{field} must be at most {max} characters")
            }
            Self::UnknownRole { value } => write!(f, "unknown role: {value}"),
            Self::UnknownPortalType { value } => write!(f, "unknown portal type: {value}"),
        }
    }
}

impl std::error::Error for UserValidationError {}

impl UserValidationError {
    /// Stable detail code used in API error payloads.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyEmail => "empty_email",
            Self::InvalidEmail => "invalid_email",
            Self::EmailTooLong { .. } => "email_too_long",
            Self::EmptyName { .. } => "empty_name",
            Self::NameTooLong { .. } => "name_too_long",
            Self::TooLong { .. } => "too_long",
            Self::UnknownRole { .. } => "invalid_role",
            Self::UnknownPortalType { .. } => "invalid_portal_type",
        }
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Longest address RFC 5321 allows in a forward path.
pub const EMAIL_MAX: usize = 254;

/// Lower-cased, trimmed e-mail address used as the sign-in identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and normalise an e-mail address.
    ///
    /// # Examples
    /// ```
    /// use fleet_backend::domain::EmailAddress;
    ///
    /// let email = EmailAddress::new("  Max.Muster@Example.DE ").expect("valid");
    /// assert_eq!(email.as_ref(), "max.muster@example.de");
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalised = raw.as_ref().trim().to_lowercase();
        if normalised.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if normalised.chars().count() > EMAIL_MAX {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        if !email_regex().is_match(&normalised) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Maximum length of first and last names.
pub const NAME_MAX: usize = 80;

/// Validate a required, trimmed name field.
pub fn validate_name(raw: &str, field: &'static str) -> Result<String, UserValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UserValidationError::EmptyName { field });
    }
    if trimmed.chars().count() > NAME_MAX {
        return Err(UserValidationError::NameTooLong {
            field,
            max: NAME_MAX,
        });
    }
    Ok(trimmed.to_owned())
}

/// Maximum length of a phone number.
pub const PHONE_MAX: usize = 40;

/// Trim optional free text, dropping blanks and rejecting values over `max`.
pub fn validate_optional_text(
    raw: Option<String>,
    field: &'static str,
    max: usize,
) -> Result<Option<String>, UserValidationError> {
    let Some(trimmed) = raw
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
    else {
        return Ok(None);
    };
    if trimmed.chars().count() > max {
        return Err(UserValidationError::TooLong { field, max });
    }
    Ok(Some(trimmed))
}

/// Validate an optional phone number.
pub fn validate_phone(raw: Option<String>) -> Result<Option<String>, UserValidationError> {
    validate_optional_text(raw, "phone", PHONE_MAX)
}

/// Account role stored on the profile document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Employee,
    Broker,
    Customer,
}

impl Role {
    /// Database and wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Employee => "employee",
            Self::Broker => "broker",
            Self::Customer => "customer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "employee" => Ok(Self::Employee),
            "broker" => Ok(Self::Broker),
            "customer" => Ok(Self::Customer),
            other => Err(UserValidationError::UnknownRole {
                value: other.to_owned(),
            }),
        }
    }
}

/// Which vehicle catalogue an employee may browse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortalType {
    #[default]
    Normal,
    Salary,
}

impl PortalType {
    /// Database and wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Salary => "salary",
        }
    }
}

impl fmt::Display for PortalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PortalType {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Self::Normal),
            "salary" => Ok(Self::Salary),
            other => Err(UserValidationError::UnknownPortalType {
                value: other.to_owned(),
            }),
        }
    }
}

/// Account profile document.
///
/// `company_id` and `broker_id` are denormalised foreign keys; they are
/// resolved with follow-up reads where a view needs the referenced record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub email: EmailAddress,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub portal_type: Option<PortalType>,
    pub company_id: Option<CompanyId>,
    pub broker_id: Option<BrokerId>,
    pub phone: Option<String>,
    pub disabled: bool,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Full display name, `first last`.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", UserValidationError::EmptyEmail)]
    #[case("   ", UserValidationError::EmptyEmail)]
    #[case("no-at-sign.de", UserValidationError::InvalidEmail)]
    #[case("two words@example.de", UserValidationError::InvalidEmail)]
    #[case("missing@tld", UserValidationError::InvalidEmail)]
    #[case(&format!("{}@example.de", "a".repeat(250)), UserValidationError::EmailTooLong { max: EMAIL_MAX })]
    fn email_rejects_invalid_input(#[case] raw: &str, #[case] expected: UserValidationError) {
        assert_eq!(EmailAddress::new(raw), Err(expected));
    }

    #[rstest]
    fn email_is_normalised() {
        let email = EmailAddress::new(" Anna@Fuhrpark.DE").expect("valid email");
        assert_eq!(email.as_ref(), "anna@fuhrpark.de");
    }

    #[rstest]
    fn validate_name_trims_and_limits_length() {
        assert_eq!(validate_name("  Anna ", "firstName"), Ok("Anna".to_owned()));
        assert_eq!(
            validate_name(" ", "lastName"),
            Err(UserValidationError::EmptyName { field: "lastName" })
        );
        let long = "x".repeat(NAME_MAX + 1);
        assert_eq!(
            validate_name(&long, "lastName"),
            Err(UserValidationError::NameTooLong {
                field: "lastName",
                max: NAME_MAX
            })
        );
    }

    #[rstest]
    #[case(None, Ok(None))]
    #[case(Some("   "), Ok(None))]
    #[case(Some(" +49 30 1234 "), Ok(Some("+49 30 1234".to_owned())))]
    #[case(Some("1234567890123456789012345678901234567890"), Ok(Some("1234567890123456789012345678901234567890".to_owned())))]
    #[case(
        Some("12345678901234567890123456789012345678901"),
        Err(UserValidationError::TooLong { field: "phone", max: PHONE_MAX })
    )]
    fn phone_is_trimmed_and_capped(
        #[case] raw: Option<&str>,
        #[case] expected: Result<Option<String>, UserValidationError>,
    ) {
        assert_eq!(validate_phone(raw.map(str::to_owned)), expected);
    }

    #[rstest]
    #[case("admin", Role::Admin)]
    #[case("employee", Role::Employee)]
    #[case("broker", Role::Broker)]
    #[case("customer", Role::Customer)]
    fn role_parses_wire_values(#[case] raw: &str, #[case] expected: Role) {
        assert_eq!(raw.parse::<Role>(), Ok(expected));
        assert_eq!(expected.as_str(), raw);
    }

    #[rstest]
    fn portal_type_rejects_unknown_values() {
        let err = "premium".parse::<PortalType>().expect_err("unknown");
        assert_eq!(err.code(), "invalid_portal_type");
    }
}
