//! Shared validation helpers for inbound HTTP adapters.
//!
//! Request bodies carry raw strings; these helpers turn parse and
//! validation failures into `400` errors with `{ field, code }` details so
//! the UI can highlight the offending input.

use std::fmt::Display;
use std::str::FromStr;

use actix_web::web;
use serde_json::json;

use crate::domain::{
    CredentialValidationError, Error, TicketValidationError, UserValidationError,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUuid,
    MalformedBody,
    MalformedQuery,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::MalformedBody => "malformed_body",
            ErrorCode::MalformedQuery => "malformed_query",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub(crate) fn as_str(&self) -> &'static str {
        self.0
    }
}

/// `400` error naming the field and a stable detail code.
pub(crate) fn field_error(field: &str, code: &str, message: impl Display) -> Error {
    Error::invalid_request(message.to_string()).with_details(json!({
        "field": field,
        "code": code,
    }))
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("{field} must be a valid UUID")).with_details(json!({
        "field": field,
        "value": value,
        "code": ErrorCode::InvalidUuid.as_str(),
    }))
}

/// Parse a typed identifier from a path segment or body field.
pub(crate) fn parse_id<T: FromStr>(raw: &str, field: FieldName) -> Result<T, Error> {
    raw.parse().map_err(|_| invalid_uuid_error(field, raw))
}

pub(crate) fn parse_optional_id<T: FromStr>(
    raw: Option<&str>,
    field: FieldName,
) -> Result<Option<T>, Error> {
    raw.map(|raw| parse_id(raw, field)).transpose()
}

pub(crate) fn user_invalid(err: UserValidationError, field: FieldName) -> Error {
    let field = match &err {
        UserValidationError::EmptyName { field }
        | UserValidationError::NameTooLong { field, .. }
        | UserValidationError::TooLong { field, .. } => *field,
        _ => field.as_str(),
    };
    field_error(field, err.code(), &err)
}

pub(crate) fn credential_invalid(err: CredentialValidationError) -> Error {
    field_error(err.field(), err.code(), &err)
}

pub(crate) fn ticket_invalid(err: TicketValidationError) -> Error {
    let field = match &err {
        TicketValidationError::Empty { field } => *field,
        TicketValidationError::SubjectTooLong { .. } => "subject",
        TicketValidationError::UnknownStatus { .. } => "status",
        TicketValidationError::UnknownPriority { .. } => "priority",
    };
    field_error(field, err.code(), &err)
}

/// JSON extractor settings answering malformed bodies with the API error
/// payload instead of Actix's plain-text default.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        Error::invalid_request(format!("malformed request body: {err}"))
            .with_details(json!({ "code": ErrorCode::MalformedBody.as_str() }))
            .into()
    })
}

/// Query-string extractor settings mirroring [`json_config`].
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        Error::invalid_request(format!("malformed query string: {err}"))
            .with_details(json!({ "code": ErrorCode::MalformedQuery.as_str() }))
            .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode as DomainCode, UserId};
    use rstest::rstest;

    #[rstest]
    fn parse_id_reports_field_and_value() {
        let err = parse_id::<UserId>("nope", FieldName::new("id")).expect_err("invalid");
        assert_eq!(err.code(), DomainCode::InvalidRequest);
        let details = err.details().expect("details");
        assert_eq!(details["field"], "id");
        assert_eq!(details["value"], "nope");
        assert_eq!(details["code"], "invalid_uuid");
    }

    #[rstest]
    fn optional_ids_pass_through_none() {
        let parsed =
            parse_optional_id::<UserId>(None, FieldName::new("brokerId")).expect("no id is valid");
        assert!(parsed.is_none());
    }

    #[rstest]
    #[case(UserValidationError::EmptyName { field: "lastName" }, "lastName", "empty_name")]
    #[case(UserValidationError::InvalidEmail, "email", "invalid_email")]
    #[case(UserValidationError::TooLong { field: "phone", max: 40 }, "phone", "too_long")]
    #[case(UserValidationError::EmailTooLong { max: 254 }, "email", "email_too_long")]
    fn user_errors_name_the_field(
        #[case] err: UserValidationError,
        #[case] field: &str,
        #[case] code: &str,
    ) {
        let err = user_invalid(err, FieldName::new("email"));
        assert_eq!(err.details(), Some(&json!({ "field": field, "code": code })));
    }

    #[rstest]
    fn short_passwords_map_to_password_field() {
        let err = credential_invalid(CredentialValidationError::PasswordTooShort { min: 8 });
        assert_eq!(err.detail_code(), Some("password_too_short"));
        assert_eq!(err.details().map(|d| d["field"].clone()), Some(json!("password")));
    }
}
