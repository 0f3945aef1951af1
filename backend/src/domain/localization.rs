//! German user-facing messages for API errors.
//!
//! The portal UI shows these strings verbatim. Lookup prefers the detail
//! code (`details.code`) and falls back to a generic message per
//! [`ErrorCode`].

use super::{Error, ErrorCode};

/// Message for a specific detail code, if one is known.
pub fn detail_message(detail_code: &str) -> Option<&'static str> {
    let message = match detail_code {
        "invalid_credentials" => "E-Mail-Adresse oder Passwort ist falsch.",
        "empty_email" => "Bitte geben Sie Ihre E-Mail-Adresse ein.",
        "invalid_email" => "Bitte geben Sie eine gültige E-Mail-Adresse ein.",
        "empty_password" => "Bitte geben Sie ein Passwort ein.",
        "password_too_short" => "Das Passwort muss mindestens 8 Zeichen lang sein.",
        "wrong_password" => "Das aktuelle Passwort ist falsch.",
        "empty_name" => "Bitte füllen Sie alle Namensfelder aus.",
        "name_too_long" => "Der Name ist zu lang.",
        "email_too_long" => "Die E-Mail-Adresse ist zu lang.",
        "too_long" => "Die Eingabe ist zu lang.",
        "email_taken" => "Diese E-Mail-Adresse wird bereits verwendet.",
        "token_not_found" => "Der Link ist ungültig.",
        "token_expired" => "Der Link ist abgelaufen. Bitte fordern Sie eine neue Einladung an.",
        "token_consumed" => "Dieser Link wurde bereits verwendet.",
        "vehicle_unavailable" => "Dieses Fahrzeug ist derzeit nicht verfügbar.",
        "rate_not_offered" => "Für diese Laufzeit und Laufleistung gibt es kein Angebot.",
        "ticket_closed" => "Dieses Ticket ist bereits geschlossen.",
        "unsupported_media_type" => "Dieser Dateityp wird nicht unterstützt.",
        "file_too_large" => "Die Datei ist zu groß (maximal 10 MB).",
        "missing_category" => "Bitte wählen Sie mindestens eine Kategorie.",
        "missing_broker" => "Bitte wählen Sie einen Vermittler aus.",
        "unknown_brand" => "Die gewählte Marke existiert nicht.",
        "unknown_company" => "Das gewählte Unternehmen existiert nicht.",
        "unknown_broker" => "Der gewählte Vermittler existiert nicht.",
        "brand_in_use" => "Die Marke wird noch von Fahrzeugen verwendet.",
        "company_in_use" => "Dem Unternehmen sind noch Benutzer zugeordnet.",
        "broker_in_use" => "Dem Vermittler sind noch Kunden zugeordnet.",
        "self_lockout" => "Sie können Ihr eigenes Konto nicht sperren oder herabstufen.",
        "invalid_key" => "Die Datei wurde nicht gefunden.",
        _ => return None,
    };
    Some(message)
}

/// Generic message for an error code.
pub fn code_message(code: ErrorCode) -> &'static str {
    match code {
        ErrorCode::InvalidRequest => "Bitte überprüfen Sie Ihre Eingaben.",
        ErrorCode::Unauthorized => "Bitte melden Sie sich an.",
        ErrorCode::Forbidden => "Sie haben keine Berechtigung für diese Aktion.",
        ErrorCode::NotFound => "Der angeforderte Eintrag wurde nicht gefunden.",
        ErrorCode::Conflict => "Der Eintrag existiert bereits.",
        ErrorCode::ServiceUnavailable => {
            "Der Dienst ist vorübergehend nicht erreichbar. Bitte versuchen Sie es später erneut."
        }
        ErrorCode::InternalError => "Ein unerwarteter Fehler ist aufgetreten.",
    }
}

/// Localised message for an error.
///
/// # Examples
/// ```
/// use fleet_backend::domain::{localized_message, Error};
/// use serde_json::json;
///
/// let err = Error::unauthorized("invalid credentials")
///     .with_details(json!({ "code": "invalid_credentials" }));
/// assert_eq!(localized_message(&err), "E-Mail-Adresse oder Passwort ist falsch.");
/// ```
pub fn localized_message(error: &Error) -> &'static str {
    error
        .detail_code()
        .and_then(detail_message)
        .unwrap_or_else(|| code_message(error.code()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn known_detail_code_wins() {
        let err = Error::conflict("taken").with_details(json!({ "code": "email_taken" }));
        assert_eq!(
            localized_message(&err),
            "Diese E-Mail-Adresse wird bereits verwendet."
        );
    }

    #[rstest]
    fn unknown_detail_code_falls_back_to_code() {
        let err = Error::not_found("nope").with_details(json!({ "code": "something_else" }));
        assert_eq!(localized_message(&err), code_message(ErrorCode::NotFound));
    }

    #[rstest]
    #[case(ErrorCode::Unauthorized)]
    #[case(ErrorCode::Forbidden)]
    #[case(ErrorCode::InternalError)]
    fn every_code_has_a_message(#[case] code: ErrorCode) {
        assert!(!code_message(code).is_empty());
    }
}
