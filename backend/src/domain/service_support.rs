//! Helpers shared by the domain services: verification links and e-mail.

use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{
    EmailMessage, InviteRepository, Mailer, MailerError, map_repository_error,
};
use crate::domain::{
    EmailAddress, Error, Verification, VerificationKind, VerificationStateError,
    VerificationToken, hash_token,
};

/// Store a verification for `kind` and return the raw token for the link.
pub(crate) async fn issue_verification(
    repo: &dyn InviteRepository,
    email: &EmailAddress,
    kind: VerificationKind,
    ttl: Duration,
    now: DateTime<Utc>,
) -> Result<VerificationToken, Error> {
    let token = VerificationToken::generate();
    let verification = Verification {
        token_hash: token.digest(),
        email: email.clone(),
        kind,
        created_at: now,
        expires_at: now + ttl,
        consumed_at: None,
    };
    repo.insert_verification(&verification)
        .await
        .map_err(|err| map_repository_error("verification", err))?;
    info!(kind = kind.as_str(), expires_at = %verification.expires_at, "verification issued");
    Ok(token)
}

fn token_error(error: VerificationStateError) -> Error {
    let base = match error {
        VerificationStateError::Expired => Error::invalid_request(error.to_string()),
        VerificationStateError::Consumed => Error::conflict(error.to_string()),
    };
    base.with_details(json!({ "field": "token", "code": error.code() }))
}

pub(crate) fn token_not_found() -> Error {
    Error::not_found("verification link not found")
        .with_details(json!({ "field": "token", "code": "token_not_found" }))
}

/// Look up a usable verification by its raw token.
pub(crate) async fn find_usable_verification(
    repo: &dyn InviteRepository,
    raw_token: &str,
    now: DateTime<Utc>,
) -> Result<Verification, Error> {
    if raw_token.trim().is_empty() {
        return Err(token_not_found());
    }
    let verification = repo
        .find_verification(&hash_token(raw_token))
        .await
        .map_err(|err| map_repository_error("verification", err))?
        .ok_or_else(token_not_found)?;
    verification.ensure_usable(now).map_err(token_error)?;
    Ok(verification)
}

/// Mark a verification consumed, failing if another request got there first.
pub(crate) async fn consume_verification(
    repo: &dyn InviteRepository,
    verification: &Verification,
    now: DateTime<Utc>,
) -> Result<(), Error> {
    let consumed = repo
        .consume_verification(&verification.token_hash, now)
        .await
        .map_err(|err| map_repository_error("verification", err))?;
    if consumed {
        Ok(())
    } else {
        Err(token_error(VerificationStateError::Consumed))
    }
}

/// Hand a consumed link back after the write it was consumed for failed.
pub(crate) async fn release_verification(repo: &dyn InviteRepository, verification: &Verification) {
    if let Err(error) = repo.release_verification(&verification.token_hash).await {
        warn!(error = %error, "verification link could not be released");
    }
}

fn map_mailer_error(error: MailerError) -> Error {
    match error {
        MailerError::Transport { message } => {
            Error::service_unavailable(format!("mail provider unavailable: {message}"))
        }
        MailerError::Rejected { status, message } => Error::service_unavailable(format!(
            "mail provider rejected message ({status}): {message}"
        )),
        MailerError::MissingTemplate { template } => {
            Error::internal(format!("mail template missing for {template}"))
        }
    }
}

/// Send an e-mail the operation depends on, such as an invitation link.
pub(crate) async fn send_required(mailer: &dyn Mailer, message: &EmailMessage) -> Result<(), Error> {
    mailer.send(message).await.map_err(map_mailer_error)
}

/// Send a notification; failures are logged and swallowed.
pub(crate) async fn send_notification(mailer: &dyn Mailer, message: &EmailMessage) {
    if let Err(error) = mailer.send(message).await {
        warn!(
            template = message.template.as_str(),
            error = %error,
            "notification e-mail was not sent"
        );
    }
}
