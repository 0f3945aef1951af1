//! Sign-in, session principal resolution and password management.

use std::sync::Arc;

use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{
    EmailMessage, EmailTemplate, InviteRepository, Mailer, PasswordHasher, PasswordHasherError,
    UserRepository, map_repository_error,
};
use crate::domain::service_support::{
    consume_verification, find_usable_verification, issue_verification, release_verification,
    send_notification, token_not_found,
};
use crate::domain::{
    EmailAddress, Error, LoginCredentials, NewPassword, PortalLinks, Principal, UserId,
    VerificationKind,
};

use super::SettingsService;

/// Adapters the auth service talks to.
#[derive(Clone)]
pub struct AuthDeps {
    pub users: Arc<dyn UserRepository>,
    pub invites: Arc<dyn InviteRepository>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub mailer: Arc<dyn Mailer>,
    pub clock: Arc<dyn Clock>,
}

#[derive(Clone)]
pub struct AuthService {
    deps: AuthDeps,
    settings: SettingsService,
    links: PortalLinks,
}

fn invalid_credentials() -> Error {
    Error::unauthorized("invalid credentials").with_details(json!({ "code": "invalid_credentials" }))
}

fn map_hasher_error(error: PasswordHasherError) -> Error {
    Error::internal(format!("password hashing failed: {error}"))
}

impl AuthService {
    pub fn new(deps: AuthDeps, settings: SettingsService, links: PortalLinks) -> Self {
        Self {
            deps,
            settings,
            links,
        }
    }

    /// Check credentials and resolve the caller.
    ///
    /// Unknown accounts, disabled accounts and wrong passwords all fail with
    /// the same error so the response does not reveal which accounts exist.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<Principal, Error> {
        let profile = self
            .deps
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(|err| map_repository_error("user", err))?
            .ok_or_else(invalid_credentials)?;
        let hash = self
            .deps
            .users
            .find_password_hash(&profile.id)
            .await
            .map_err(|err| map_repository_error("user", err))?
            .ok_or_else(invalid_credentials)?;
        let matches = self
            .deps
            .hasher
            .verify(credentials.password(), &hash)
            .map_err(map_hasher_error)?;
        if !matches {
            info!(user_id = %profile.id, "sign-in rejected: wrong password");
            return Err(invalid_credentials());
        }
        let user_id = profile.id;
        let principal = Principal::resolve(profile).ok_or_else(|| {
            info!(user_id = %user_id, "sign-in rejected: account disabled");
            invalid_credentials()
        })?;
        info!(user_id = %user_id, permission = principal.permission.as_str(), "signed in");
        Ok(principal)
    }

    /// Resolve the principal for a session's user id.
    ///
    /// Permissions are recomputed on every call so role changes apply to
    /// existing sessions.
    pub async fn principal(&self, user_id: &UserId) -> Result<Principal, Error> {
        self.deps
            .users
            .find_by_id(user_id)
            .await
            .map_err(|err| map_repository_error("user", err))?
            .and_then(Principal::resolve)
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Start a password reset. Succeeds whether or not the account exists.
    pub async fn request_password_reset(&self, email: &EmailAddress) -> Result<(), Error> {
        let profile = self
            .deps
            .users
            .find_by_email(email)
            .await
            .map_err(|err| map_repository_error("user", err))?;
        let Some(profile) = profile.filter(|profile| !profile.disabled) else {
            info!("password reset requested for unknown or disabled account");
            return Ok(());
        };
        let settings = self.settings.current().await?;
        let token = issue_verification(
            self.deps.invites.as_ref(),
            &profile.email,
            VerificationKind::PasswordReset(profile.id),
            settings.password_reset_ttl(),
            self.deps.clock.utc(),
        )
        .await?;
        let message = EmailMessage::new(profile.email.clone(), EmailTemplate::PasswordReset)
            .with_name(profile.display_name())
            .with_param("firstName", profile.first_name.clone())
            .with_param("link", self.links.password_reset(token.expose()))
            .with_param("ttlMinutes", settings.password_reset_ttl_minutes);
        send_notification(self.deps.mailer.as_ref(), &message).await;
        Ok(())
    }

    /// Consume a reset token and store the new password.
    pub async fn confirm_password_reset(
        &self,
        token: &str,
        password: &NewPassword,
    ) -> Result<(), Error> {
        let now = self.deps.clock.utc();
        let verification =
            find_usable_verification(self.deps.invites.as_ref(), token, now).await?;
        let VerificationKind::PasswordReset(user_id) = verification.kind else {
            return Err(token_not_found());
        };
        let hash = self
            .deps
            .hasher
            .hash(password.expose())
            .map_err(map_hasher_error)?;
        consume_verification(self.deps.invites.as_ref(), &verification, now).await?;
        let updated = match self.deps.users.set_password_hash(&user_id, &hash).await {
            Ok(updated) => updated,
            Err(error) => {
                release_verification(self.deps.invites.as_ref(), &verification).await;
                return Err(map_repository_error("user", error));
            }
        };
        if !updated {
            warn!(user_id = %user_id, "password reset for deleted account");
            return Err(token_not_found());
        }
        info!(user_id = %user_id, "password reset completed");
        Ok(())
    }

    /// Change the caller's password after checking the current one.
    pub async fn change_password(
        &self,
        principal: &Principal,
        current: &str,
        password: &NewPassword,
    ) -> Result<(), Error> {
        let user_id = principal.profile.id;
        let stored = self
            .deps
            .users
            .find_password_hash(&user_id)
            .await
            .map_err(|err| map_repository_error("user", err))?
            .ok_or_else(|| Error::unauthorized("login required"))?;
        let matches = self
            .deps
            .hasher
            .verify(current, &stored)
            .map_err(map_hasher_error)?;
        if !matches {
            return Err(Error::invalid_request("current password is wrong")
                .with_details(json!({ "field": "currentPassword", "code": "wrong_password" })));
        }
        let hash = self
            .deps
            .hasher
            .hash(password.expose())
            .map_err(map_hasher_error)?;
        self.deps
            .users
            .set_password_hash(&user_id, &hash)
            .await
            .map_err(|err| map_repository_error("user", err))?;
        info!(user_id = %user_id, "password changed");
        Ok(())
    }
}
