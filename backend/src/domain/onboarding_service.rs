//! Invitations, verification links and account registration.
//!
//! Every account except the seeded administrator is created through an
//! invitation: the admin invites employees and brokers, brokers invite their
//! customers. The invitation e-mail carries a verification token; registering
//! with it creates the profile with the role the invite prescribes.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{
    EmailMessage, EmailTemplate, InviteRepository, Mailer, OrganisationRepository,
    PasswordHasher, UserRepository, map_repository_error,
};
use crate::domain::service_support::{
    consume_verification, find_usable_verification, issue_verification, release_verification,
    send_notification, send_required, token_not_found,
};
use crate::domain::{
    Broker, BrokerId, Capability, CompanyId, CustomerInvite, EmailAddress, EmployeeInvite, Error,
    InviteId, NewPassword, PortalLinks, PortalType, Principal, Role, UserId, UserProfile,
    Verification, VerificationKind,
};

use super::SettingsService;

/// Adapters the onboarding service talks to.
#[derive(Clone)]
pub struct OnboardingDeps {
    pub users: Arc<dyn UserRepository>,
    pub invites: Arc<dyn InviteRepository>,
    pub organisations: Arc<dyn OrganisationRepository>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub mailer: Arc<dyn Mailer>,
    pub clock: Arc<dyn Clock>,
}

/// Validated employee invitation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeInvitation {
    pub email: EmailAddress,
    pub company_id: CompanyId,
    pub portal_type: PortalType,
}

/// Validated customer invitation request.
///
/// Brokers always invite for their own broker record; `broker_id` is only
/// honoured for administrators acting on a broker's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerInvitation {
    pub email: EmailAddress,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub broker_id: Option<BrokerId>,
}

/// Validated registration form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub token: String,
    pub password: NewPassword,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
}

/// What an invitation link is for, shown before the registration form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationPreview {
    pub kind: &'static str,
    pub email: EmailAddress,
    pub role: Role,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub expires_at: DateTime<Utc>,
}

/// Profile template derived from an invitation.
struct Invited {
    role: Role,
    portal_type: Option<PortalType>,
    company_id: Option<CompanyId>,
    broker_id: Option<BrokerId>,
    first_name: Option<String>,
    last_name: Option<String>,
}

fn email_taken() -> Error {
    Error::conflict("email address already in use")
        .with_details(json!({ "field": "email", "code": "email_taken" }))
}

#[derive(Clone)]
pub struct OnboardingService {
    deps: OnboardingDeps,
    settings: SettingsService,
    links: PortalLinks,
}

impl OnboardingService {
    pub fn new(deps: OnboardingDeps, settings: SettingsService, links: PortalLinks) -> Self {
        Self {
            deps,
            settings,
            links,
        }
    }

    async fn ensure_email_free(&self, email: &EmailAddress) -> Result<(), Error> {
        let existing = self
            .deps
            .users
            .find_by_email(email)
            .await
            .map_err(|err| map_repository_error("user", err))?;
        match existing {
            Some(_) => Err(email_taken()),
            None => Ok(()),
        }
    }

    async fn send_invitation(
        &self,
        email: &EmailAddress,
        kind: VerificationKind,
        template: EmailTemplate,
        inviter: &Principal,
        extra: &[(&str, String)],
    ) -> Result<(), Error> {
        let settings = self.settings.current().await?;
        let token = issue_verification(
            self.deps.invites.as_ref(),
            email,
            kind,
            settings.invitation_ttl(),
            self.deps.clock.utc(),
        )
        .await?;
        let mut message = EmailMessage::new(email.clone(), template)
            .with_param("link", self.links.registration(token.expose()))
            .with_param("inviterName", inviter.profile.display_name())
            .with_param("ttlHours", settings.invitation_ttl_hours);
        for (key, value) in extra {
            message = message.with_param(key, value.clone());
        }
        send_required(self.deps.mailer.as_ref(), &message).await
    }

    /// Invite an employee of `company_id` into the portal.
    pub async fn invite_employee(
        &self,
        principal: &Principal,
        request: EmployeeInvitation,
    ) -> Result<EmployeeInvite, Error> {
        principal.require(Capability::InviteEmployees)?;
        let company = self
            .deps
            .organisations
            .find_company(&request.company_id)
            .await
            .map_err(|err| map_repository_error("company", err))?
            .ok_or_else(|| Error::not_found("company not found"))?;
        self.ensure_email_free(&request.email).await?;

        let invite = EmployeeInvite {
            id: InviteId::random(),
            email: request.email,
            company_id: company.id,
            portal_type: request.portal_type,
            invited_by: principal.profile.id,
            created_at: self.deps.clock.utc(),
            accepted_at: None,
        };
        self.deps
            .invites
            .save_employee_invite(&invite)
            .await
            .map_err(|err| map_repository_error("invite", err))?;
        self.send_invitation(
            &invite.email,
            VerificationKind::EmployeeInvite(invite.id),
            EmailTemplate::EmployeeInvitation,
            principal,
            &[("companyName", company.name.clone())],
        )
        .await?;
        info!(invite_id = %invite.id, company_id = %company.id, "employee invited");
        Ok(invite)
    }

    async fn resolve_inviting_broker(
        &self,
        principal: &Principal,
        requested: Option<BrokerId>,
    ) -> Result<Broker, Error> {
        let broker_id = if principal.is_admin() {
            requested.ok_or_else(|| {
                Error::invalid_request("brokerId is required")
                    .with_details(json!({ "field": "brokerId", "code": "missing_broker" }))
            })?
        } else {
            principal
                .profile
                .broker_id
                .ok_or_else(|| Error::forbidden("account is not linked to a broker"))?
        };
        self.deps
            .organisations
            .find_broker(&broker_id)
            .await
            .map_err(|err| map_repository_error("broker", err))?
            .ok_or_else(|| Error::not_found("broker not found"))
    }

    /// Invite a customer for a broker.
    pub async fn invite_customer(
        &self,
        principal: &Principal,
        request: CustomerInvitation,
    ) -> Result<CustomerInvite, Error> {
        principal.require(Capability::InviteCustomers)?;
        let broker = self
            .resolve_inviting_broker(principal, request.broker_id)
            .await?;
        self.ensure_email_free(&request.email).await?;

        let invite = CustomerInvite {
            id: InviteId::random(),
            email: request.email,
            first_name: request.first_name,
            last_name: request.last_name,
            broker_id: broker.id,
            invited_by: principal.profile.id,
            created_at: self.deps.clock.utc(),
            accepted_at: None,
        };
        self.deps
            .invites
            .save_customer_invite(&invite)
            .await
            .map_err(|err| map_repository_error("invite", err))?;
        self.send_invitation(
            &invite.email,
            VerificationKind::CustomerInvite(invite.id),
            EmailTemplate::CustomerInvitation,
            principal,
            &[("brokerName", broker.company_name.clone())],
        )
        .await?;
        info!(invite_id = %invite.id, broker_id = %broker.id, "customer invited");
        Ok(invite)
    }

    /// Invite a broker's contact person to create the broker account.
    pub async fn invite_broker(&self, principal: &Principal, broker: &Broker) -> Result<(), Error> {
        principal.require(Capability::ManageOrganisations)?;
        if broker.user_id.is_some() {
            return Err(Error::conflict("broker already has an account"));
        }
        self.ensure_email_free(&broker.email).await?;
        self.send_invitation(
            &broker.email,
            VerificationKind::BrokerInvite(broker.id),
            EmailTemplate::BrokerInvitation,
            principal,
            &[
                ("contactName", broker.contact_name.clone()),
                ("brokerName", broker.company_name.clone()),
            ],
        )
        .await?;
        info!(broker_id = %broker.id, "broker invited");
        Ok(())
    }

    async fn invited(&self, verification: &Verification) -> Result<Invited, Error> {
        match verification.kind {
            VerificationKind::EmployeeInvite(id) => {
                let invite = self
                    .deps
                    .invites
                    .find_employee_invite(&id)
                    .await
                    .map_err(|err| map_repository_error("invite", err))?
                    .ok_or_else(token_not_found)?;
                Ok(Invited {
                    role: Role::Employee,
                    portal_type: Some(invite.portal_type),
                    company_id: Some(invite.company_id),
                    broker_id: None,
                    first_name: None,
                    last_name: None,
                })
            }
            VerificationKind::CustomerInvite(id) => {
                let invite = self
                    .deps
                    .invites
                    .find_customer_invite(&id)
                    .await
                    .map_err(|err| map_repository_error("invite", err))?
                    .ok_or_else(token_not_found)?;
                Ok(Invited {
                    role: Role::Customer,
                    portal_type: None,
                    company_id: None,
                    broker_id: Some(invite.broker_id),
                    first_name: invite.first_name,
                    last_name: invite.last_name,
                })
            }
            VerificationKind::BrokerInvite(id) => {
                let broker = self
                    .deps
                    .organisations
                    .find_broker(&id)
                    .await
                    .map_err(|err| map_repository_error("broker", err))?
                    .ok_or_else(token_not_found)?;
                let (first_name, last_name) = match broker.contact_name.split_once(' ') {
                    Some((first, last)) => (Some(first.to_owned()), Some(last.to_owned())),
                    None => (None, Some(broker.contact_name.clone())),
                };
                Ok(Invited {
                    role: Role::Broker,
                    portal_type: None,
                    company_id: None,
                    broker_id: Some(broker.id),
                    first_name,
                    last_name,
                })
            }
            VerificationKind::PasswordReset(_) => Err(token_not_found()),
        }
    }

    /// Validate an invitation link before showing the registration form.
    pub async fn verify(&self, token: &str) -> Result<InvitationPreview, Error> {
        let verification =
            find_usable_verification(self.deps.invites.as_ref(), token, self.deps.clock.utc())
                .await?;
        let invited = self.invited(&verification).await?;
        Ok(InvitationPreview {
            kind: verification.kind.as_str(),
            email: verification.email,
            role: invited.role,
            first_name: invited.first_name,
            last_name: invited.last_name,
            expires_at: verification.expires_at,
        })
    }

    async fn mark_accepted(
        &self,
        kind: VerificationKind,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<(), Error> {
        match kind {
            VerificationKind::EmployeeInvite(id) => {
                if let Some(mut invite) = self
                    .deps
                    .invites
                    .find_employee_invite(&id)
                    .await
                    .map_err(|err| map_repository_error("invite", err))?
                {
                    invite.accepted_at = Some(now);
                    self.deps
                        .invites
                        .save_employee_invite(&invite)
                        .await
                        .map_err(|err| map_repository_error("invite", err))?;
                }
            }
            VerificationKind::CustomerInvite(id) => {
                if let Some(mut invite) = self
                    .deps
                    .invites
                    .find_customer_invite(&id)
                    .await
                    .map_err(|err| map_repository_error("invite", err))?
                {
                    invite.accepted_at = Some(now);
                    self.deps
                        .invites
                        .save_customer_invite(&invite)
                        .await
                        .map_err(|err| map_repository_error("invite", err))?;
                }
            }
            VerificationKind::BrokerInvite(id) => {
                if let Some(mut broker) = self
                    .deps
                    .organisations
                    .find_broker(&id)
                    .await
                    .map_err(|err| map_repository_error("broker", err))?
                {
                    broker.user_id = Some(user_id);
                    self.deps
                        .organisations
                        .save_broker(&broker)
                        .await
                        .map_err(|err| map_repository_error("broker", err))?;
                }
            }
            VerificationKind::PasswordReset(_) => {}
        }
        Ok(())
    }

    /// Create the invited account.
    ///
    /// Role, portal type, company and broker come from the invitation, never
    /// from the form.
    pub async fn register(&self, registration: Registration) -> Result<Principal, Error> {
        let now = self.deps.clock.utc();
        let verification =
            find_usable_verification(self.deps.invites.as_ref(), &registration.token, now)
                .await?;
        let invited = self.invited(&verification).await?;
        self.ensure_email_free(&verification.email).await?;
        let hash = self
            .deps
            .hasher
            .hash(registration.password.expose())
            .map_err(|err| Error::internal(format!("password hashing failed: {err}")))?;
        consume_verification(self.deps.invites.as_ref(), &verification, now).await?;

        let profile = UserProfile {
            id: UserId::random(),
            email: verification.email.clone(),
            first_name: registration.first_name,
            last_name: registration.last_name,
            role: invited.role,
            portal_type: invited.portal_type,
            company_id: invited.company_id,
            broker_id: invited.broker_id,
            phone: registration.phone,
            disabled: false,
            created_at: now,
        };
        if let Err(error) = self.deps.users.insert(&profile, &hash).await {
            release_verification(self.deps.invites.as_ref(), &verification).await;
            return Err(map_repository_error("user", error));
        }
        self.mark_accepted(verification.kind, profile.id, now).await?;

        let welcome = EmailMessage::new(profile.email.clone(), EmailTemplate::Welcome)
            .with_name(profile.display_name())
            .with_param("firstName", profile.first_name.clone())
            .with_param("loginLink", self.links.login());
        send_notification(self.deps.mailer.as_ref(), &welcome).await;
        info!(user_id = %profile.id, role = profile.role.as_str(), "account registered");

        Principal::resolve(profile).ok_or_else(|| Error::internal("new account is disabled"))
    }

    /// Create the first administrator unless the address is already taken.
    ///
    /// Returns `true` when an account was created. Used at startup, so no
    /// principal is involved and no e-mail is sent.
    pub async fn bootstrap_admin(
        &self,
        email: &EmailAddress,
        password: &NewPassword,
    ) -> Result<bool, Error> {
        let existing = self
            .deps
            .users
            .find_by_email(email)
            .await
            .map_err(|err| map_repository_error("user", err))?;
        if existing.is_some() {
            return Ok(false);
        }
        let hash = self
            .deps
            .hasher
            .hash(password.expose())
            .map_err(|err| Error::internal(format!("password hashing failed: {err}")))?;
        let profile = UserProfile {
            id: UserId::random(),
            email: email.clone(),
            first_name: "Portal".into(),
            last_name: "Admin".into(),
            role: Role::Admin,
            portal_type: None,
            company_id: None,
            broker_id: None,
            phone: None,
            disabled: false,
            created_at: self.deps.clock.utc(),
        };
        self.deps
            .users
            .insert(&profile, &hash)
            .await
            .map_err(|err| map_repository_error("user", err))?;
        info!(user_id = %profile.id, "bootstrap administrator created");
        Ok(true)
    }

    /// A broker's pending customer invitations.
    pub async fn pending_customer_invites(
        &self,
        principal: &Principal,
    ) -> Result<Vec<CustomerInvite>, Error> {
        principal.require(Capability::InviteCustomers)?;
        let broker_id = principal
            .profile
            .broker_id
            .ok_or_else(|| Error::forbidden("account is not linked to a broker"))?;
        self.deps
            .invites
            .pending_customer_invites(&broker_id)
            .await
            .map_err(|err| map_repository_error("invite", err))
    }
}

#[cfg(test)]
mod tests;
