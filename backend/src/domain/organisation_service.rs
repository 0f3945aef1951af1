//! Companies, brokers and account administration.

use std::sync::Arc;

use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{
    OrganisationRepository, UserFilter, UserRepository, map_repository_error,
};
use crate::domain::{
    Broker, BrokerDraft, BrokerId, Capability, Company, CompanyDraft, CompanyId, Error,
    Permission, PortalType, Principal, Role, UserId, UserProfile,
};

/// Administrative changes to an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserUpdate {
    pub role: Role,
    pub portal_type: Option<PortalType>,
    pub company_id: Option<CompanyId>,
    pub broker_id: Option<BrokerId>,
    pub disabled: bool,
}

#[derive(Clone)]
pub struct OrganisationService {
    organisations: Arc<dyn OrganisationRepository>,
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

fn in_use(resource: &str, code: &'static str) -> Error {
    Error::conflict(format!("{resource} is still referenced by accounts"))
        .with_details(json!({ "code": code }))
}

fn unknown_reference(field: &'static str, code: &'static str) -> Error {
    Error::invalid_request(format!("{field} does not exist"))
        .with_details(json!({ "field": field, "code": code }))
}

impl OrganisationService {
    pub fn new(
        organisations: Arc<dyn OrganisationRepository>,
        users: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            organisations,
            users,
            clock,
        }
    }

    pub async fn list_companies(&self, principal: &Principal) -> Result<Vec<Company>, Error> {
        principal.require(Capability::ManageOrganisations)?;
        self.organisations
            .list_companies()
            .await
            .map_err(|err| map_repository_error("company", err))
    }

    pub async fn get_company(&self, principal: &Principal, id: &CompanyId) -> Result<Company, Error> {
        principal.require(Capability::ManageOrganisations)?;
        self.find_company(id)
            .await?
            .ok_or_else(|| Error::not_found("company not found"))
    }

    async fn find_company(&self, id: &CompanyId) -> Result<Option<Company>, Error> {
        self.organisations
            .find_company(id)
            .await
            .map_err(|err| map_repository_error("company", err))
    }

    pub async fn create_company(
        &self,
        principal: &Principal,
        draft: CompanyDraft,
    ) -> Result<Company, Error> {
        principal.require(Capability::ManageOrganisations)?;
        let company = Company {
            id: CompanyId::random(),
            name: draft.name,
            street: draft.street,
            postal_code: draft.postal_code,
            city: draft.city,
            contact_email: draft.contact_email,
            created_at: self.clock.utc(),
        };
        self.organisations
            .save_company(&company)
            .await
            .map_err(|err| map_repository_error("company", err))?;
        info!(company_id = %company.id, "company created");
        Ok(company)
    }

    pub async fn update_company(
        &self,
        principal: &Principal,
        id: &CompanyId,
        draft: CompanyDraft,
    ) -> Result<Company, Error> {
        let existing = self.get_company(principal, id).await?;
        let company = Company {
            name: draft.name,
            street: draft.street,
            postal_code: draft.postal_code,
            city: draft.city,
            contact_email: draft.contact_email,
            ..existing
        };
        self.organisations
            .save_company(&company)
            .await
            .map_err(|err| map_repository_error("company", err))?;
        Ok(company)
    }

    /// Delete a company no account belongs to.
    pub async fn delete_company(&self, principal: &Principal, id: &CompanyId) -> Result<(), Error> {
        principal.require(Capability::ManageOrganisations)?;
        let members = self
            .users
            .list(&UserFilter {
                company_id: Some(*id),
                ..UserFilter::default()
            })
            .await
            .map_err(|err| map_repository_error("user", err))?;
        if !members.is_empty() {
            return Err(in_use("company", "company_in_use"));
        }
        let removed = self
            .organisations
            .delete_company(id)
            .await
            .map_err(|err| map_repository_error("company", err))?;
        if !removed {
            return Err(Error::not_found("company not found"));
        }
        info!(company_id = %id, "company deleted");
        Ok(())
    }

    pub async fn list_brokers(&self, principal: &Principal) -> Result<Vec<Broker>, Error> {
        principal.require(Capability::ManageOrganisations)?;
        self.organisations
            .list_brokers()
            .await
            .map_err(|err| map_repository_error("broker", err))
    }

    async fn find_broker(&self, id: &BrokerId) -> Result<Option<Broker>, Error> {
        self.organisations
            .find_broker(id)
            .await
            .map_err(|err| map_repository_error("broker", err))
    }

    /// A broker record; brokers may read their own.
    pub async fn get_broker(&self, principal: &Principal, id: &BrokerId) -> Result<Broker, Error> {
        let own = principal.permission == Permission::Broker
            && principal.profile.broker_id == Some(*id);
        if !own {
            principal.require(Capability::ManageOrganisations)?;
        }
        self.find_broker(id)
            .await?
            .ok_or_else(|| Error::not_found("broker not found"))
    }

    /// The broker record of the signed-in broker.
    pub async fn own_broker(&self, principal: &Principal) -> Result<Broker, Error> {
        if principal.permission != Permission::Broker {
            return Err(Error::forbidden("insufficient permissions"));
        }
        let linked = match principal.profile.broker_id {
            Some(id) => self.find_broker(&id).await?,
            None => self
                .organisations
                .find_broker_by_user(&principal.profile.id)
                .await
                .map_err(|err| map_repository_error("broker", err))?,
        };
        linked.ok_or_else(|| Error::not_found("broker not found"))
    }

    /// Store a new broker record. Inviting its contact is a separate step.
    pub async fn create_broker(
        &self,
        principal: &Principal,
        draft: BrokerDraft,
    ) -> Result<Broker, Error> {
        principal.require(Capability::ManageOrganisations)?;
        let broker = Broker {
            id: BrokerId::random(),
            company_name: draft.company_name,
            contact_name: draft.contact_name,
            email: draft.email,
            phone: draft.phone,
            user_id: None,
            created_at: self.clock.utc(),
        };
        self.organisations
            .save_broker(&broker)
            .await
            .map_err(|err| map_repository_error("broker", err))?;
        info!(broker_id = %broker.id, "broker created");
        Ok(broker)
    }

    pub async fn update_broker(
        &self,
        principal: &Principal,
        id: &BrokerId,
        draft: BrokerDraft,
    ) -> Result<Broker, Error> {
        principal.require(Capability::ManageOrganisations)?;
        let existing = self
            .find_broker(id)
            .await?
            .ok_or_else(|| Error::not_found("broker not found"))?;
        let broker = Broker {
            company_name: draft.company_name,
            contact_name: draft.contact_name,
            email: draft.email,
            phone: draft.phone,
            ..existing
        };
        self.organisations
            .save_broker(&broker)
            .await
            .map_err(|err| map_repository_error("broker", err))?;
        Ok(broker)
    }

    /// Delete a broker that no longer serves any customer.
    pub async fn delete_broker(&self, principal: &Principal, id: &BrokerId) -> Result<(), Error> {
        principal.require(Capability::ManageOrganisations)?;
        let customers = self
            .users
            .list(&UserFilter {
                role: Some(Role::Customer),
                broker_id: Some(*id),
                ..UserFilter::default()
            })
            .await
            .map_err(|err| map_repository_error("user", err))?;
        if !customers.is_empty() {
            return Err(in_use("broker", "broker_in_use"));
        }
        let removed = self
            .organisations
            .delete_broker(id)
            .await
            .map_err(|err| map_repository_error("broker", err))?;
        if !removed {
            return Err(Error::not_found("broker not found"));
        }
        info!(broker_id = %id, "broker deleted");
        Ok(())
    }

    pub async fn list_users(
        &self,
        principal: &Principal,
        filter: &UserFilter,
    ) -> Result<Vec<UserProfile>, Error> {
        principal.require(Capability::ManageUsers)?;
        self.users
            .list(filter)
            .await
            .map_err(|err| map_repository_error("user", err))
    }

    /// Apply an administrative update to an account.
    ///
    /// Referenced companies and brokers must exist. Administrators cannot
    /// disable or demote their own account.
    pub async fn update_user(
        &self,
        principal: &Principal,
        id: &UserId,
        update: UserUpdate,
    ) -> Result<UserProfile, Error> {
        principal.require(Capability::ManageUsers)?;
        if *id == principal.profile.id && (update.disabled || update.role != Role::Admin) {
            return Err(Error::invalid_request("cannot lock out your own account")
                .with_details(json!({ "code": "self_lockout" })));
        }
        if let Some(company_id) = update.company_id {
            if self.find_company(&company_id).await?.is_none() {
                return Err(unknown_reference("companyId", "unknown_company"));
            }
        }
        if let Some(broker_id) = update.broker_id {
            if self.find_broker(&broker_id).await?.is_none() {
                return Err(unknown_reference("brokerId", "unknown_broker"));
            }
        }

        let existing = self
            .users
            .find_by_id(id)
            .await
            .map_err(|err| map_repository_error("user", err))?
            .ok_or_else(|| Error::not_found("user not found"))?;
        let profile = UserProfile {
            role: update.role,
            portal_type: update.portal_type,
            company_id: update.company_id,
            broker_id: update.broker_id,
            disabled: update.disabled,
            ..existing
        };
        let updated = self
            .users
            .update(&profile)
            .await
            .map_err(|err| map_repository_error("user", err))?;
        if !updated {
            return Err(Error::not_found("user not found"));
        }
        info!(
            user_id = %profile.id,
            role = profile.role.as_str(),
            disabled = profile.disabled,
            "user updated"
        );
        Ok(profile)
    }

    /// Customer accounts served by the signed-in broker.
    pub async fn broker_customers(&self, principal: &Principal) -> Result<Vec<UserProfile>, Error> {
        let broker = self.own_broker(principal).await?;
        self.users
            .list(&UserFilter {
                role: Some(Role::Customer),
                broker_id: Some(broker.id),
                ..UserFilter::default()
            })
            .await
            .map_err(|err| map_repository_error("user", err))
    }
}
