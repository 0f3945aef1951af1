//! Port for companies and brokers.

use async_trait::async_trait;

use crate::domain::{Broker, BrokerId, Company, CompanyId, UserId};

use super::RepositoryError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrganisationRepository: Send + Sync {
    /// Companies ordered by name.
    async fn list_companies(&self) -> Result<Vec<Company>, RepositoryError>;

    async fn find_company(&self, id: &CompanyId) -> Result<Option<Company>, RepositoryError>;

    async fn save_company(&self, company: &Company) -> Result<(), RepositoryError>;

    async fn delete_company(&self, id: &CompanyId) -> Result<bool, RepositoryError>;

    /// Brokers ordered by company name.
    async fn list_brokers(&self) -> Result<Vec<Broker>, RepositoryError>;

    async fn find_broker(&self, id: &BrokerId) -> Result<Option<Broker>, RepositoryError>;

    /// Broker record linked to a portal account.
    async fn find_broker_by_user(&self, user_id: &UserId)
    -> Result<Option<Broker>, RepositoryError>;

    async fn save_broker(&self, broker: &Broker) -> Result<(), RepositoryError>;

    async fn delete_broker(&self, id: &BrokerId) -> Result<bool, RepositoryError>;
}
