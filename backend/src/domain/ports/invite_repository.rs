//! Port for invitations and verification records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{BrokerId, CustomerInvite, EmployeeInvite, InviteId, Verification};

use super::RepositoryError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InviteRepository: Send + Sync {
    async fn save_employee_invite(&self, invite: &EmployeeInvite) -> Result<(), RepositoryError>;

    async fn find_employee_invite(
        &self,
        id: &InviteId,
    ) -> Result<Option<EmployeeInvite>, RepositoryError>;

    async fn save_customer_invite(&self, invite: &CustomerInvite) -> Result<(), RepositoryError>;

    async fn find_customer_invite(
        &self,
        id: &InviteId,
    ) -> Result<Option<CustomerInvite>, RepositoryError>;

    /// Customer invites not yet accepted, newest first.
    async fn pending_customer_invites(
        &self,
        broker_id: &BrokerId,
    ) -> Result<Vec<CustomerInvite>, RepositoryError>;

    async fn insert_verification(&self, verification: &Verification)
    -> Result<(), RepositoryError>;

    async fn find_verification(
        &self,
        token_hash: &str,
    ) -> Result<Option<Verification>, RepositoryError>;

    /// Stamp `consumed_at` unless already set.
    ///
    /// Returns `false` when the verification was missing or already consumed,
    /// so two concurrent registrations cannot both succeed.
    async fn consume_verification(
        &self,
        token_hash: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError>;

    /// Clear the `consumed_at` stamp again.
    ///
    /// Only the caller whose [`consume_verification`](Self::consume_verification)
    /// succeeded may release, after the account could not be stored.
    async fn release_verification(&self, token_hash: &str) -> Result<bool, RepositoryError>;
}
