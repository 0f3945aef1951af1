//! Port for account profiles and their password hashes.

use async_trait::async_trait;

use crate::domain::{BrokerId, CompanyId, EmailAddress, Role, UserId, UserProfile};

use super::RepositoryError;

/// Optional filters for listing users. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub role: Option<Role>,
    pub company_id: Option<CompanyId>,
    pub broker_id: Option<BrokerId>,
}

impl UserFilter {
    pub fn matches(&self, profile: &UserProfile) -> bool {
        self.role.is_none_or(|role| profile.role == role)
            && self
                .company_id
                .is_none_or(|id| profile.company_id == Some(id))
            && self.broker_id.is_none_or(|id| profile.broker_id == Some(id))
    }
}

/// Persistence for [`UserProfile`] documents.
///
/// E-mail addresses are unique; inserting a second profile with the same
/// address fails with [`RepositoryError::Duplicate`] on a constraint whose
/// name contains `email`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserProfile>, RepositoryError>;

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserProfile>, RepositoryError>;

    /// Stored password hash (PHC string) for an account.
    async fn find_password_hash(&self, id: &UserId) -> Result<Option<String>, RepositoryError>;

    /// Profiles matching `filter`, ordered by last then first name.
    async fn list(&self, filter: &UserFilter) -> Result<Vec<UserProfile>, RepositoryError>;

    async fn insert(
        &self,
        profile: &UserProfile,
        password_hash: &str,
    ) -> Result<(), RepositoryError>;

    /// Replace an existing profile. Returns `false` when it does not exist.
    async fn update(&self, profile: &UserProfile) -> Result<bool, RepositoryError>;

    async fn set_password_hash(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<bool, RepositoryError>;
}
