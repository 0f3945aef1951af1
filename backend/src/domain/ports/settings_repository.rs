//! Port for the portal settings singleton.

use async_trait::async_trait;

use crate::domain::PortalSettings;

use super::RepositoryError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Stored settings, or `None` when nothing was saved yet.
    async fn load(&self) -> Result<Option<PortalSettings>, RepositoryError>;

    async fn save(&self, settings: &PortalSettings) -> Result<(), RepositoryError>;
}
