//! Read and update portal settings, falling back to defaults.

use std::sync::Arc;

use serde_json::json;
use tracing::info;

use crate::domain::ports::{SettingsRepository, map_repository_error};
use crate::domain::{Capability, Error, PortalSettings, Principal};

#[derive(Clone)]
pub struct SettingsService {
    repo: Arc<dyn SettingsRepository>,
}

impl SettingsService {
    pub fn new(repo: Arc<dyn SettingsRepository>) -> Self {
        Self { repo }
    }

    /// Effective settings: stored values or the defaults.
    pub async fn current(&self) -> Result<PortalSettings, Error> {
        Ok(self
            .repo
            .load()
            .await
            .map_err(|err| map_repository_error("settings", err))?
            .unwrap_or_default())
    }

    pub async fn get(&self, principal: &Principal) -> Result<PortalSettings, Error> {
        principal.require(Capability::ManageSettings)?;
        self.current().await
    }

    pub async fn update(
        &self,
        principal: &Principal,
        settings: PortalSettings,
    ) -> Result<PortalSettings, Error> {
        principal.require(Capability::ManageSettings)?;
        let settings = settings.validate().map_err(|err| {
            Error::invalid_request(err.to_string())
                .with_details(json!({ "field": err.field, "code": "not_positive" }))
        })?;
        self.repo
            .save(&settings)
            .await
            .map_err(|err| map_repository_error("settings", err))?;
        info!(user_id = %principal.profile.id, "portal settings updated");
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockSettingsRepository, RepositoryError};
    use crate::domain::test_support::principal;
    use crate::domain::{ErrorCode, Role};

    #[tokio::test]
    async fn missing_settings_fall_back_to_defaults() {
        let mut repo = MockSettingsRepository::new();
        repo.expect_load().return_once(|| Ok(None));
        let service = SettingsService::new(Arc::new(repo));

        let settings = service.current().await.expect("settings");
        assert_eq!(settings, PortalSettings::default());
    }

    #[tokio::test]
    async fn connection_failures_are_unavailable() {
        let mut repo = MockSettingsRepository::new();
        repo.expect_load()
            .return_once(|| Err(RepositoryError::connection("refused")));
        let service = SettingsService::new(Arc::new(repo));

        let err = service.current().await.expect_err("unavailable");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }

    #[tokio::test]
    async fn only_admins_update_settings() {
        let service = SettingsService::new(Arc::new(MockSettingsRepository::new()));
        let err = service
            .update(&principal(Role::Broker), PortalSettings::default())
            .await
            .expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn invalid_ttl_is_rejected_before_saving() {
        let service = SettingsService::new(Arc::new(MockSettingsRepository::new()));
        let settings = PortalSettings {
            password_reset_ttl_minutes: 0,
            ..PortalSettings::default()
        };
        let err = service
            .update(&principal(Role::Admin), settings)
            .await
            .expect_err("invalid");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }
}
