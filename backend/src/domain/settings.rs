//! Portal-wide settings editable by administrators.

use serde::{Deserialize, Serialize};

use super::EmailAddress;

/// Default lifetime of invitation links.
pub const DEFAULT_INVITATION_TTL_HOURS: u32 = 72;
/// Default lifetime of password reset links.
pub const DEFAULT_PASSWORD_RESET_TTL_MINUTES: u32 = 60;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} must be positive")]
pub struct SettingsValidationError {
    pub field: &'static str,
}

/// Singleton settings document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalSettings {
    pub support_email: Option<EmailAddress>,
    pub invitation_ttl_hours: u32,
    pub password_reset_ttl_minutes: u32,
}

impl Default for PortalSettings {
    fn default() -> Self {
        Self {
            support_email: None,
            invitation_ttl_hours: DEFAULT_INVITATION_TTL_HOURS,
            password_reset_ttl_minutes: DEFAULT_PASSWORD_RESET_TTL_MINUTES,
        }
    }
}

impl PortalSettings {
    pub fn validate(self) -> Result<Self, SettingsValidationError> {
        if self.invitation_ttl_hours == 0 {
            return Err(SettingsValidationError {
                field: "invitationTtlHours",
            });
        }
        if self.password_reset_ttl_minutes == 0 {
            return Err(SettingsValidationError {
                field: "passwordResetTtlMinutes",
            });
        }
        Ok(self)
    }

    pub fn invitation_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.invitation_ttl_hours))
    }

    pub fn password_reset_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.password_reset_ttl_minutes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn defaults_match_documented_ttls() {
        let settings = PortalSettings::default();
        assert_eq!(settings.invitation_ttl(), chrono::Duration::hours(72));
        assert_eq!(settings.password_reset_ttl(), chrono::Duration::minutes(60));
    }

    #[rstest]
    fn zero_ttl_is_rejected() {
        let settings = PortalSettings {
            invitation_ttl_hours: 0,
            ..PortalSettings::default()
        };
        assert_eq!(
            settings.validate(),
            Err(SettingsValidationError {
                field: "invitationTtlHours"
            })
        );
    }
}
