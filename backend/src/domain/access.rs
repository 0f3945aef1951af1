//! Role resolution and capability guards.
//!
//! A profile's `role` and `portal_type` map onto a [`Permission`]. The
//! mapping is recomputed for every authenticated request so role changes
//! take effect without signing out.

use serde::{Deserialize, Serialize};

use super::{Error, PortalType, Role, UserProfile, VehicleCategory};

/// Resolved access level of an authenticated account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Admin,
    Employee,
    SalaryEmployee,
    Broker,
    Customer,
}

/// Guarded operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ManageCatalogue,
    ManageUsers,
    ManageOrganisations,
    ManageOrders,
    InviteEmployees,
    InviteCustomers,
    ManageContent,
    ManageTickets,
    ManageSettings,
    PlaceOrders,
    UploadFiles,
}

/// Map a profile onto its permission.
///
/// Disabled profiles resolve to `None` and are treated as signed out.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use fleet_backend::domain::{
///     resolve_permission, EmailAddress, Permission, PortalType, Role, UserId, UserProfile,
/// };
///
/// let profile = UserProfile {
///     id: UserId::random(),
///     email: EmailAddress::new("lea@example.de").expect("email"),
///     first_name: "Lea".into(),
///     last_name: "Maier".into(),
///     role: Role::Employee,
///     portal_type: Some(PortalType::Salary),
///     company_id: None,
///     broker_id: None,
///     phone: None,
///     disabled: false,
///     created_at: Utc::now(),
/// };
/// assert_eq!(resolve_permission(&profile), Some(Permission::SalaryEmployee));
/// ```
pub fn resolve_permission(profile: &UserProfile) -> Option<Permission> {
    if profile.disabled {
        return None;
    }
    let permission = match profile.role {
        Role::Admin => Permission::Admin,
        Role::Employee => match profile.portal_type {
            Some(PortalType::Salary) => Permission::SalaryEmployee,
            Some(PortalType::Normal) | None => Permission::Employee,
        },
        Role::Broker => Permission::Broker,
        Role::Customer => Permission::Customer,
    };
    Some(permission)
}

impl Permission {
    /// Whether this permission may perform `capability`.
    pub fn allows(self, capability: Capability) -> bool {
        match self {
            Self::Admin => true,
            Self::Broker => matches!(
                capability,
                Capability::InviteCustomers | Capability::PlaceOrders | Capability::UploadFiles
            ),
            Self::Employee | Self::SalaryEmployee | Self::Customer => {
                matches!(capability, Capability::PlaceOrders | Capability::UploadFiles)
            }
        }
    }

    /// Vehicle categories shown in this permission's catalogue views.
    pub fn visible_categories(self) -> &'static [VehicleCategory] {
        match self {
            Self::Admin => &[
                VehicleCategory::Regular,
                VehicleCategory::Company,
                VehicleCategory::Salary,
            ],
            Self::Employee => &[VehicleCategory::Company],
            Self::SalaryEmployee => &[VehicleCategory::Salary],
            Self::Broker | Self::Customer => &[VehicleCategory::Regular],
        }
    }

    /// Wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Employee => "employee",
            Self::SalaryEmployee => "salary_employee",
            Self::Broker => "broker",
            Self::Customer => "customer",
        }
    }
}

/// Authenticated caller: the profile plus its resolved permission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub profile: UserProfile,
    pub permission: Permission,
}

impl Principal {
    /// Resolve a principal, returning `None` for disabled profiles.
    pub fn resolve(profile: UserProfile) -> Option<Self> {
        resolve_permission(&profile).map(|permission| Self {
            profile,
            permission,
        })
    }

    /// Fail with `403 Forbidden` unless the capability is granted.
    pub fn require(&self, capability: Capability) -> Result<(), Error> {
        if self.permission.allows(capability) {
            Ok(())
        } else {
            Err(Error::forbidden("insufficient permissions"))
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.permission, Permission::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EmailAddress, ErrorCode, UserId};
    use chrono::Utc;
    use rstest::{fixture, rstest};

    #[fixture]
    fn profile() -> UserProfile {
        UserProfile {
            id: UserId::random(),
            email: EmailAddress::new("test@example.de").expect("email"),
            first_name: "Test".into(),
            last_name: "Person".into(),
            role: Role::Customer,
            portal_type: None,
            company_id: None,
            broker_id: None,
            phone: None,
            disabled: false,
            created_at: Utc::now(),
        }
    }

    #[rstest]
    #[case(Role::Admin, None, Permission::Admin)]
    #[case(Role::Admin, Some(PortalType::Salary), Permission::Admin)]
    #[case(Role::Employee, None, Permission::Employee)]
    #[case(Role::Employee, Some(PortalType::Normal), Permission::Employee)]
    #[case(Role::Employee, Some(PortalType::Salary), Permission::SalaryEmployee)]
    #[case(Role::Broker, None, Permission::Broker)]
    #[case(Role::Customer, Some(PortalType::Salary), Permission::Customer)]
    fn resolves_role_and_portal_type(
        mut profile: UserProfile,
        #[case] role: Role,
        #[case] portal_type: Option<PortalType>,
        #[case] expected: Permission,
    ) {
        profile.role = role;
        profile.portal_type = portal_type;
        assert_eq!(resolve_permission(&profile), Some(expected));
    }

    #[rstest]
    fn disabled_profiles_have_no_permission(mut profile: UserProfile) {
        profile.role = Role::Admin;
        profile.disabled = true;
        assert_eq!(resolve_permission(&profile), None);
        assert!(Principal::resolve(profile).is_none());
    }

    #[rstest]
    #[case(Permission::Admin, Capability::ManageSettings, true)]
    #[case(Permission::Broker, Capability::InviteCustomers, true)]
    #[case(Permission::Broker, Capability::InviteEmployees, false)]
    #[case(Permission::Broker, Capability::ManageCatalogue, false)]
    #[case(Permission::Employee, Capability::PlaceOrders, true)]
    #[case(Permission::SalaryEmployee, Capability::ManageTickets, false)]
    #[case(Permission::Customer, Capability::UploadFiles, true)]
    #[case(Permission::Customer, Capability::InviteCustomers, false)]
    fn capability_matrix(
        #[case] permission: Permission,
        #[case] capability: Capability,
        #[case] expected: bool,
    ) {
        assert_eq!(permission.allows(capability), expected);
    }

    #[rstest]
    fn visible_categories_follow_portal() {
        assert_eq!(
            Permission::SalaryEmployee.visible_categories(),
            &[VehicleCategory::Salary]
        );
        assert_eq!(
            Permission::Employee.visible_categories(),
            &[VehicleCategory::Company]
        );
        assert_eq!(Permission::Admin.visible_categories().len(), 3);
    }

    #[rstest]
    fn require_returns_forbidden(profile: UserProfile) {
        let principal = Principal::resolve(profile).expect("enabled profile");
        let err = principal
            .require(Capability::ManageContent)
            .expect_err("customers cannot manage content");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }
}
