//! Builders shared by the domain service tests.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;

use super::{
    BrokerId, CompanyId, EmailAddress, PortalType, Principal, Role, UserId, UserProfile,
};

/// Clock whose time only moves when told to.
pub(crate) struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub(crate) fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub(crate) fn advance(&self, delta: Duration) {
        *self.lock_clock() += delta;
    }

    fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

pub(crate) fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 6, 9, 30, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

pub(crate) fn profile(role: Role) -> UserProfile {
    let slug = role.as_str();
    UserProfile {
        id: UserId::random(),
        email: EmailAddress::new(format!("{slug}@portal.example")).expect("email"),
        first_name: "Test".into(),
        last_name: slug.into(),
        role,
        portal_type: None,
        company_id: None,
        broker_id: None,
        phone: None,
        disabled: false,
        created_at: fixed_now(),
    }
}

pub(crate) fn principal(role: Role) -> Principal {
    Principal::resolve(profile(role)).expect("enabled profile")
}

pub(crate) fn employee(company_id: CompanyId, portal_type: PortalType) -> Principal {
    let mut profile = profile(Role::Employee);
    profile.company_id = Some(company_id);
    profile.portal_type = Some(portal_type);
    Principal::resolve(profile).expect("enabled profile")
}

pub(crate) fn broker(broker_id: BrokerId) -> Principal {
    let mut profile = profile(Role::Broker);
    profile.broker_id = Some(broker_id);
    Principal::resolve(profile).expect("enabled profile")
}

pub(crate) fn customer(broker_id: BrokerId) -> Principal {
    let mut profile = profile(Role::Customer);
    profile.broker_id = Some(broker_id);
    Principal::resolve(profile).expect("enabled profile")
}
