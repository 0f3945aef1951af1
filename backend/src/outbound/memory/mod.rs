//! In-process adapters used when no database is configured and in tests.
//!
//! [`MemoryStore`] implements every repository port over `RwLock`-guarded
//! maps. Data lives for the lifetime of the process.

mod mailer;
mod storage;

pub use mailer::RecordingMailer;
pub use storage::MemoryFileStorage;

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    CatalogueRepository, ContentRepository, InviteRepository, OrderRepository, OrderScope,
    OrganisationRepository, RepositoryError, SettingsRepository, TicketRepository, UserFilter,
    UserRepository,
};
use crate::domain::{
    Brand, BrandId, Broker, BrokerId, Company, CompanyId, CustomerInvite, EmailAddress,
    EmployeeInvite, Faq, FaqId, InviteId, NewsPost, NewsPostId, Order, OrderId, PortalSettings,
    Ticket, TicketId, UserId, UserProfile, Vehicle, VehicleId, Verification,
};

#[derive(Default)]
struct Collections {
    users: HashMap<UserId, (UserProfile, String)>,
    companies: HashMap<CompanyId, Company>,
    brokers: HashMap<BrokerId, Broker>,
    brands: HashMap<BrandId, Brand>,
    vehicles: HashMap<VehicleId, Vehicle>,
    orders: HashMap<OrderId, Order>,
    tickets: HashMap<TicketId, Ticket>,
    faqs: HashMap<FaqId, Faq>,
    news: HashMap<NewsPostId, NewsPost>,
    employee_invites: HashMap<InviteId, EmployeeInvite>,
    customer_invites: HashMap<InviteId, CustomerInvite>,
    verifications: HashMap<String, Verification>,
    settings: Option<PortalSettings>,
}

/// Thread-safe in-memory document store.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Collections>, RepositoryError> {
        self.inner
            .read()
            .map_err(|_| RepositoryError::query("memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Collections>, RepositoryError> {
        self.inner
            .write()
            .map_err(|_| RepositoryError::query("memory store lock poisoned"))
    }
}

fn sorted_by<T, K: Ord>(values: impl Iterator<Item = T>, key: impl Fn(&T) -> K) -> Vec<T> {
    let mut values: Vec<T> = values.collect();
    values.sort_by_key(|value| key(value));
    values
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserProfile>, RepositoryError> {
        Ok(self.read()?.users.get(id).map(|(profile, _)| profile.clone()))
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserProfile>, RepositoryError> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|(profile, _)| &profile.email == email)
            .map(|(profile, _)| profile.clone()))
    }

    async fn find_password_hash(&self, id: &UserId) -> Result<Option<String>, RepositoryError> {
        Ok(self.read()?.users.get(id).map(|(_, hash)| hash.clone()))
    }

    async fn list(&self, filter: &UserFilter) -> Result<Vec<UserProfile>, RepositoryError> {
        let guard = self.read()?;
        let matching = guard
            .users
            .values()
            .map(|(profile, _)| profile)
            .filter(|profile| filter.matches(profile))
            .cloned();
        Ok(sorted_by(matching, |profile| {
            (profile.last_name.clone(), profile.first_name.clone())
        }))
    }

    async fn insert(
        &self,
        profile: &UserProfile,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.write()?;
        if guard
            .users
            .values()
            .any(|(existing, _)| existing.email == profile.email)
        {
            return Err(RepositoryError::duplicate("users_email_key"));
        }
        guard
            .users
            .insert(profile.id, (profile.clone(), password_hash.to_owned()));
        Ok(())
    }

    async fn update(&self, profile: &UserProfile) -> Result<bool, RepositoryError> {
        let mut guard = self.write()?;
        Ok(match guard.users.get_mut(&profile.id) {
            Some((stored, _)) => {
                *stored = profile.clone();
                true
            }
            None => false,
        })
    }

    async fn set_password_hash(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<bool, RepositoryError> {
        let mut guard = self.write()?;
        Ok(match guard.users.get_mut(id) {
            Some((_, hash)) => {
                *hash = password_hash.to_owned();
                true
            }
            None => false,
        })
    }
}

#[async_trait]
impl CatalogueRepository for MemoryStore {
    async fn list_brands(&self) -> Result<Vec<Brand>, RepositoryError> {
        let guard = self.read()?;
        Ok(sorted_by(guard.brands.values().cloned(), |brand| {
            brand.name.to_lowercase()
        }))
    }

    async fn find_brand(&self, id: &BrandId) -> Result<Option<Brand>, RepositoryError> {
        Ok(self.read()?.brands.get(id).cloned())
    }

    async fn save_brand(&self, brand: &Brand) -> Result<(), RepositoryError> {
        self.write()?.brands.insert(brand.id, brand.clone());
        Ok(())
    }

    async fn delete_brand(&self, id: &BrandId) -> Result<bool, RepositoryError> {
        Ok(self.write()?.brands.remove(id).is_some())
    }

    async fn list_vehicles(&self) -> Result<Vec<Vehicle>, RepositoryError> {
        let guard = self.read()?;
        let mut vehicles: Vec<Vehicle> = guard.vehicles.values().cloned().collect();
        vehicles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(vehicles)
    }

    async fn find_vehicle(&self, id: &VehicleId) -> Result<Option<Vehicle>, RepositoryError> {
        Ok(self.read()?.vehicles.get(id).cloned())
    }

    async fn save_vehicle(&self, vehicle: &Vehicle) -> Result<(), RepositoryError> {
        self.write()?.vehicles.insert(vehicle.id, vehicle.clone());
        Ok(())
    }

    async fn delete_vehicle(&self, id: &VehicleId) -> Result<bool, RepositoryError> {
        Ok(self.write()?.vehicles.remove(id).is_some())
    }

    async fn brand_in_use(&self, id: &BrandId) -> Result<bool, RepositoryError> {
        Ok(self
            .read()?
            .vehicles
            .values()
            .any(|vehicle| vehicle.brand_id == *id))
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn list(&self, scope: OrderScope) -> Result<Vec<Order>, RepositoryError> {
        let guard = self.read()?;
        let mut orders: Vec<Order> = guard
            .orders
            .values()
            .filter(|order| scope.includes(order))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn find(&self, id: &OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.read()?.orders.get(id).cloned())
    }

    async fn save(&self, order: &Order) -> Result<(), RepositoryError> {
        self.write()?.orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn delete(&self, id: &OrderId) -> Result<bool, RepositoryError> {
        Ok(self.write()?.orders.remove(id).is_some())
    }
}

#[async_trait]
impl OrganisationRepository for MemoryStore {
    async fn list_companies(&self) -> Result<Vec<Company>, RepositoryError> {
        let guard = self.read()?;
        Ok(sorted_by(guard.companies.values().cloned(), |company| {
            company.name.to_lowercase()
        }))
    }

    async fn find_company(&self, id: &CompanyId) -> Result<Option<Company>, RepositoryError> {
        Ok(self.read()?.companies.get(id).cloned())
    }

    async fn save_company(&self, company: &Company) -> Result<(), RepositoryError> {
        self.write()?.companies.insert(company.id, company.clone());
        Ok(())
    }

    async fn delete_company(&self, id: &CompanyId) -> Result<bool, RepositoryError> {
        Ok(self.write()?.companies.remove(id).is_some())
    }

    async fn list_brokers(&self) -> Result<Vec<Broker>, RepositoryError> {
        let guard = self.read()?;
        Ok(sorted_by(guard.brokers.values().cloned(), |broker| {
            broker.company_name.to_lowercase()
        }))
    }

    async fn find_broker(&self, id: &BrokerId) -> Result<Option<Broker>, RepositoryError> {
        Ok(self.read()?.brokers.get(id).cloned())
    }

    async fn find_broker_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Broker>, RepositoryError> {
        Ok(self
            .read()?
            .brokers
            .values()
            .find(|broker| broker.user_id == Some(*user_id))
            .cloned())
    }

    async fn save_broker(&self, broker: &Broker) -> Result<(), RepositoryError> {
        self.write()?.brokers.insert(broker.id, broker.clone());
        Ok(())
    }

    async fn delete_broker(&self, id: &BrokerId) -> Result<bool, RepositoryError> {
        Ok(self.write()?.brokers.remove(id).is_some())
    }
}

#[async_trait]
impl InviteRepository for MemoryStore {
    async fn save_employee_invite(&self, invite: &EmployeeInvite) -> Result<(), RepositoryError> {
        self.write()?
            .employee_invites
            .insert(invite.id, invite.clone());
        Ok(())
    }

    async fn find_employee_invite(
        &self,
        id: &InviteId,
    ) -> Result<Option<EmployeeInvite>, RepositoryError> {
        Ok(self.read()?.employee_invites.get(id).cloned())
    }

    async fn save_customer_invite(&self, invite: &CustomerInvite) -> Result<(), RepositoryError> {
        self.write()?
            .customer_invites
            .insert(invite.id, invite.clone());
        Ok(())
    }

    async fn find_customer_invite(
        &self,
        id: &InviteId,
    ) -> Result<Option<CustomerInvite>, RepositoryError> {
        Ok(self.read()?.customer_invites.get(id).cloned())
    }

    async fn pending_customer_invites(
        &self,
        broker_id: &BrokerId,
    ) -> Result<Vec<CustomerInvite>, RepositoryError> {
        let guard = self.read()?;
        let mut invites: Vec<CustomerInvite> = guard
            .customer_invites
            .values()
            .filter(|invite| invite.broker_id == *broker_id && invite.accepted_at.is_none())
            .cloned()
            .collect();
        invites.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(invites)
    }

    async fn insert_verification(
        &self,
        verification: &Verification,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.write()?;
        if guard.verifications.contains_key(&verification.token_hash) {
            return Err(RepositoryError::duplicate("verifications_pkey"));
        }
        guard
            .verifications
            .insert(verification.token_hash.clone(), verification.clone());
        Ok(())
    }

    async fn find_verification(
        &self,
        token_hash: &str,
    ) -> Result<Option<Verification>, RepositoryError> {
        Ok(self.read()?.verifications.get(token_hash).cloned())
    }

    async fn consume_verification(
        &self,
        token_hash: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let mut guard = self.write()?;
        Ok(match guard.verifications.get_mut(token_hash) {
            Some(verification) if verification.consumed_at.is_none() => {
                verification.consumed_at = Some(at);
                true
            }
            _ => false,
        })
    }

    async fn release_verification(&self, token_hash: &str) -> Result<bool, RepositoryError> {
        let mut guard = self.write()?;
        Ok(guard
            .verifications
            .get_mut(token_hash)
            .and_then(|verification| verification.consumed_at.take())
            .is_some())
    }
}

#[async_trait]
impl TicketRepository for MemoryStore {
    async fn list(&self, created_by: Option<UserId>) -> Result<Vec<Ticket>, RepositoryError> {
        let guard = self.read()?;
        let mut tickets: Vec<Ticket> = guard
            .tickets
            .values()
            .filter(|ticket| created_by.is_none_or(|user_id| ticket.created_by == user_id))
            .cloned()
            .collect();
        tickets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tickets)
    }

    async fn find(&self, id: &TicketId) -> Result<Option<Ticket>, RepositoryError> {
        Ok(self.read()?.tickets.get(id).cloned())
    }

    async fn save(&self, ticket: &Ticket) -> Result<(), RepositoryError> {
        self.write()?.tickets.insert(ticket.id, ticket.clone());
        Ok(())
    }
}

#[async_trait]
impl ContentRepository for MemoryStore {
    async fn list_faqs(&self) -> Result<Vec<Faq>, RepositoryError> {
        Ok(self.read()?.faqs.values().cloned().collect())
    }

    async fn find_faq(&self, id: &FaqId) -> Result<Option<Faq>, RepositoryError> {
        Ok(self.read()?.faqs.get(id).cloned())
    }

    async fn save_faq(&self, faq: &Faq) -> Result<(), RepositoryError> {
        self.write()?.faqs.insert(faq.id, faq.clone());
        Ok(())
    }

    async fn delete_faq(&self, id: &FaqId) -> Result<bool, RepositoryError> {
        Ok(self.write()?.faqs.remove(id).is_some())
    }

    async fn list_news(&self) -> Result<Vec<NewsPost>, RepositoryError> {
        Ok(self.read()?.news.values().cloned().collect())
    }

    async fn find_news(&self, id: &NewsPostId) -> Result<Option<NewsPost>, RepositoryError> {
        Ok(self.read()?.news.get(id).cloned())
    }

    async fn save_news(&self, post: &NewsPost) -> Result<(), RepositoryError> {
        self.write()?.news.insert(post.id, post.clone());
        Ok(())
    }

    async fn delete_news(&self, id: &NewsPostId) -> Result<bool, RepositoryError> {
        Ok(self.write()?.news.remove(id).is_some())
    }
}

#[async_trait]
impl SettingsRepository for MemoryStore {
    async fn load(&self) -> Result<Option<PortalSettings>, RepositoryError> {
        Ok(self.read()?.settings.clone())
    }

    async fn save(&self, settings: &PortalSettings) -> Result<(), RepositoryError> {
        self.write()?.settings = Some(settings.clone());
        Ok(())
    }
}
