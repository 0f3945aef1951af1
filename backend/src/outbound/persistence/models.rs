//! Internal Diesel row structs and their conversions.
//!
//! Rows never leave the persistence layer. Each row converts into its domain
//! document with `TryFrom`; a row that fails to convert (unknown enum value,
//! malformed JSON, out-of-range integer) is reported as a query error rather
//! than silently defaulted.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::ports::RepositoryError;
use crate::domain::{
    Brand, BrandId, Broker, BrokerId, Company, CompanyId, CustomerInvite, EmailAddress,
    EmployeeInvite, Faq, FaqId, InviteId, NewsPost, NewsPostId, Order, OrderId, PortalSettings,
    Ticket, TicketId, UserId, UserProfile, Vehicle, VehicleCategory, VehicleId, Verification,
    VerificationKind,
};

use super::schema::{
    brands, brokers, companies, customer_invites, employee_invites, faqs, news_posts, orders,
    portal_settings, tickets, users, vehicles, verifications,
};

fn corrupt(table: &str, detail: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::query(format!("invalid {table} row: {detail}"))
}

fn parse<T: std::str::FromStr>(table: &str, raw: &str) -> Result<T, RepositoryError>
where
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|err| corrupt(table, err))
}

fn email(table: &str, raw: String) -> Result<EmailAddress, RepositoryError> {
    EmailAddress::new(raw).map_err(|err| corrupt(table, err))
}

/// Narrow a domain integer into a PostgreSQL `INTEGER`.
pub(crate) fn to_db_int<T>(value: T) -> Result<i32, RepositoryError>
where
    i32: TryFrom<T>,
{
    i32::try_from(value).map_err(|_| RepositoryError::query("integer out of range for column"))
}

fn from_db_int<T: TryFrom<i32>>(table: &str, value: i32) -> Result<T, RepositoryError> {
    T::try_from(value).map_err(|_| corrupt(table, format!("integer {value} out of range")))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, RepositoryError> {
    serde_json::to_value(value).map_err(|err| RepositoryError::query(err.to_string()))
}

fn from_json<T: serde::de::DeserializeOwned>(table: &str, value: Value) -> Result<T, RepositoryError> {
    serde_json::from_value(value).map_err(|err| corrupt(table, err))
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub portal_type: Option<String>,
    pub company_id: Option<Uuid>,
    pub broker_id: Option<Uuid>,
    pub phone: Option<String>,
    pub disabled: bool,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Profile columns; the password hash is changed separately.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserProfileChangeset {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub portal_type: Option<String>,
    pub company_id: Option<Uuid>,
    pub broker_id: Option<Uuid>,
    pub phone: Option<String>,
    pub disabled: bool,
}

impl UserRow {
    pub(crate) fn new(profile: &UserProfile, password_hash: &str) -> Self {
        let changes = UserProfileChangeset::from(profile);
        Self {
            id: *profile.id.as_uuid(),
            email: changes.email,
            first_name: changes.first_name,
            last_name: changes.last_name,
            role: changes.role,
            portal_type: changes.portal_type,
            company_id: changes.company_id,
            broker_id: changes.broker_id,
            phone: changes.phone,
            disabled: changes.disabled,
            password_hash: password_hash.to_owned(),
            created_at: profile.created_at,
        }
    }
}

impl From<&UserProfile> for UserProfileChangeset {
    fn from(profile: &UserProfile) -> Self {
        Self {
            email: profile.email.to_string(),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            role: profile.role.as_str().to_owned(),
            portal_type: profile.portal_type.map(|kind| kind.as_str().to_owned()),
            company_id: profile.company_id.map(|id| *id.as_uuid()),
            broker_id: profile.broker_id.map(|id| *id.as_uuid()),
            phone: profile.phone.clone(),
            disabled: profile.disabled,
        }
    }
}

impl TryFrom<UserRow> for UserProfile {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::from_uuid(row.id),
            email: email("users", row.email)?,
            first_name: row.first_name,
            last_name: row.last_name,
            role: parse("users", &row.role)?,
            portal_type: row
                .portal_type
                .as_deref()
                .map(|raw| parse("users", raw))
                .transpose()?,
            company_id: row.company_id.map(CompanyId::from_uuid),
            broker_id: row.broker_id.map(BrokerId::from_uuid),
            phone: row.phone,
            disabled: row.disabled,
            created_at: row.created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Companies and brokers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = companies)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct CompanyRow {
    pub id: Uuid,
    pub name: String,
    pub street: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub contact_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Company> for CompanyRow {
    fn from(company: &Company) -> Self {
        Self {
            id: *company.id.as_uuid(),
            name: company.name.clone(),
            street: company.street.clone(),
            postal_code: company.postal_code.clone(),
            city: company.city.clone(),
            contact_email: company.contact_email.as_ref().map(ToString::to_string),
            created_at: company.created_at,
        }
    }
}

impl TryFrom<CompanyRow> for Company {
    type Error = RepositoryError;

    fn try_from(row: CompanyRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: CompanyId::from_uuid(row.id),
            name: row.name,
            street: row.street,
            postal_code: row.postal_code,
            city: row.city,
            contact_email: row
                .contact_email
                .map(|raw| email("companies", raw))
                .transpose()?,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = brokers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct BrokerRow {
    pub id: Uuid,
    pub company_name: String,
    pub contact_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<&Broker> for BrokerRow {
    fn from(broker: &Broker) -> Self {
        Self {
            id: *broker.id.as_uuid(),
            company_name: broker.company_name.clone(),
            contact_name: broker.contact_name.clone(),
            email: broker.email.to_string(),
            phone: broker.phone.clone(),
            user_id: broker.user_id.map(|id| *id.as_uuid()),
            created_at: broker.created_at,
        }
    }
}

impl TryFrom<BrokerRow> for Broker {
    type Error = RepositoryError;

    fn try_from(row: BrokerRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: BrokerId::from_uuid(row.id),
            company_name: row.company_name,
            contact_name: row.contact_name,
            email: email("brokers", row.email)?,
            phone: row.phone,
            user_id: row.user_id.map(UserId::from_uuid),
            created_at: row.created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Catalogue
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = brands)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct BrandRow {
    pub id: Uuid,
    pub name: String,
    pub logo_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Brand> for BrandRow {
    fn from(brand: &Brand) -> Self {
        Self {
            id: *brand.id.as_uuid(),
            name: brand.name.clone(),
            logo_key: brand.logo_key.clone(),
            created_at: brand.created_at,
        }
    }
}

impl From<BrandRow> for Brand {
    fn from(row: BrandRow) -> Self {
        Self {
            id: BrandId::from_uuid(row.id),
            name: row.name,
            logo_key: row.logo_key,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = vehicles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct VehicleRow {
    pub id: Uuid,
    pub brand_id: Uuid,
    pub model: String,
    pub variant: Option<String>,
    pub fuel_type: String,
    pub power_kw: Option<i32>,
    pub list_price_cents: i64,
    pub categories: Vec<String>,
    pub price_matrix: Value,
    pub image_keys: Vec<String>,
    pub description: Option<String>,
    pub available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<&Vehicle> for VehicleRow {
    type Error = RepositoryError;

    fn try_from(vehicle: &Vehicle) -> Result<Self, Self::Error> {
        Ok(Self {
            id: *vehicle.id.as_uuid(),
            brand_id: *vehicle.brand_id.as_uuid(),
            model: vehicle.model.clone(),
            variant: vehicle.variant.clone(),
            fuel_type: vehicle.fuel_type.as_str().to_owned(),
            power_kw: vehicle.power_kw.map(to_db_int).transpose()?,
            list_price_cents: vehicle.list_price_cents,
            categories: vehicle
                .categories
                .iter()
                .map(|category| category.as_str().to_owned())
                .collect(),
            price_matrix: to_json(&vehicle.price_matrix)?,
            image_keys: vehicle.image_keys.clone(),
            description: vehicle.description.clone(),
            available: vehicle.available,
            created_at: vehicle.created_at,
            updated_at: vehicle.updated_at,
        })
    }
}

impl TryFrom<VehicleRow> for Vehicle {
    type Error = RepositoryError;

    fn try_from(row: VehicleRow) -> Result<Self, Self::Error> {
        let categories = row
            .categories
            .iter()
            .map(|raw| parse::<VehicleCategory>("vehicles", raw))
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(Self {
            id: VehicleId::from_uuid(row.id),
            brand_id: BrandId::from_uuid(row.brand_id),
            model: row.model,
            variant: row.variant,
            fuel_type: parse("vehicles", &row.fuel_type)?,
            power_kw: row
                .power_kw
                .map(|kw| from_db_int("vehicles", kw))
                .transpose()?,
            list_price_cents: row.list_price_cents,
            categories,
            price_matrix: from_json("vehicles", row.price_matrix)?,
            image_keys: row.image_keys,
            description: row.description,
            available: row.available,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct OrderRow {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub ordered_by: Uuid,
    pub company_id: Option<Uuid>,
    pub broker_id: Option<Uuid>,
    pub duration_months: i32,
    pub annual_mileage_km: i32,
    pub monthly_rate_cents: i64,
    pub status: String,
    pub status_history: Value,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<&Order> for OrderRow {
    type Error = RepositoryError;

    fn try_from(order: &Order) -> Result<Self, Self::Error> {
        Ok(Self {
            id: *order.id.as_uuid(),
            vehicle_id: *order.vehicle_id.as_uuid(),
            ordered_by: *order.ordered_by.as_uuid(),
            company_id: order.company_id.map(|id| *id.as_uuid()),
            broker_id: order.broker_id.map(|id| *id.as_uuid()),
            duration_months: i32::from(order.duration_months),
            annual_mileage_km: to_db_int(order.annual_mileage_km)?,
            monthly_rate_cents: order.monthly_rate_cents,
            status: order.status.as_str().to_owned(),
            status_history: to_json(&order.status_history)?,
            notes: order.notes.clone(),
            created_at: order.created_at,
            updated_at: order.updated_at,
        })
    }
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: OrderId::from_uuid(row.id),
            vehicle_id: VehicleId::from_uuid(row.vehicle_id),
            ordered_by: UserId::from_uuid(row.ordered_by),
            company_id: row.company_id.map(CompanyId::from_uuid),
            broker_id: row.broker_id.map(BrokerId::from_uuid),
            duration_months: from_db_int("orders", row.duration_months)?,
            annual_mileage_km: from_db_int("orders", row.annual_mileage_km)?,
            monthly_rate_cents: row.monthly_rate_cents,
            status: parse("orders", &row.status)?,
            status_history: from_json("orders", row.status_history)?,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Tickets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = tickets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TicketRow {
    pub id: Uuid,
    pub created_by: Uuid,
    pub subject: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub attachment_keys: Vec<String>,
    pub messages: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<&Ticket> for TicketRow {
    type Error = RepositoryError;

    fn try_from(ticket: &Ticket) -> Result<Self, Self::Error> {
        Ok(Self {
            id: *ticket.id.as_uuid(),
            created_by: *ticket.created_by.as_uuid(),
            subject: ticket.subject.clone(),
            description: ticket.description.clone(),
            status: ticket.status.as_str().to_owned(),
            priority: ticket.priority.as_str().to_owned(),
            attachment_keys: ticket.attachment_keys.clone(),
            messages: to_json(&ticket.messages)?,
            created_at: ticket.created_at,
            updated_at: ticket.updated_at,
        })
    }
}

impl TryFrom<TicketRow> for Ticket {
    type Error = RepositoryError;

    fn try_from(row: TicketRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: TicketId::from_uuid(row.id),
            created_by: UserId::from_uuid(row.created_by),
            subject: row.subject,
            description: row.description,
            status: parse("tickets", &row.status)?,
            priority: parse("tickets", &row.priority)?,
            attachment_keys: row.attachment_keys,
            messages: from_json("tickets", row.messages)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = faqs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct FaqRow {
    pub id: Uuid,
    pub question: String,
    pub answer_html: String,
    pub category: Option<String>,
    pub position: i32,
    pub image_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Faq> for FaqRow {
    fn from(faq: &Faq) -> Self {
        Self {
            id: *faq.id.as_uuid(),
            question: faq.question.clone(),
            answer_html: faq.answer_html.clone(),
            category: faq.category.clone(),
            position: faq.position,
            image_key: faq.image_key.clone(),
            created_at: faq.created_at,
        }
    }
}

impl From<FaqRow> for Faq {
    fn from(row: FaqRow) -> Self {
        Self {
            id: FaqId::from_uuid(row.id),
            question: row.question,
            answer_html: row.answer_html,
            category: row.category,
            position: row.position,
            image_key: row.image_key,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = news_posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct NewsPostRow {
    pub id: Uuid,
    pub title: String,
    pub body_html: String,
    pub image_key: Option<String>,
    pub published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&NewsPost> for NewsPostRow {
    fn from(post: &NewsPost) -> Self {
        Self {
            id: *post.id.as_uuid(),
            title: post.title.clone(),
            body_html: post.body_html.clone(),
            image_key: post.image_key.clone(),
            published: post.published,
            published_at: post.published_at,
            created_at: post.created_at,
        }
    }
}

impl From<NewsPostRow> for NewsPost {
    fn from(row: NewsPostRow) -> Self {
        Self {
            id: NewsPostId::from_uuid(row.id),
            title: row.title,
            body_html: row.body_html,
            image_key: row.image_key,
            published: row.published,
            published_at: row.published_at,
            created_at: row.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Invitations and verifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = employee_invites)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct EmployeeInviteRow {
    pub id: Uuid,
    pub email: String,
    pub company_id: Uuid,
    pub portal_type: String,
    pub invited_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
}

impl From<&EmployeeInvite> for EmployeeInviteRow {
    fn from(invite: &EmployeeInvite) -> Self {
        Self {
            id: *invite.id.as_uuid(),
            email: invite.email.to_string(),
            company_id: *invite.company_id.as_uuid(),
            portal_type: invite.portal_type.as_str().to_owned(),
            invited_by: *invite.invited_by.as_uuid(),
            created_at: invite.created_at,
            accepted_at: invite.accepted_at,
        }
    }
}

impl TryFrom<EmployeeInviteRow> for EmployeeInvite {
    type Error = RepositoryError;

    fn try_from(row: EmployeeInviteRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: InviteId::from_uuid(row.id),
            email: email("employee_invites", row.email)?,
            company_id: CompanyId::from_uuid(row.company_id),
            portal_type: parse("employee_invites", &row.portal_type)?,
            invited_by: UserId::from_uuid(row.invited_by),
            created_at: row.created_at,
            accepted_at: row.accepted_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = customer_invites)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct CustomerInviteRow {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub broker_id: Uuid,
    pub invited_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
}

impl From<&CustomerInvite> for CustomerInviteRow {
    fn from(invite: &CustomerInvite) -> Self {
        Self {
            id: *invite.id.as_uuid(),
            email: invite.email.to_string(),
            first_name: invite.first_name.clone(),
            last_name: invite.last_name.clone(),
            broker_id: *invite.broker_id.as_uuid(),
            invited_by: *invite.invited_by.as_uuid(),
            created_at: invite.created_at,
            accepted_at: invite.accepted_at,
        }
    }
}

impl TryFrom<CustomerInviteRow> for CustomerInvite {
    type Error = RepositoryError;

    fn try_from(row: CustomerInviteRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: InviteId::from_uuid(row.id),
            email: email("customer_invites", row.email)?,
            first_name: row.first_name,
            last_name: row.last_name,
            broker_id: BrokerId::from_uuid(row.broker_id),
            invited_by: UserId::from_uuid(row.invited_by),
            created_at: row.created_at,
            accepted_at: row.accepted_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = verifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct VerificationRow {
    pub token_hash: String,
    pub email: String,
    pub kind: String,
    pub reference_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
}

impl From<&Verification> for VerificationRow {
    fn from(verification: &Verification) -> Self {
        Self {
            token_hash: verification.token_hash.clone(),
            email: verification.email.to_string(),
            kind: verification.kind.as_str().to_owned(),
            reference_id: verification.kind.reference(),
            created_at: verification.created_at,
            expires_at: verification.expires_at,
            consumed_at: verification.consumed_at,
        }
    }
}

impl TryFrom<VerificationRow> for Verification {
    type Error = RepositoryError;

    fn try_from(row: VerificationRow) -> Result<Self, Self::Error> {
        Ok(Self {
            kind: VerificationKind::from_parts(&row.kind, row.reference_id)
                .map_err(|err| corrupt("verifications", err))?,
            token_hash: row.token_hash,
            email: email("verifications", row.email)?,
            created_at: row.created_at,
            expires_at: row.expires_at,
            consumed_at: row.consumed_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Primary key of the single settings row.
pub(crate) const SETTINGS_ROW_ID: i32 = 1;

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = portal_settings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct PortalSettingsRow {
    pub id: i32,
    pub support_email: Option<String>,
    pub invitation_ttl_hours: i32,
    pub password_reset_ttl_minutes: i32,
}

impl TryFrom<&PortalSettings> for PortalSettingsRow {
    type Error = RepositoryError;

    fn try_from(settings: &PortalSettings) -> Result<Self, Self::Error> {
        Ok(Self {
            id: SETTINGS_ROW_ID,
            support_email: settings.support_email.as_ref().map(ToString::to_string),
            invitation_ttl_hours: to_db_int(settings.invitation_ttl_hours)?,
            password_reset_ttl_minutes: to_db_int(settings.password_reset_ttl_minutes)?,
        })
    }
}

impl TryFrom<PortalSettingsRow> for PortalSettings {
    type Error = RepositoryError;

    fn try_from(row: PortalSettingsRow) -> Result<Self, Self::Error> {
        Ok(Self {
            support_email: row
                .support_email
                .map(|raw| email("portal_settings", raw))
                .transpose()?,
            invitation_ttl_hours: from_db_int("portal_settings", row.invitation_ttl_hours)?,
            password_reset_ttl_minutes: from_db_int(
                "portal_settings",
                row.password_reset_ttl_minutes,
            )?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FuelType, OrderStatus, PriceMatrix, Role, StatusChange};
    use rstest::rstest;

    fn vehicle() -> Vehicle {
        Vehicle {
            id: VehicleId::random(),
            brand_id: BrandId::random(),
            model: "ID.4".into(),
            variant: Some("Pro".into()),
            fuel_type: FuelType::Electric,
            power_kw: Some(150),
            list_price_cents: 4_500_000,
            categories: BTreeSet::from([VehicleCategory::Company, VehicleCategory::Salary]),
            price_matrix: PriceMatrix::new(vec![36], vec![10_000], vec![vec![45_900]])
                .expect("matrix"),
            image_keys: vec![],
            description: None,
            available: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[rstest]
    fn vehicle_row_keeps_categories_and_matrix() {
        let original = vehicle();
        let row = VehicleRow::try_from(&original).expect("row");
        assert_eq!(row.categories, ["company", "salary"]);
        assert_eq!(Vehicle::try_from(row).expect("vehicle"), original);
    }

    #[rstest]
    fn malformed_matrix_is_a_query_error() {
        let mut row = VehicleRow::try_from(&vehicle()).expect("row");
        row.price_matrix = serde_json::json!({ "durationsMonths": [] });
        let err = Vehicle::try_from(row).expect_err("corrupt");
        assert!(matches!(err, RepositoryError::Query { .. }));
    }

    #[rstest]
    fn unknown_role_is_rejected() {
        let row = UserRow {
            id: Uuid::new_v4(),
            email: "x@portal.example".into(),
            first_name: "X".into(),
            last_name: "Y".into(),
            role: "superuser".into(),
            portal_type: None,
            company_id: None,
            broker_id: None,
            phone: None,
            disabled: false,
            password_hash: "hash".into(),
            created_at: Utc::now(),
        };
        let err = UserProfile::try_from(row).expect_err("unknown role");
        assert!(err.to_string().contains("superuser"));
    }

    #[rstest]
    fn user_row_carries_profile_fields() {
        let profile = UserProfile {
            id: UserId::random(),
            email: EmailAddress::new("anna@portal.example").expect("email"),
            first_name: "Anna".into(),
            last_name: "Berg".into(),
            role: Role::Employee,
            portal_type: Some(crate::domain::PortalType::Salary),
            company_id: Some(CompanyId::random()),
            broker_id: None,
            phone: None,
            disabled: false,
            created_at: Utc::now(),
        };
        let row = UserRow::new(&profile, "$argon2id$hash");
        assert_eq!(row.portal_type.as_deref(), Some("salary"));
        assert_eq!(UserProfile::try_from(row).expect("profile"), profile);
    }

    #[rstest]
    fn order_history_survives_json() {
        let now = Utc::now();
        let order = Order {
            id: OrderId::random(),
            vehicle_id: VehicleId::random(),
            ordered_by: UserId::random(),
            company_id: None,
            broker_id: Some(BrokerId::random()),
            duration_months: 48,
            annual_mileage_km: 15_000,
            monthly_rate_cents: 39_900,
            status: OrderStatus::CreditCheckStarted,
            status_history: vec![StatusChange {
                status: OrderStatus::CreditCheckStarted,
                at: now,
            }],
            notes: None,
            created_at: now,
            updated_at: now,
        };
        let row = OrderRow::try_from(&order).expect("row");
        assert_eq!(row.duration_months, 48);
        assert_eq!(Order::try_from(row).expect("order"), order);
    }
}
