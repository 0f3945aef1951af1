//! Employer companies and broker records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    BrokerId, CompanyId, EmailAddress, NAME_MAX, UserId, UserValidationError, validate_name,
    validate_optional_text, validate_phone,
};

/// Maximum length of a street line.
pub const STREET_MAX: usize = 120;
/// Maximum length of a postal code.
pub const POSTAL_CODE_MAX: usize = 16;

/// Employer whose staff lease company or salary-conversion cars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub street: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub contact_email: Option<EmailAddress>,
    pub created_at: DateTime<Utc>,
}

/// Validated company input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyDraft {
    pub name: String,
    pub street: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub contact_email: Option<EmailAddress>,
}

impl CompanyDraft {
    /// Build a draft from raw form values.
    pub fn new(
        name: &str,
        street: Option<String>,
        postal_code: Option<String>,
        city: Option<String>,
        contact_email: Option<&str>,
    ) -> Result<Self, UserValidationError> {
        let contact_email = contact_email
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(EmailAddress::new)
            .transpose()?;
        Ok(Self {
            name: validate_name(name, "name")?,
            street: validate_optional_text(street, "street", STREET_MAX)?,
            postal_code: validate_optional_text(postal_code, "postalCode", POSTAL_CODE_MAX)?,
            city: validate_optional_text(city, "city", NAME_MAX)?,
            contact_email,
        })
    }
}

/// Leasing broker serving its own customers.
///
/// `user_id` links the broker record to the portal account created when the
/// contact accepts their invitation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Broker {
    pub id: BrokerId,
    pub company_name: String,
    pub contact_name: String,
    pub email: EmailAddress,
    pub phone: Option<String>,
    pub user_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

/// Validated broker input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerDraft {
    pub company_name: String,
    pub contact_name: String,
    pub email: EmailAddress,
    pub phone: Option<String>,
}

impl BrokerDraft {
    pub fn new(
        company_name: &str,
        contact_name: &str,
        email: &str,
        phone: Option<String>,
    ) -> Result<Self, UserValidationError> {
        Ok(Self {
            company_name: validate_name(company_name, "companyName")?,
            contact_name: validate_name(contact_name, "contactName")?,
            email: EmailAddress::new(email)?,
            phone: validate_phone(phone)?,
        })
    }
}
