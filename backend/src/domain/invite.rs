//! Invitations and the verification records backing e-mailed links.
//!
//! A verification stores only the SHA-256 digest of its token. The raw token
//! exists in memory just long enough to be placed into the e-mail link.

use std::fmt;

use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;
use zeroize::Zeroizing;

use super::{BrokerId, CompanyId, EmailAddress, InviteId, PortalType, UserId};

/// Raw token length in bytes before hex encoding.
pub const TOKEN_BYTES: usize = 32;

/// Pending invitation of an employee into a company portal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeInvite {
    pub id: InviteId,
    pub email: EmailAddress,
    pub company_id: CompanyId,
    pub portal_type: PortalType,
    pub invited_by: UserId,
    pub created_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
}

/// Pending invitation of a customer by a broker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInvite {
    pub id: InviteId,
    pub email: EmailAddress,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub broker_id: BrokerId,
    pub invited_by: UserId,
    pub created_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
}

/// Returned when a stored verification kind cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown verification kind: {value}")]
pub struct UnknownVerificationKind {
    pub value: String,
}

/// What a verification link unlocks, with the record it refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "referenceId", rename_all = "snake_case")]
pub enum VerificationKind {
    EmployeeInvite(InviteId),
    CustomerInvite(InviteId),
    BrokerInvite(BrokerId),
    PasswordReset(UserId),
}

impl VerificationKind {
    /// Storage discriminator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmployeeInvite(_) => "employee_invite",
            Self::CustomerInvite(_) => "customer_invite",
            Self::BrokerInvite(_) => "broker_invite",
            Self::PasswordReset(_) => "password_reset",
        }
    }

    /// UUID of the referenced invite, broker or user.
    pub fn reference(&self) -> Uuid {
        match self {
            Self::EmployeeInvite(id) | Self::CustomerInvite(id) => *id.as_uuid(),
            Self::BrokerInvite(id) => *id.as_uuid(),
            Self::PasswordReset(id) => *id.as_uuid(),
        }
    }

    /// Rebuild a kind from its storage columns.
    pub fn from_parts(kind: &str, reference: Uuid) -> Result<Self, UnknownVerificationKind> {
        match kind {
            "employee_invite" => Ok(Self::EmployeeInvite(InviteId::from_uuid(reference))),
            "customer_invite" => Ok(Self::CustomerInvite(InviteId::from_uuid(reference))),
            "broker_invite" => Ok(Self::BrokerInvite(BrokerId::from_uuid(reference))),
            "password_reset" => Ok(Self::PasswordReset(UserId::from_uuid(reference))),
            other => Err(UnknownVerificationKind {
                value: other.to_owned(),
            }),
        }
    }

    /// Whether the link leads to account registration.
    pub fn is_invitation(&self) -> bool {
        !matches!(self, Self::PasswordReset(_))
    }
}

/// Why a verification can no longer be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum VerificationStateError {
    #[error("verification link has expired")]
    Expired,
    #[error("verification link was already used")]
    Consumed,
}

impl VerificationStateError {
    pub fn code(self) -> &'static str {
        match self {
            Self::Expired => "token_expired",
            Self::Consumed => "token_consumed",
        }
    }
}

/// Short-lived record validating an e-mailed link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub token_hash: String,
    pub email: EmailAddress,
    pub kind: VerificationKind,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
}

impl Verification {
    /// Fail unless the verification is unused and unexpired at `now`.
    pub fn ensure_usable(&self, now: DateTime<Utc>) -> Result<(), VerificationStateError> {
        if self.consumed_at.is_some() {
            return Err(VerificationStateError::Consumed);
        }
        if now >= self.expires_at {
            return Err(VerificationStateError::Expired);
        }
        Ok(())
    }
}

/// Freshly generated verification token.
///
/// # Examples
/// ```
/// use fleet_backend::domain::{hash_token, VerificationToken};
///
/// let token = VerificationToken::generate();
/// assert_eq!(token.expose().len(), 64);
/// assert_eq!(token.digest(), hash_token(token.expose()));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct VerificationToken(Zeroizing<String>);

impl VerificationToken {
    /// Generate [`TOKEN_BYTES`] random bytes, hex encoded.
    pub fn generate() -> Self {
        let mut bytes = Zeroizing::new([0_u8; TOKEN_BYTES]);
        rand::thread_rng().fill_bytes(&mut bytes[..]);
        Self(Zeroizing::new(hex::encode(&bytes[..])))
    }

    /// Raw token for embedding into a link.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// Digest stored alongside the verification.
    pub fn digest(&self) -> String {
        hash_token(self.expose())
    }
}

impl fmt::Debug for VerificationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VerificationToken(<redacted>)")
    }
}

/// Hex-encoded SHA-256 digest of a raw token.
pub fn hash_token(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.trim().as_bytes()))
}
