//! Strongly typed UUID identifiers for portal documents.
//!
//! Each collection gets its own newtype so a `VehicleId` can never be passed
//! where an `OrderId` is expected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Returned when an identifier string is not a UUID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} must be a valid UUID")]
pub struct InvalidIdError {
    /// Identifier kind, for example `vehicle id`.
    pub kind: &'static str,
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident => $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a new random identifier.
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Parse an identifier from its string form.
            pub fn parse(raw: &str) -> Result<Self, InvalidIdError> {
                Uuid::parse_str(raw.trim())
                    .map(Self)
                    .map_err(|_| InvalidIdError { kind: $kind })
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = InvalidIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }
    };
}

define_id!(
    /// Portal account identifier.
    UserId => "user id"
);
define_id!(
    /// Employer company identifier.
    CompanyId => "company id"
);
define_id!(
    /// Broker record identifier.
    BrokerId => "broker id"
);
define_id!(
    /// Vehicle brand identifier.
    BrandId => "brand id"
);
define_id!(
    /// Vehicle identifier.
    VehicleId => "vehicle id"
);
define_id!(
    /// Leasing order identifier.
    OrderId => "order id"
);
define_id!(
    /// Support ticket identifier.
    TicketId => "ticket id"
);
define_id!(
    /// FAQ entry identifier.
    FaqId => "faq id"
);
define_id!(
    /// News post identifier.
    NewsPostId => "news post id"
);
define_id!(
    /// Employee or customer invitation identifier.
    InviteId => "invite id"
);

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn parse_accepts_padded_uuid() {
        let id = VehicleId::parse(" 3fa85f64-5717-4562-b3fc-2c963f66afa6 ").expect("valid id");
        assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    }

    #[rstest]
    #[case("")]
    #[case("not-a-uuid")]
    fn parse_rejects_garbage(#[case] raw: &str) {
        let err = OrderId::parse(raw).expect_err("invalid id");
        assert_eq!(err.to_string(), "order id must be a valid UUID");
    }

    #[rstest]
    fn serde_is_transparent() {
        let id = UserId::random();
        let value = serde_json::to_value(id).expect("serialise");
        assert_eq!(value, serde_json::json!(id.to_string()));
    }
}
