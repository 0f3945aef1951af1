//! Backend library for the fleet leasing portal.
//!
//! The crate follows a hexagonal layout: [`domain`] holds the business rules
//! and port traits, [`inbound`] adapts HTTP requests onto domain services and
//! [`outbound`] implements the ports against PostgreSQL, the filesystem and
//! the mail provider.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
