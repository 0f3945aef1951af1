//! Outbound adapters implementing the domain ports.
//!
//! - **persistence**: PostgreSQL repositories using Diesel
//! - **memory**: in-process repositories, storage and a recording mailer
//! - **storage**: uploads in a local directory capability
//! - **mail**: Brevo transactional e-mail and a logging fallback
//! - **security**: Argon2 password hashing
//!
//! Adapters translate between domain types and infrastructure
//! representations and hold no business rules.

pub mod mail;
pub mod memory;
pub mod persistence;
pub mod security;
pub mod storage;
