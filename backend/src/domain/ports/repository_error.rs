//! Error type shared by the document repositories.

use serde_json::json;

use crate::domain::Error;

use super::define_port_error;

define_port_error! {
    /// Errors raised by persistence adapters.
    pub enum RepositoryError {
        /// The store could not be reached.
        Connection { message: String } =>
            "repository connection failed: {message}",
        /// A query or mutation failed while executing.
        Query { message: String } =>
            "repository query failed: {message}",
        /// A unique constraint rejected the write.
        Duplicate { constraint: String } =>
            "duplicate value violates {constraint}",
    }
}

/// Map a repository failure for `resource` onto a domain error.
///
/// Duplicates on the user e-mail constraint carry the `email_taken` detail
/// code so the UI can show a specific message.
pub fn map_repository_error(resource: &str, error: RepositoryError) -> Error {
    match error {
        RepositoryError::Connection { message } => {
            Error::service_unavailable(format!("{resource} repository unavailable: {message}"))
        }
        RepositoryError::Query { message } => {
            Error::internal(format!("{resource} repository error: {message}"))
        }
        RepositoryError::Duplicate { constraint } if constraint.contains("email") => {
            Error::conflict("email address already in use")
                .with_details(json!({ "field": "email", "code": "email_taken" }))
        }
        RepositoryError::Duplicate { constraint } => {
            Error::conflict(format!("{resource} already exists ({constraint})"))
        }
    }
}
