//! Absolute links into the portal UI, embedded in e-mails.

use url::Url;

use super::OrderId;

/// Builds UI links relative to the configured public base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalLinks {
    base: Url,
}

impl PortalLinks {
    /// Wrap a base URL. A missing trailing slash is added so relative joins
    /// keep any path prefix.
    pub fn new(mut base: Url) -> Self {
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Self { base }
    }

    fn join(&self, path: &str, token: Option<&str>) -> String {
        let mut url = self.base.clone();
        url.set_path(&format!("{}{path}", self.base.path()));
        if let Some(token) = token {
            url.query_pairs_mut().clear().append_pair("token", token);
        }
        url.to_string()
    }

    /// Registration page for an invitation token.
    pub fn registration(&self, token: &str) -> String {
        self.join("register", Some(token))
    }

    /// Password reset page for a reset token.
    pub fn password_reset(&self, token: &str) -> String {
        self.join("password-reset", Some(token))
    }

    pub fn login(&self) -> String {
        self.join("login", None)
    }

    pub fn order(&self, id: &OrderId) -> String {
        self.join(&format!("orders/{id}"), None)
    }
}
