//! API credentials and where they come from.
//!
//! The engine asks a [`CredentialSource`] once per run, before any request
//! is built. A source that yields nothing stops the run with
//! `MissingCredentials`.

use std::fmt;

use reqwest::header::HeaderValue;

/// Environment variable holding the application id.
pub const APP_ID_VAR: &str = "TRAVELTIME_APP_ID";
/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "TRAVELTIME_API_KEY";

/// An application id and API key, stored as sensitive header values.
#[derive(Clone)]
pub struct Credentials {
    app_id: HeaderValue,
    api_key: HeaderValue,
}

impl Credentials {
    /// Returns `None` if either part is empty or not a valid header value.
    pub fn new(app_id: &str, api_key: &str) -> Option<Self> {
        let app_id = app_id.trim();
        let api_key = api_key.trim();
        if app_id.is_empty() || api_key.is_empty() {
            return None;
        }

        let mut app_id = HeaderValue::from_str(app_id).ok()?;
        let mut api_key = HeaderValue::from_str(api_key).ok()?;
        app_id.set_sensitive(true);
        api_key.set_sensitive(true);
        Some(Self { app_id, api_key })
    }

    pub fn app_id(&self) -> &HeaderValue {
        &self.app_id
    }

    pub fn api_key(&self) -> &HeaderValue {
        &self.api_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("app_id", &"*hidden*")
            .field("api_key", &"*hidden*")
            .finish()
    }
}

/// Something that can supply credentials at the start of a run.
pub trait CredentialSource: Send + Sync {
    fn credentials(&self) -> Option<Credentials>;
}

impl CredentialSource for Credentials {
    fn credentials(&self) -> Option<Credentials> {
        Some(self.clone())
    }
}

impl CredentialSource for Option<Credentials> {
    fn credentials(&self) -> Option<Credentials> {
        self.clone()
    }
}

/// Reads `TRAVELTIME_APP_ID` and `TRAVELTIME_API_KEY` on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentials;

impl CredentialSource for EnvCredentials {
    fn credentials(&self) -> Option<Credentials> {
        let app_id = std::env::var(APP_ID_VAR).ok()?;
        let api_key = std::env::var(API_KEY_VAR).ok()?;
        Credentials::new(&app_id, &api_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_parts_are_absent() {
        assert!(Credentials::new("", "key").is_none());
        assert!(Credentials::new("app", "  ").is_none());
        assert!(Credentials::new("app", "key").is_some());
    }

    #[test]
    fn invalid_header_value_is_absent() {
        assert!(Credentials::new("app\n", "key\u{7f}").is_none());
    }

    #[test]
    fn debug_hides_values() {
        let creds = Credentials::new("my-app", "my-secret").unwrap();
        let shown = format!("{creds:?}");
        assert!(!shown.contains("my-app"));
        assert!(!shown.contains("my-secret"));
    }

    #[test]
    fn values_are_marked_sensitive() {
        let creds = Credentials::new("app", "key").unwrap();
        assert!(creds.app_id().is_sensitive());
        assert!(creds.api_key().is_sensitive());
    }

    #[test]
    fn option_source() {
        let none: Option<Credentials> = None;
        assert!(none.credentials().is_none());
        let some = Credentials::new("a", "b");
        assert!(some.credentials().is_some());
    }
}
