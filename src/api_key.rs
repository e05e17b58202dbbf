use std::fmt;

use snafu::ensure;

use crate::error::{InvalidApiKeySnafu, Result};

const PRODUCTION_BASE_URL: &str = "https://api.sendivent.com";
const SANDBOX_BASE_URL: &str = "https://api-sandbox.sendivent.com";

const TEST_PREFIX: &str = "test_";
const LIVE_PREFIX: &str = "live_";

/// The backend environment an API key is bound to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Environment {
    Sandbox,
    Production,
}

impl Environment {
    /// Base URL of the environment's API endpoint.
    #[must_use]
    pub const fn base_url(self) -> &'static str {
        match self {
            Self::Sandbox => SANDBOX_BASE_URL,
            Self::Production => PRODUCTION_BASE_URL,
        }
    }
}

/// A validated Sendivent API key.
///
/// The prefix (`test_` or `live_`) selects the target environment and is
/// fixed at construction. The key itself is opaque and never mutated.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    /// Validates and wraps an API key string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidApiKey`](crate::Error::InvalidApiKey) if the
    /// key does not start with `test_` or `live_`.
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        ensure!(
            key.starts_with(TEST_PREFIX) || key.starts_with(LIVE_PREFIX),
            InvalidApiKeySnafu
        );
        Ok(Self(key))
    }

    /// The environment this key targets, derived from its prefix.
    #[must_use]
    pub fn environment(&self) -> Environment {
        if self.0.starts_with(LIVE_PREFIX) {
            Environment::Production
        } else {
            Environment::Sandbox
        }
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}

// Only the environment prefix is shown; the key material stays out of logs.
impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.0.starts_with(LIVE_PREFIX) { LIVE_PREFIX } else { TEST_PREFIX };
        write!(f, "ApiKey({prefix}…)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_prefix() {
        assert!(ApiKey::new("sk_abcdef").is_err());
        assert!(ApiKey::new("").is_err());
        assert!(ApiKey::new("livekey").is_err());
    }

    #[test]
    fn test_prefix_targets_sandbox() {
        let key = ApiKey::new("test_abc123").unwrap();
        assert_eq!(key.environment(), Environment::Sandbox);
        assert_eq!(key.environment().base_url(), "https://api-sandbox.sendivent.com");
    }

    #[test]
    fn live_prefix_targets_production() {
        let key = ApiKey::new("live_abc123").unwrap();
        assert_eq!(key.environment(), Environment::Production);
        assert_eq!(key.environment().base_url(), "https://api.sendivent.com");
    }

    #[test]
    fn debug_redacts_key_material() {
        let key = ApiKey::new("live_secret_material").unwrap();
        let rendered = format!("{key:?}");
        assert!(!rendered.contains("secret_material"));
    }
}
