//! Bearer token providers

use crate::config::TOKEN_ENV;

/// Supplies the bearer token attached to each outgoing call
///
/// The value is opaque; it is looked up again for every request so a
/// provider may rotate it.
pub trait TokenProvider: Send + Sync {
    fn access_token(&self) -> Option<String>;
}

/// A fixed token, or none at all
#[derive(Debug, Clone, Default)]
pub struct StaticTokenProvider(Option<String>);

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    /// Send requests without an Authorization header
    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl TokenProvider for StaticTokenProvider {
    fn access_token(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Reads the token from an environment variable on every call
#[derive(Debug, Clone)]
pub struct EnvTokenProvider {
    var: String,
}

impl Default for EnvTokenProvider {
    fn default() -> Self {
        Self {
            var: TOKEN_ENV.to_string(),
        }
    }
}

impl EnvTokenProvider {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl TokenProvider for EnvTokenProvider {
    fn access_token(&self) -> Option<String> {
        std::env::var(&self.var).ok().filter(|t| !t.is_empty())
    }
}
