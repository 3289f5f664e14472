//! API keys kept out of logs.
//!
//! Uses the `secrecy` crate so the classification backend key never shows up
//! in debug output, tracing fields or error messages.

use secrecy::{ExposeSecret, SecretBox};
use std::fmt;

/// A secret string that won't be logged or displayed.
pub struct SecretString(SecretBox<str>);

impl SecretString {
    /// Create a new secret string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretBox::new(Box::from(value.into().as_str())))
    }

    /// Read a secret from an environment variable.
    ///
    /// Unset and blank variables are both treated as absent.
    pub fn from_env(name: &str) -> Option<Self> {
        std::env::var(name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(Self::new)
    }

    /// Expose the secret value. Only call this when building a request.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Clone for SecretString {
    fn clone(&self) -> Self {
        Self::new(self.expose())
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_redacted() {
        let secret = SecretString::new("sk-proj-abc123");
        assert_eq!(format!("{:?}", secret), "[REDACTED]");
        assert_eq!(format!("{}", secret), "[REDACTED]");
        assert_eq!(secret.expose(), "sk-proj-abc123");
    }

    #[test]
    fn test_clone_keeps_value() {
        let secret = SecretString::from("sk-proj-abc123");
        assert_eq!(secret.clone().expose(), "sk-proj-abc123");
    }

    #[test]
    fn test_from_env_ignores_blank() {
        std::env::set_var("PROPOSALS_TEST_BLANK_SECRET", "   ");
        assert!(SecretString::from_env("PROPOSALS_TEST_BLANK_SECRET").is_none());
        assert!(SecretString::from_env("PROPOSALS_TEST_UNSET_SECRET").is_none());

        std::env::set_var("PROPOSALS_TEST_SET_SECRET", " sk-live ");
        let secret = SecretString::from_env("PROPOSALS_TEST_SET_SECRET").unwrap();
        assert_eq!(secret.expose(), "sk-live");
    }
}
