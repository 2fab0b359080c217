//! Credential wrappers for the Akeneo and Unchained passwords
//!
//! Secrets are held in `secrecy::Secret<SecretValue>`: zeroed on drop,
//! redacted in `Debug`, and only readable through `expose_secret()`.
//!
//! ```rust
//! use pimbridge::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let client_secret = secret_string("s3cr3t".to_string());
//! assert_eq!(client_secret.expose_secret().as_ref(), "s3cr3t");
//! assert!(!format!("{client_secret:?}").contains("s3cr3t"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// Plain credential text; only reachable through `ExposeSecret`
#[derive(Clone, Debug, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
impl SerializableSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SecretValue {
    /// Check if the secret value is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the plain value, for building request bodies and headers
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Serialize for SecretValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// A credential loaded from configuration
pub type SecretString = Secret<SecretValue>;

/// Wrap a plain string as a [`SecretString`]
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AkeneoConfig;
    use secrecy::ExposeSecret;

    #[test]
    fn test_secret_string_creation() {
        let secret = secret_string("client-secret".to_string());
        assert_eq!(secret.expose_secret().as_str(), "client-secret");
        assert!(!secret.expose_secret().is_empty());
        assert!(secret_string(String::new()).expose_secret().is_empty());
    }

    #[test]
    fn test_secret_debug_redacted() {
        let debug_output = format!("{:?}", secret_string("sensitive-data".to_string()));
        assert!(!debug_output.contains("sensitive-data"));
    }

    #[test]
    fn test_secrets_deserialize_from_toml() {
        let config: AkeneoConfig = toml::from_str(
            r#"
endpoint = "https://pim.example.com"
username = "sync"
password = "pim-pass"
client_id = "client"
client_secret = "pim-secret"
"#,
        )
        .unwrap();

        assert_eq!(config.password.expose_secret().as_str(), "pim-pass");
        assert_eq!(config.client_secret.expose_secret().as_str(), "pim-secret");
        assert!(!format!("{config:?}").contains("pim-secret"));
    }
}
