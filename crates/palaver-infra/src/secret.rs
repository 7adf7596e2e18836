//! Environment variable credential source.
//!
//! Resolves the API credential from the process environment. `PALAVER_API_KEY`
//! takes priority over `OPENAI_API_KEY`. The value is wrapped in a
//! [`SecretString`] immediately and never logged.

use secrecy::SecretString;

/// Checked first.
pub const ENV_PALAVER_API_KEY: &str = "PALAVER_API_KEY";
/// Checked when `PALAVER_API_KEY` is unset.
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";

/// Read-only credential lookup over environment variables.
#[derive(Debug, Clone)]
pub struct EnvCredentialSource {
    keys: Vec<String>,
}

impl EnvCredentialSource {
    pub fn new() -> Self {
        Self::with_keys([ENV_PALAVER_API_KEY, ENV_OPENAI_API_KEY])
    }

    /// Check the given variables in order.
    pub fn with_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// The first non-blank credential, and the variable it came from.
    pub fn resolve(&self) -> Option<(SecretString, &str)> {
        self.keys.iter().find_map(|key| {
            // Unset, blank, and non-Unicode values all count as absent.
            let value = std::env::var(key).ok()?;
            let value = value.trim();
            if value.is_empty() {
                return None;
            }
            tracing::debug!(source = %key, "Resolved API credential");
            Some((SecretString::from(value.to_string()), key.as_str()))
        })
    }

    pub fn credential(&self) -> Option<SecretString> {
        self.resolve().map(|(secret, _)| secret)
    }
}

impl Default for EnvCredentialSource {
    fn default() -> Self {
        Self::new()
    }
}
