//! API key sanity checks.
//!
//! A key that fails these rules is treated as absent: the remote call is
//! skipped and the stage falls back to its local path.

use serde::{Deserialize, Serialize};

/// Markers of keys copied from sample configs.
const PLACEHOLDER_MARKERS: &[&str] = &["your_", "your-", "changeme", "replace", "placeholder", "xxxx"];

/// Shape a usable API key must have.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRules {
    /// Required prefix; empty disables the check.
    pub prefix: String,
    /// Minimum length after trimming.
    pub min_len: usize,
}

impl CredentialRules {
    pub fn new(prefix: impl Into<String>, min_len: usize) -> Self {
        Self {
            prefix: prefix.into(),
            min_len,
        }
    }

    /// OpenAI secret keys (`sk-...`).
    pub fn openai() -> Self {
        Self::new("sk-", 20)
    }

    /// Google Cloud API keys (`AIza...`).
    pub fn google_cloud() -> Self {
        Self::new("AIza", 30)
    }

    /// Whether `key` looks like a real credential.
    pub fn accepts(&self, key: &str) -> bool {
        let key = key.trim();
        if key.is_empty() || key.len() < self.min_len {
            return false;
        }

        let lower = key.to_ascii_lowercase();
        if PLACEHOLDER_MARKERS.iter().any(|m| lower.contains(m)) {
            return false;
        }

        key.starts_with(&self.prefix)
    }

    /// `accepts` for an optional key.
    pub fn accepts_opt(&self, key: Option<&str>) -> bool {
        key.is_some_and(|k| self.accepts(k))
    }
}

impl Default for CredentialRules {
    fn default() -> Self {
        Self::new("", 1)
    }
}

/// Read a key from the environment, ignoring blank values.
pub fn key_from_env(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_rules() {
        let rules = CredentialRules::openai();
        assert!(rules.accepts("sk-proj-abcdefghijklmnopqrstu"));
        assert!(!rules.accepts(""));
        assert!(!rules.accepts("sk-short"));
        assert!(!rules.accepts("pk-abcdefghijklmnopqrstuvwxyz"));
        assert!(!rules.accepts("YOUR_OPENAI_API_KEY_GOES_HERE"));
        assert!(!rules.accepts("sk-changeme-changeme-changeme"));
    }

    #[test]
    fn test_google_rules() {
        let rules = CredentialRules::google_cloud();
        assert!(rules.accepts("AIzaSyA1234567890abcdefghijklmnopq"));
        assert!(!rules.accepts("YOUR_GOOGLE_CLOUD_API_KEY"));
    }

    #[test]
    fn test_optional_key() {
        let rules = CredentialRules::default();
        assert!(!rules.accepts_opt(None));
        assert!(rules.accepts_opt(Some("k")));
        assert!(!rules.accepts_opt(Some("   ")));
    }
}
