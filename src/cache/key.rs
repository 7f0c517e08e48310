//! Request fingerprints.

use crate::types::Message;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Cache key summarizing a system prompt plus message sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex chars, for log fields.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Builds fingerprints from canonical JSON of the logical request.
#[derive(Debug, Clone, Default)]
pub struct FingerprintGenerator {
    salt: Option<String>,
}

impl FingerprintGenerator {
    pub fn new() -> Self {
        Self { salt: None }
    }

    /// Mix an extra value into every key, so otherwise identical requests
    /// never collide.
    pub fn with_salt(mut self, salt: impl Into<String>) -> Self {
        self.salt = Some(salt.into());
        self
    }

    pub fn generate(&self, system_prompt: &str, messages: &[Message]) -> Fingerprint {
        let mut parts: BTreeMap<&str, String> = BTreeMap::new();
        parts.insert("system_prompt", system_prompt.to_string());
        parts.insert(
            "messages",
            serde_json::to_string(messages).unwrap_or_default(),
        );
        if let Some(ref s) = self.salt {
            parts.insert("salt", s.clone());
        }
        let canonical = serde_json::to_string(&parts).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        let hash: String = hasher
            .finalize()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect();
        Fingerprint(hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_requests_share_a_fingerprint() {
        let gen = FingerprintGenerator::new();
        let msgs = vec![Message::user("sort a vec")];
        assert_eq!(gen.generate("sys", &msgs), gen.generate("sys", &msgs));
        assert_eq!(gen.generate("sys", &msgs).as_str().len(), 64);
    }

    #[test]
    fn system_prompt_and_role_change_the_fingerprint() {
        let gen = FingerprintGenerator::new();
        let user = vec![Message::user("hi")];
        let assistant = vec![Message::assistant("hi")];
        assert_ne!(gen.generate("a", &user), gen.generate("b", &user));
        assert_ne!(gen.generate("a", &user), gen.generate("a", &assistant));
    }

    #[test]
    fn salt_separates_otherwise_equal_requests() {
        let msgs = vec![Message::user("who are you")];
        let a = FingerprintGenerator::new().with_salt("1").generate("", &msgs);
        let b = FingerprintGenerator::new().with_salt("2").generate("", &msgs);
        assert_ne!(a, b);
        assert_eq!(a.short().len(), 12);
    }
}
