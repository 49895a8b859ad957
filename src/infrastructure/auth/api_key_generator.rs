//! API key generator service

use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::domain::credential::ApiKeyHash;

/// API key generator service
#[derive(Clone)]
pub struct ApiKeyGenerator {
    /// Length of the random portion in bytes (excluding prefix)
    key_length: usize,
    /// Prefix for API keys (e.g., "nl_")
    prefix: String,
}

impl ApiKeyGenerator {
    pub fn new(prefix: String, key_length: usize) -> Self {
        Self { prefix, key_length }
    }

    /// Generate a new API key and its hash.
    /// Returns (plaintext_key, key_hash); the plaintext is shown once and
    /// never stored.
    pub fn generate(&self) -> (String, ApiKeyHash) {
        let mut random_bytes = vec![0u8; self.key_length];
        rand::rng().fill_bytes(&mut random_bytes);

        let plaintext_key = format!("{}{}", self.prefix, hex::encode(random_bytes));
        let key_hash = self.hash_key(&plaintext_key);

        (plaintext_key, key_hash)
    }

    /// Hash an existing API key (for validation)
    pub fn hash_key(&self, key: &str) -> ApiKeyHash {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        ApiKeyHash::from(hex::encode(hasher.finalize()))
    }

    /// Mask an API key for display and logs
    pub fn mask_key(&self, key: &str) -> String {
        if key.len() <= 12 {
            return "*".repeat(key.len());
        }

        if key.starts_with(&self.prefix) {
            let rest = &key[self.prefix.len()..];
            if rest.len() <= 8 {
                format!("{}{}", self.prefix, "*".repeat(rest.len()))
            } else {
                format!(
                    "{}{}...{}",
                    self.prefix,
                    &rest[..4],
                    &rest[rest.len() - 4..]
                )
            }
        } else {
            format!("{}...{}", &key[..4], &key[key.len() - 4..])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> ApiKeyGenerator {
        ApiKeyGenerator::new("nl_".to_string(), 32)
    }

    #[test]
    fn test_api_key_generation() {
        let generator = generator();
        let (key1, hash1) = generator.generate();
        let (key2, hash2) = generator.generate();

        assert_ne!(key1, key2);
        assert_ne!(hash1.as_str(), hash2.as_str());
        assert!(key1.starts_with("nl_"));
        // 32 random bytes hex-encoded
        assert_eq!(key1.len(), "nl_".len() + 64);
    }

    #[test]
    fn test_hash_is_deterministic() {
        let generator = generator();
        let (key, hash) = generator.generate();

        let computed = generator.hash_key(&key);
        assert_eq!(hash.as_str(), computed.as_str());
    }

    #[test]
    fn test_api_key_masking() {
        let generator = generator();
        let (key, _) = generator.generate();

        let masked = generator.mask_key(&key);
        assert!(masked.contains("..."));
        assert!(masked.starts_with("nl_"));
        assert!(masked.len() < key.len());
    }

    #[test]
    fn test_short_key_is_fully_masked() {
        let generator = generator();
        assert_eq!(generator.mask_key("short"), "*****");
    }
}
