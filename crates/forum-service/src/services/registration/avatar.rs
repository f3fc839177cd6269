//! Avatar URL derivation

use forum_common::AvatarConfig;
use sha2::{Digest, Sha256};

/// Gravatar URL for an email address. Accounts without an email get the default image.
pub fn gravatar_url(email: Option<&str>, config: &AvatarConfig) -> String {
    let normalized = email.unwrap_or_default().trim().to_lowercase();
    let hash = Sha256::digest(normalized.as_bytes());
    format!(
        "https://www.gravatar.com/avatar/{hash:x}?s={}&d={}&r={}",
        config.size, config.default_image, config.rating
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_is_deterministic_and_case_insensitive() {
        let config = AvatarConfig::default();
        let a = gravatar_url(Some("Alice@Example.com "), &config);
        let b = gravatar_url(Some("alice@example.com"), &config);
        assert_eq!(a, b);
        assert!(a.starts_with("https://www.gravatar.com/avatar/"));
        assert!(a.ends_with("?s=128&d=identicon&r=pg"));
    }

    #[test]
    fn test_known_digest() {
        // SHA-256 of the empty string
        let url = gravatar_url(None, &AvatarConfig::default());
        assert!(url.contains("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"));
    }
}
