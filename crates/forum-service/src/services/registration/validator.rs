//! Field syntax checks for a registration candidate

use std::sync::OnceLock;

use forum_common::{PasswordPolicy, RegistrationConfig, UsernamePolicy};
use forum_core::{slugify, CandidateInput, DomainError};
use regex::Regex;
use validator::ValidateEmail;

/// Candidate fields after normalisation and syntax checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedInput {
    /// Trimmed username
    pub username: String,
    pub userslug: String,
    /// Trimmed, HTML-escaped email; `None` when absent or blank
    pub email: Option<String>,
    /// `None` when absent or empty
    pub password: Option<String>,
}

/// Stateless field validator
#[derive(Debug, Clone, Default)]
pub struct Validator {
    username: UsernamePolicy,
    password: PasswordPolicy,
}

impl Validator {
    pub fn new(username: UsernamePolicy, password: PasswordPolicy) -> Self {
        Self { username, password }
    }

    pub fn from_config(config: &RegistrationConfig) -> Self {
        Self::new(config.username, config.password)
    }

    /// Check every typed field of `candidate`.
    ///
    /// Errors are reported in field order: username, email, password.
    pub fn validate(&self, candidate: &CandidateInput) -> Result<ValidatedInput, DomainError> {
        let (username, userslug) = self.check_username(&candidate.username)?;
        let email = check_email(candidate.email.as_deref())?;
        let password = self.check_password(candidate.password.as_deref())?;

        Ok(ValidatedInput {
            username,
            userslug,
            email,
            password,
        })
    }

    /// Returns the trimmed username and its slug
    pub fn check_username(&self, raw: &str) -> Result<(String, String), DomainError> {
        let username = raw.trim();
        if username.is_empty() {
            return Err(DomainError::InvalidUsername("username is required".into()));
        }

        let length = username.chars().count();
        if length < self.username.min_length || length > self.username.max_length {
            return Err(DomainError::InvalidUsername(format!(
                "username must be between {} and {} characters",
                self.username.min_length, self.username.max_length
            )));
        }

        if !username_regex().is_match(username) {
            return Err(DomainError::InvalidUsername(
                "username contains invalid characters".into(),
            ));
        }

        let userslug = slugify(username);
        if userslug.is_empty() {
            return Err(DomainError::InvalidUsername(
                "username must contain at least one letter or digit".into(),
            ));
        }

        Ok((username.to_string(), userslug))
    }

    fn check_password(&self, raw: Option<&str>) -> Result<Option<String>, DomainError> {
        match raw.filter(|p| !p.is_empty()) {
            Some(password) => {
                self.password
                    .check(password)
                    .map_err(DomainError::InvalidPassword)?;
                Ok(Some(password.to_string()))
            }
            None => Ok(None),
        }
    }
}

fn username_regex() -> &'static Regex {
    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    USERNAME_REGEX.get_or_init(|| {
        Regex::new(r#"^['"\s\-.*0-9A-Za-z_\x{00BF}-\x{1FFF}\x{2C00}-\x{D7FF}]+$"#)
            .expect("Failed to compile username regex")
    })
}

/// Trim and escape an email address; blank input counts as absent
pub fn normalize_email(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(escape_html(trimmed))
    }
}

fn check_email(raw: Option<&str>) -> Result<Option<String>, DomainError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let trimmed = raw.trim().to_string();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if !trimmed.validate_email() {
        return Err(DomainError::InvalidEmail);
    }
    Ok(normalize_email(&trimmed))
}

/// Escape the characters that are significant in HTML
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn validator() -> Validator {
        Validator::default()
    }

    #[test]
    fn test_valid_candidate() {
        let candidate = CandidateInput::new("  Alice123 ")
            .with_email(" alice@example.com ")
            .with_password("Password1");
        let validated = validator().validate(&candidate).unwrap();

        assert_eq!(validated.username, "Alice123");
        assert_eq!(validated.userslug, "alice123");
        assert_eq!(validated.email.as_deref(), Some("alice@example.com"));
        assert_eq!(validated.password.as_deref(), Some("Password1"));
    }

    #[test]
    fn test_optional_fields_absent() {
        let validated = validator().validate(&CandidateInput::new("bob")).unwrap();
        assert_eq!(validated.email, None);
        assert_eq!(validated.password, None);

        let blank = CandidateInput::new("bob").with_email("   ").with_password("");
        let validated = validator().validate(&blank).unwrap();
        assert_eq!(validated.email, None);
        assert_eq!(validated.password, None);
    }

    #[test]
    fn test_username_rules() {
        let v = validator();
        assert!(matches!(v.check_username(""), Err(DomainError::InvalidUsername(_))));
        assert!(matches!(v.check_username("   "), Err(DomainError::InvalidUsername(_))));
        assert!(matches!(v.check_username("a"), Err(DomainError::InvalidUsername(_))));
        assert!(matches!(
            v.check_username("abcdefghijklmnopq"),
            Err(DomainError::InvalidUsername(_))
        ));
        assert!(matches!(v.check_username("bad<name>"), Err(DomainError::InvalidUsername(_))));
        assert!(matches!(v.check_username("a@b"), Err(DomainError::InvalidUsername(_))));

        assert_eq!(
            v.check_username("John Smith").unwrap(),
            ("John Smith".to_string(), "john-smith".to_string())
        );
        assert_eq!(v.check_username("O'Brien").unwrap().0, "O'Brien");
        assert_eq!(v.check_username("Élodie").unwrap().1, "élodie");
    }

    #[test]
    fn test_username_with_empty_slug() {
        assert!(matches!(
            validator().check_username("--"),
            Err(DomainError::InvalidUsername(_))
        ));
        assert!(matches!(
            validator().check_username("'\"*"),
            Err(DomainError::InvalidUsername(_))
        ));
    }

    #[test]
    fn test_invalid_email() {
        let candidate = CandidateInput::new("carol").with_email("not-an-email");
        assert!(matches!(
            validator().validate(&candidate),
            Err(DomainError::InvalidEmail)
        ));
    }

    #[test]
    fn test_invalid_password() {
        let candidate = CandidateInput::new("carol").with_password("short");
        assert!(matches!(
            validator().validate(&candidate),
            Err(DomainError::InvalidPassword(_))
        ));
    }

    #[test]
    fn test_username_error_reported_first() {
        let candidate = CandidateInput::new("")
            .with_email("nope")
            .with_password("x");
        assert!(matches!(
            validator().validate(&candidate),
            Err(DomainError::InvalidUsername(_))
        ));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a&b<c>\"d'/"), "a&amp;b&lt;c&gt;&quot;d&#x27;&#x2F;");
        assert_eq!(escape_html("plain@example.com"), "plain@example.com");
    }

    #[test]
    fn test_validation_is_idempotent() {
        let candidate = CandidateInput::new("Dave").with_email("dave@example.com");
        let v = validator();
        assert_eq!(v.validate(&candidate).unwrap(), v.validate(&candidate).unwrap());
    }

    proptest! {
        #[test]
        fn prop_accepted_usernames_have_nonempty_slugs(name in "[A-Za-z0-9 _.-]{2,16}") {
            if let Ok((username, slug)) = validator().check_username(&name) {
                prop_assert!(!slug.is_empty());
                prop_assert_eq!(username.trim(), username.as_str());
                prop_assert_eq!(slugify(&username), slug);
            }
        }

        #[test]
        fn prop_normalized_email_is_trimmed(email in "[ ]{0,3}[a-z]{1,8}@[a-z]{1,8}\\.com[ ]{0,3}") {
            let normalized = normalize_email(&email).unwrap();
            prop_assert_eq!(normalized.trim(), normalized.as_str());
            prop_assert!(!normalized.is_empty());
        }
    }
}
