//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file when present).

use std::env;
use std::str::FromStr;

use forum_core::{Uid, BOOTSTRAP_UID};
use serde::Deserialize;

use crate::auth::PasswordPolicy;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub store: StoreConfig,
    pub redis: RedisConfig,
    pub registration: RegistrationConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" => Ok(Self::Development),
            other => Err(format!("unknown environment '{other}'")),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Which key-value backend holds accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Redis,
    /// Process-local store; data is lost on restart
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown store backend '{other}'")),
        }
    }
}

/// Store selection
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    #[serde(default = "default_redis_max_connections")]
    pub max_connections: u32,
}

/// Username rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct UsernamePolicy {
    pub min_length: usize,
    pub max_length: usize,
}

impl Default for UsernamePolicy {
    fn default() -> Self {
        Self {
            min_length: 2,
            max_length: 16,
        }
    }
}

/// Limits on caller and extension supplied custom fields
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExtensionPolicy {
    /// Custom field names callers may supply. Fields contributed by extensions are not
    /// filtered by this list.
    pub allowed_fields: Vec<String>,
    pub max_fields: usize,
    pub max_value_length: usize,
}

impl ExtensionPolicy {
    #[must_use]
    pub fn allows(&self, field: &str) -> bool {
        self.allowed_fields.iter().any(|f| f == field)
    }
}

impl Default for ExtensionPolicy {
    fn default() -> Self {
        Self {
            allowed_fields: default_allowed_fields(),
            max_fields: 16,
            max_value_length: 1024,
        }
    }
}

/// Gravatar parameters for the derived avatar URL
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AvatarConfig {
    pub size: u32,
    pub default_image: String,
    pub rating: String,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            size: 128,
            default_image: "identicon".to_string(),
            rating: "pg".to_string(),
        }
    }
}

/// Account creation policy
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationConfig {
    pub username: UsernamePolicy,
    pub password: PasswordPolicy,
    /// Group every new account joins
    pub default_group: String,
    /// Account that skips email verification
    pub verification_exempt_uid: Uid,
    pub extensions: ExtensionPolicy,
    pub avatar: AvatarConfig,
    pub email_confirm_ttl_seconds: u64,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            username: UsernamePolicy::default(),
            password: PasswordPolicy::default(),
            default_group: default_group(),
            verification_exempt_uid: BOOTSTRAP_UID,
            extensions: ExtensionPolicy::default(),
            avatar: AvatarConfig::default(),
            email_confirm_ttl_seconds: 86_400,
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "forum-accounts".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_redis_max_connections() -> u32 {
    16
}

fn default_group() -> String {
    "registered-users".to_string()
}

fn default_allowed_fields() -> Vec<String> {
    ["fullname", "location", "birthday", "website", "signature"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// # Errors
    /// Returns an error if required variables are missing or malformed
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);
        let defaults = RegistrationConfig::default();

        let backend = vars.parse_or("STORE_BACKEND", StoreBackend::default())?;
        let redis_url = match (vars.get("REDIS_URL"), backend) {
            (Some(url), _) => url,
            (None, StoreBackend::Memory) => default_redis_url(),
            (None, StoreBackend::Redis) => return Err(ConfigError::MissingVar("REDIS_URL")),
        };

        let username = UsernamePolicy {
            min_length: vars.parse_or("USERNAME_MIN_LENGTH", defaults.username.min_length)?,
            max_length: vars.parse_or("USERNAME_MAX_LENGTH", defaults.username.max_length)?,
        };
        if username.min_length == 0 || username.min_length > username.max_length {
            return Err(ConfigError::InvalidValue(
                "USERNAME_MIN_LENGTH",
                format!(
                    "{} must be between 1 and USERNAME_MAX_LENGTH ({})",
                    username.min_length, username.max_length
                ),
            ));
        }

        Ok(Self {
            app: AppSettings {
                name: vars.get("APP_NAME").unwrap_or_else(default_app_name),
                env: vars.parse_or("APP_ENV", Environment::default())?,
            },
            api: ServerConfig {
                host: vars.get("API_HOST").unwrap_or_else(default_host),
                port: vars
                    .parse::<u16>("API_PORT")?
                    .ok_or(ConfigError::MissingVar("API_PORT"))?,
            },
            store: StoreConfig { backend },
            redis: RedisConfig {
                url: redis_url,
                max_connections: vars
                    .parse_or("REDIS_MAX_CONNECTIONS", default_redis_max_connections())?,
            },
            registration: RegistrationConfig {
                username,
                password: PasswordPolicy {
                    min_length: vars.parse_or("PASSWORD_MIN_LENGTH", defaults.password.min_length)?,
                    require_mixed_case: vars.parse_or(
                        "PASSWORD_REQUIRE_MIXED_CASE",
                        defaults.password.require_mixed_case,
                    )?,
                    require_digit: vars
                        .parse_or("PASSWORD_REQUIRE_DIGIT", defaults.password.require_digit)?,
                },
                default_group: vars
                    .get("REGISTRATION_DEFAULT_GROUP")
                    .unwrap_or(defaults.default_group),
                verification_exempt_uid: vars
                    .parse_or("VERIFICATION_EXEMPT_UID", defaults.verification_exempt_uid)?,
                extensions: ExtensionPolicy {
                    allowed_fields: vars
                        .get("EXTENSION_ALLOWED_FIELDS")
                        .map(|s| {
                            s.split(',')
                                .map(str::trim)
                                .filter(|f| !f.is_empty())
                                .map(String::from)
                                .collect()
                        })
                        .unwrap_or(defaults.extensions.allowed_fields),
                    max_fields: vars.parse_or("EXTENSION_MAX_FIELDS", defaults.extensions.max_fields)?,
                    max_value_length: vars.parse_or(
                        "EXTENSION_MAX_VALUE_LENGTH",
                        defaults.extensions.max_value_length,
                    )?,
                },
                avatar: AvatarConfig {
                    size: vars.parse_or("GRAVATAR_SIZE", defaults.avatar.size)?,
                    default_image: vars
                        .get("GRAVATAR_DEFAULT")
                        .unwrap_or(defaults.avatar.default_image),
                    rating: vars.get("GRAVATAR_RATING").unwrap_or(defaults.avatar.rating),
                },
                email_confirm_ttl_seconds: vars
                    .parse_or("EMAIL_CONFIRM_TTL_SECONDS", defaults.email_confirm_ttl_seconds)?,
            },
        })
    }
}

/// Variable lookup that treats blank values as unset
struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, name: &str) -> Option<String> {
        (self.0)(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse<T>(&self, name: &'static str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
    {
        self.get(name)
            .map(|raw| {
                raw.parse::<T>()
                    .map_err(|_| ConfigError::InvalidValue(name, raw.clone()))
            })
            .transpose()
    }

    fn parse_or<T>(&self, name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
    {
        Ok(self.parse(name)?.unwrap_or(default))
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_environment_is_production() {
        assert!(!Environment::Development.is_production());
        assert!(!Environment::Staging.is_production());
        assert!(Environment::Production.is_production());
    }

    #[test]
    fn test_environment_is_development() {
        assert!(Environment::Development.is_development());
        assert!(!Environment::Staging.is_development());
        assert!(!Environment::Production.is_development());
    }

    #[test]
    fn test_server_address() {
        let config = ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
        };
        assert_eq!(config.address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_minimal_redis_config() {
        let config = load(&[("API_PORT", "4567"), ("REDIS_URL", "redis://cache:6379")]).unwrap();

        assert_eq!(config.app.name, "forum-accounts");
        assert_eq!(config.app.env, Environment::Development);
        assert_eq!(config.api.address(), "127.0.0.1:4567");
        assert_eq!(config.store.backend, StoreBackend::Redis);
        assert_eq!(config.redis.url, "redis://cache:6379");
        assert_eq!(config.redis.max_connections, 16);

        let registration = config.registration;
        assert_eq!(registration.username, UsernamePolicy::default());
        assert_eq!(registration.default_group, "registered-users");
        assert_eq!(registration.verification_exempt_uid, BOOTSTRAP_UID);
        assert_eq!(registration.extensions.max_fields, 16);
        assert!(registration.extensions.allows("fullname"));
        assert_eq!(registration.avatar.size, 128);
        assert_eq!(registration.email_confirm_ttl_seconds, 86_400);
    }

    #[test]
    fn test_missing_port() {
        let err = load(&[("REDIS_URL", "redis://cache:6379")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("API_PORT")));
    }

    #[test]
    fn test_redis_url_required_only_for_redis_backend() {
        let err = load(&[("API_PORT", "4567")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("REDIS_URL")));

        let config = load(&[("API_PORT", "4567"), ("STORE_BACKEND", "memory")]).unwrap();
        assert_eq!(config.store.backend, StoreBackend::Memory);
    }

    #[test]
    fn test_registration_overrides() {
        let config = load(&[
            ("API_PORT", "4567"),
            ("STORE_BACKEND", "memory"),
            ("USERNAME_MIN_LENGTH", "3"),
            ("USERNAME_MAX_LENGTH", "24"),
            ("PASSWORD_REQUIRE_DIGIT", "false"),
            ("VERIFICATION_EXEMPT_UID", "42"),
            ("EXTENSION_ALLOWED_FIELDS", "fullname, website ,,"),
            ("GRAVATAR_DEFAULT", "retro"),
        ])
        .unwrap();

        let registration = config.registration;
        assert_eq!(registration.username.min_length, 3);
        assert_eq!(registration.username.max_length, 24);
        assert!(!registration.password.require_digit);
        assert!(registration.password.require_mixed_case);
        assert_eq!(registration.verification_exempt_uid, Uid::new(42));
        assert_eq!(
            registration.extensions.allowed_fields,
            vec!["fullname".to_string(), "website".to_string()]
        );
        assert_eq!(registration.avatar.default_image, "retro");
    }

    #[test]
    fn test_invalid_values_are_reported() {
        let err = load(&[("API_PORT", "not-a-port"), ("STORE_BACKEND", "memory")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue("API_PORT", _)));

        let err = load(&[("API_PORT", "4567"), ("STORE_BACKEND", "sqlite")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue("STORE_BACKEND", _)));

        let err = load(&[
            ("API_PORT", "4567"),
            ("STORE_BACKEND", "memory"),
            ("USERNAME_MIN_LENGTH", "20"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue("USERNAME_MIN_LENGTH", _)));
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = load(&[
            ("API_PORT", "4567"),
            ("STORE_BACKEND", "memory"),
            ("APP_NAME", "   "),
        ])
        .unwrap();
        assert_eq!(config.app.name, "forum-accounts");
    }
}
