//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `HEMLINE_DATABASE_URL` - `PostgreSQL` connection string
//! - `HEMLINE_BASE_URL` - Public URL of the frontend (used for OAuth redirects)
//! - `HEMLINE_JWT_SECRET` - Token signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `HEMLINE_HOST` - Bind address (default: 127.0.0.1)
//! - `HEMLINE_PORT` - Listen port (default: 3000)
//! - `HEMLINE_UPLOAD_DIR` - Directory for product image uploads (default: uploads)
//! - `GOOGLE_CLIENT_ID` - Google OAuth client ID (set with `GOOGLE_CLIENT_SECRET`)
//! - `GOOGLE_CLIENT_SECRET` - Google OAuth client secret
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment (e.g., "development", "production")
//! - `SENTRY_SAMPLE_RATE` - Sentry error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Sentry traces sample rate (default: 1.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

const MIN_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Substrings that mark a secret as copy-pasted sample text.
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the frontend, without trailing slash
    pub base_url: String,
    /// Token signing secret
    pub jwt_secret: SecretString,
    /// Directory where uploaded product images are stored
    pub upload_dir: PathBuf,
    /// Google OAuth configuration (optional - login with Google disabled when unset)
    pub google: Option<GoogleConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Google OAuth client configuration.
///
/// Implements `Debug` manually to redact the client secret.
#[derive(Clone)]
pub struct GoogleConfig {
    /// OAuth client ID (safe to expose in the authorization URL)
    pub client_id: String,
    /// OAuth client secret (server-side only)
    pub client_secret: SecretString,
}

impl std::fmt::Debug for GoogleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the signing secret fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = database_url_from_env()?;
        let host = parse_env("HEMLINE_HOST", "127.0.0.1")?;
        let port = parse_env("HEMLINE_PORT", "3000")?;
        let base_url = require_env("HEMLINE_BASE_URL")?
            .trim_end_matches('/')
            .to_string();
        let jwt_secret = signing_secret_from_env("HEMLINE_JWT_SECRET")?;
        let upload_dir = PathBuf::from(env_or("HEMLINE_UPLOAD_DIR", "uploads"));

        let google = GoogleConfig::from_env()?;
        let sentry_dsn = maybe_env("SENTRY_DSN");
        let sentry_environment = maybe_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = maybe_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = maybe_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            jwt_secret,
            upload_dir,
            google,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl GoogleConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        match (maybe_env("GOOGLE_CLIENT_ID"), maybe_env("GOOGLE_CLIENT_SECRET")) {
            (Some(id), Some(secret)) => Ok(Some(Self {
                client_id: id,
                client_secret: SecretString::from(secret),
            })),
            (None, None) => Ok(None),
            _ => Err(ConfigError::InvalidEnvVar(
                "GOOGLE_*".to_string(),
                "Both GOOGLE_CLIENT_ID and GOOGLE_CLIENT_SECRET must be set together".to_string(),
            )),
        }
    }
}

// =============================================================================
// Environment Helpers
// =============================================================================

/// A required environment variable.
fn require_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_owned()))
}

/// An optional environment variable.
fn maybe_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// An environment variable with a fallback default.
fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parse an environment variable into `T`, using `default` when unset.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    env_or(key, default)
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string()))
}

/// The database URL, preferring `HEMLINE_DATABASE_URL` and accepting the
/// bare `DATABASE_URL` that managed postgres attachments inject.
fn database_url_from_env() -> Result<SecretString, ConfigError> {
    maybe_env("HEMLINE_DATABASE_URL")
        .or_else(|| maybe_env("DATABASE_URL"))
        .map(SecretString::from)
        .ok_or_else(|| ConfigError::MissingEnvVar("HEMLINE_DATABASE_URL".to_owned()))
}

/// Load a signing secret, refusing to boot on weak values.
fn signing_secret_from_env(key: &str) -> Result<SecretString, ConfigError> {
    let value = require_env(key)?;
    validate_signing_secret(&value, key)?;
    Ok(SecretString::from(value))
}

/// Reject secrets that are too short, look like sample text, or lack
/// entropy. Catches `.env.example` values before they sign real tokens.
fn validate_signing_secret(value: &str, var_name: &str) -> Result<(), ConfigError> {
    let reject = |reason: String| -> Result<(), ConfigError> {
        Err(ConfigError::InsecureSecret(var_name.to_owned(), reason))
    };

    if value.len() < MIN_SECRET_LENGTH {
        return reject(format!(
            "must be at least {MIN_SECRET_LENGTH} characters (got {})",
            value.len()
        ));
    }

    let lower = value.to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(**p)) {
        return reject(format!("appears to be a placeholder (contains '{pattern}')"));
    }

    let entropy = entropy_bits_per_char(value);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return reject(format!(
            "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR}); use a randomly generated value"
        ));
    }

    Ok(())
}

/// Shannon entropy of the character distribution, in bits per character.
fn entropy_bits_per_char(s: &str) -> f64 {
    let mut freq: HashMap<char, u32> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }
    if freq.is_empty() {
        return 0.0;
    }

    let total = f64::from(freq.values().sum::<u32>());
    freq.values().fold(0.0, |bits, &n| {
        let p = f64::from(n) / total;
        p.mul_add(-p.log2(), bits)
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_entropy_zero_for_uniform_input() {
        assert!(entropy_bits_per_char("").abs() < f64::EPSILON);
        assert!(entropy_bits_per_char("aaaaaaaa").abs() < f64::EPSILON);
    }

    #[test]
    fn test_entropy_counts_distinct_characters() {
        // Four equally likely characters carry two bits each.
        assert!((entropy_bits_per_char("abcd") - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_short_secret_rejected() {
        let err = validate_signing_secret("short", "TEST_SECRET").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_placeholder_secret_rejected() {
        // Long enough, but obviously sample text.
        let err = validate_signing_secret("your-signing-key-goes-right-here", "TEST_SECRET")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_repetitive_secret_rejected() {
        assert!(validate_signing_secret(&"ab".repeat(20), "TEST_SECRET").is_err());
    }

    #[test]
    fn test_random_secret_accepted() {
        assert!(
            validate_signing_secret("kR9#vT2!mQ8@xW5$nZ4^bJ7&cL0*fD3%", "TEST_SECRET").is_ok()
        );
    }

    #[test]
    fn test_socket_addr_joins_host_and_port() {
        let config = ServerConfig {
            database_url: SecretString::from("postgres://localhost/hemline_test"),
            host: "0.0.0.0".parse().unwrap(),
            port: 8443,
            base_url: "https://shop.example".to_string(),
            jwt_secret: SecretString::from("k".repeat(32)),
            upload_dir: PathBuf::from("uploads"),
            google: None,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        };

        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8443");
    }

    #[test]
    fn test_google_debug_redacts_the_client_secret() {
        let config = GoogleConfig {
            client_id: "web-client-1234.apps.googleusercontent.com".to_string(),
            client_secret: SecretString::from("GOCSPX-not-for-logs"),
        };

        let output = format!("{config:?}");
        assert!(output.contains("web-client-1234"));
        assert!(output.contains("[REDACTED]"));
        assert!(!output.contains("GOCSPX-not-for-logs"));
    }
}
