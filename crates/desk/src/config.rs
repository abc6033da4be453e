//! Desk configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `REFUND_DESK_API_BASE_URL` - Base URL of the customer-management API
//! - `REFUND_DESK_API_KEY` - Bearer key for the customer and messaging endpoints
//! - `REFUND_DESK_BOT_NAME` - Sender identifier of the outbound messaging bot
//!
//! ## Optional
//! - `REFUND_DESK_TEST_PHONE` - When set, every message goes to this number instead
//! - `REFUND_DESK_MESSAGE_DELAY_MS` - Pause between two messages (default: 5000)
//! - `REFUND_DESK_COUNTRY_CODE` - Prefix for destination numbers (default: 55)
//! - `REFUND_DESK_TOKEN_PATH` - Session token file (default: `<config dir>/refund-desk/session.json`)
//! - `REFUND_DESK_BLOCK_CANCELLED` - Also disable the send action on cancelled records (default: false)
//! - `REFUND_DESK_WEB_MESSAGING_URL` - Web messaging link base (default: `https://wa.me`)
//! - `REFUND_DESK_LOG_JSON` - Emit JSON logs when set
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Sentry error sample rate (default: 1.0)

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::outreach::OutreachSettings;

const DEFAULT_MESSAGE_DELAY_MS: u64 = 5000;
const DEFAULT_COUNTRY_CODE: &str = "55";
const DEFAULT_WEB_MESSAGING_URL: &str = "https://wa.me";
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.0;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "insert",
    "put-your",
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

/// Desk configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct DeskConfig {
    /// Base URL of the customer-management API
    pub api_base_url: Url,
    /// Bearer key for the customer and messaging endpoints
    pub api_key: SecretString,
    /// Sender identifier of the outbound messaging bot
    pub bot_name: String,
    /// Destination override for every dispatched message
    pub test_phone: Option<String>,
    /// Pause between the first and second message of a send
    pub message_delay: Duration,
    /// Country calling code prefixed to destination numbers
    pub country_code: String,
    /// File holding the persisted session token
    pub token_path: PathBuf,
    /// Disable the send action on cancelled records too
    pub block_cancelled: bool,
    /// Base of the web messaging link
    pub web_messaging_url: Url,
    /// Emit JSON logs instead of text
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
}

impl std::fmt::Debug for DeskConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeskConfig")
            .field("api_base_url", &self.api_base_url.as_str())
            .field("api_key", &"[REDACTED]")
            .field("bot_name", &self.bot_name)
            .field("test_phone", &self.test_phone)
            .field("message_delay", &self.message_delay)
            .field("country_code", &self.country_code)
            .field("token_path", &self.token_path)
            .field("block_cancelled", &self.block_cancelled)
            .field("web_messaging_url", &self.web_messaging_url.as_str())
            .finish_non_exhaustive()
    }
}

impl DeskConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    /// A weak-looking API key only produces a warning.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = get_url("REFUND_DESK_API_BASE_URL", None)?;
        let api_key = get_required_env("REFUND_DESK_API_KEY")?;
        if let Err(e) = validate_secret_strength(&api_key, "REFUND_DESK_API_KEY") {
            tracing::warn!("REFUND_DESK_API_KEY validation warning: {e}");
        }
        let bot_name = get_required_env("REFUND_DESK_BOT_NAME")?;

        let message_delay = get_env_or_default(
            "REFUND_DESK_MESSAGE_DELAY_MS",
            &DEFAULT_MESSAGE_DELAY_MS.to_string(),
        )
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|e| {
            ConfigError::InvalidEnvVar("REFUND_DESK_MESSAGE_DELAY_MS".to_string(), e.to_string())
        })?;

        let country_code = get_env_or_default("REFUND_DESK_COUNTRY_CODE", DEFAULT_COUNTRY_CODE);
        if country_code.is_empty() || !country_code.chars().all(|c| c.is_ascii_digit()) {
            return Err(ConfigError::InvalidEnvVar(
                "REFUND_DESK_COUNTRY_CODE".to_string(),
                "must contain digits only".to_string(),
            ));
        }

        let token_path = match get_optional_env("REFUND_DESK_TOKEN_PATH") {
            Some(path) => PathBuf::from(path),
            None => default_token_path()?,
        };

        let block_cancelled = get_bool("REFUND_DESK_BLOCK_CANCELLED")?;
        let web_messaging_url =
            get_url("REFUND_DESK_WEB_MESSAGING_URL", Some(DEFAULT_WEB_MESSAGING_URL))?;
        let log_json = get_optional_env("REFUND_DESK_LOG_JSON").is_some();

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            api_base_url,
            api_key: SecretString::from(api_key),
            bot_name,
            test_phone: get_optional_env("REFUND_DESK_TEST_PHONE"),
            message_delay,
            country_code,
            token_path,
            block_cancelled,
            web_messaging_url,
            log_json,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
        })
    }

    /// Settings for the outreach workflow derived from this configuration.
    #[must_use]
    pub fn outreach_settings(&self) -> OutreachSettings {
        OutreachSettings {
            bot_name: self.bot_name.clone(),
            test_phone: self.test_phone.clone(),
            country_code: self.country_code.clone(),
            message_delay: self.message_delay,
            block_cancelled: self.block_cancelled,
            web_messaging_url: self.web_messaging_url.clone(),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse a URL variable, falling back to `default` when unset.
fn get_url(key: &str, default: Option<&str>) -> Result<Url, ConfigError> {
    let raw = match (get_optional_env(key), default) {
        (Some(value), _) => value,
        (None, Some(fallback)) => fallback.to_string(),
        (None, None) => return Err(ConfigError::MissingEnvVar(key.to_string())),
    };
    let url = Url::parse(&raw)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

/// Parse a boolean flag (`1`, `true`, `yes`, `on` / `0`, `false`, `no`, `off`).
fn get_bool(key: &str) -> Result<bool, ConfigError> {
    parse_bool(get_optional_env(key).as_deref(), key)
}

fn parse_bool(value: Option<&str>, key: &str) -> Result<bool, ConfigError> {
    match value.map(str::to_ascii_lowercase).as_deref() {
        None | Some("0" | "false" | "no" | "off") => Ok(false),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some(other) => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got '{other}'"),
        )),
    }
}

fn default_token_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("refund-desk").join("session.json"))
        .ok_or_else(|| {
            ConfigError::MissingEnvVar(
                "REFUND_DESK_TOKEN_PATH (no user config directory available)".to_string(),
            )
        })
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}
