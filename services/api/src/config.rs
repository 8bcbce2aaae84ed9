//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub cors_origin: String,
    pub openai_api_key: Option<String>,
    /// Overrides the OpenAI endpoint, e.g. for an OpenAI-compatible Gemini gateway.
    pub chat_api_base: Option<String>,
    pub chat_model: String,
    pub checkout_delay: Duration,
    pub trial_delay: Duration,
    pub session_ttl_days: i64,
    /// Adds `Secure` to the session cookie. Turn off only for plain-HTTP deployments.
    pub cookie_secure: bool,
    /// Conversations untouched for this long are dropped.
    pub conversation_idle_minutes: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 3000)),
            log_level: Level::INFO,
            cors_origin: "http://localhost:3000".to_string(),
            openai_api_key: None,
            chat_api_base: None,
            chat_model: "gpt-4o-mini".to_string(),
            checkout_delay: Duration::from_millis(2000),
            trial_delay: Duration::from_millis(800),
            session_ttl_days: 30,
            cookie_secure: true,
            conversation_idle_minutes: 60,
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        let defaults = Self::default();

        // --- Server Settings ---
        let bind_address = match std::env::var("BIND_ADDRESS") {
            Ok(value) => value.parse::<SocketAddr>().map_err(|e| {
                ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
            })?,
            Err(_) => defaults.bind_address,
        };

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin = std::env::var("CORS_ORIGIN").unwrap_or(defaults.cors_origin);

        // --- Chat Completion Settings ---
        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();
        let chat_api_base = std::env::var("CHAT_API_BASE").ok();
        let chat_model = std::env::var("CHAT_MODEL").unwrap_or(defaults.chat_model);

        // --- Mocked Submission Settings ---
        let checkout_delay = millis_var("CHECKOUT_DELAY_MS")?.unwrap_or(defaults.checkout_delay);
        let trial_delay = millis_var("TRIAL_DELAY_MS")?.unwrap_or(defaults.trial_delay);

        let session_ttl_days = match std::env::var("SESSION_TTL_DAYS") {
            Ok(value) => value.parse::<i64>().map_err(|e| {
                ConfigError::InvalidValue("SESSION_TTL_DAYS".to_string(), e.to_string())
            })?,
            Err(_) => defaults.session_ttl_days,
        };
        let cookie_secure = match std::env::var("COOKIE_SECURE") {
            Ok(value) => parse_flag("COOKIE_SECURE", &value)?,
            Err(_) => defaults.cookie_secure,
        };
        let conversation_idle_minutes = match std::env::var("CONVERSATION_IDLE_MINUTES") {
            Ok(value) => value.parse::<i64>().map_err(|e| {
                ConfigError::InvalidValue("CONVERSATION_IDLE_MINUTES".to_string(), e.to_string())
            })?,
            Err(_) => defaults.conversation_idle_minutes,
        };

        Ok(Self {
            bind_address,
            log_level,
            cors_origin,
            openai_api_key,
            chat_api_base,
            chat_model,
            checkout_delay,
            trial_delay,
            session_ttl_days,
            cookie_secure,
            conversation_idle_minutes,
        })
    }

    /// The API key, which only the real chat adapter needs.
    pub fn require_openai_api_key(&self) -> Result<&str, ConfigError> {
        self.openai_api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingVar("OPENAI_API_KEY".to_string()))
    }
}

fn millis_var(name: &str) -> Result<Option<Duration>, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value
            .parse::<u64>()
            .map(|ms| Some(Duration::from_millis(ms)))
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        Err(_) => Ok(None),
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidValue(
            name.to_string(),
            format!("'{}' is not a boolean", other),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_landing_page() {
        let config = Config::default();
        assert_eq!(config.checkout_delay, Duration::from_millis(2000));
        assert_eq!(config.trial_delay, Duration::from_millis(800));
        assert_eq!(config.bind_address.port(), 3000);
    }

    #[test]
    fn missing_api_key_is_reported() {
        let config = Config::default();
        assert!(matches!(
            config.require_openai_api_key(),
            Err(ConfigError::MissingVar(var)) if var == "OPENAI_API_KEY"
        ));
    }

    #[test]
    fn cookie_flag_accepts_common_spellings() {
        assert!(parse_flag("COOKIE_SECURE", "TRUE").unwrap());
        assert!(!parse_flag("COOKIE_SECURE", "off").unwrap());
        assert!(!parse_flag("COOKIE_SECURE", " 0 ").unwrap());
        assert!(matches!(
            parse_flag("COOKIE_SECURE", "maybe"),
            Err(ConfigError::InvalidValue(var, _)) if var == "COOKIE_SECURE"
        ));
        assert!(Config::default().cookie_secure);
    }
}
