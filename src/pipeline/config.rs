//! Pipeline configuration.
//!
//! Everything the service needs is read from the environment (optionally
//! seeded from a `.env` file): the text-generation endpoint and its per-role
//! keys, pacing and timeouts, the spreadsheet source, SMTP delivery and the
//! HTTP listener.

use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

use crate::llm::{LlmRole, RateLimitPolicy, DEFAULT_API_BASE, DEFAULT_MODEL};

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// Configuration validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Google Sheets source settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetsConfig {
    /// Spreadsheet id; `None` means the built-in sample rows are used.
    pub spreadsheet_id: Option<String>,
    /// A1 range to read.
    pub range: String,
    /// API key for public sheets.
    pub api_key: Option<String>,
    /// OAuth bearer token for private sheets.
    pub access_token: Option<String>,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: None,
            range: "Sheet1!A:Z".to_string(),
            api_key: None,
            access_token: None,
        }
    }
}

impl SheetsConfig {
    /// True when an id and at least one credential are present.
    pub fn is_configured(&self) -> bool {
        self.spreadsheet_id.is_some() && (self.api_key.is_some() || self.access_token.is_some())
    }
}

/// SMTP delivery settings.
#[derive(Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Defaults to `username` when unset.
    pub recipient: Option<String>,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("recipient", &self.recipient)
            .finish()
    }
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            server: "smtp.gmail.com".to_string(),
            port: 587,
            username: None,
            password: None,
            recipient: None,
        }
    }
}

impl SmtpConfig {
    /// True when a login and password are present. The recipient falls
    /// back to the login address.
    pub fn has_credentials(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }
}

/// Configuration for the content pipeline and its HTTP trigger.
#[derive(Clone)]
pub struct PipelineConfig {
    // LLM settings
    /// OpenAI-compatible base URL of the text-generation service.
    pub llm_api_base: String,
    /// Model used by every role.
    pub default_model: String,
    /// Key shared by every role without an override.
    pub llm_api_key: Option<String>,
    /// Per-role key overrides.
    pub role_api_keys: HashMap<LlmRole, String>,
    /// Whether a role without any key counts as unhealthy.
    pub require_api_key: bool,
    /// Per-call timeout; `None` disables it.
    pub request_timeout: Option<Duration>,
    /// Requests per minute allowed per key (0 = unlimited).
    pub rate_limit_per_minute: u32,
    /// Burst size of each key's token bucket.
    pub rate_limit_burst: u32,

    // Orchestration settings
    /// Delay before the LinkedIn sub-task is dispatched after the tweet one.
    pub social_stagger: Duration,

    // Collaborators
    pub sheets: SheetsConfig,
    pub smtp: SmtpConfig,

    // HTTP settings
    pub server_host: String,
    pub server_port: u16,
}

impl std::fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut roles: Vec<&str> = self.role_api_keys.keys().map(|r| r.as_str()).collect();
        roles.sort_unstable();
        f.debug_struct("PipelineConfig")
            .field("llm_api_base", &self.llm_api_base)
            .field("default_model", &self.default_model)
            .field("has_shared_key", &self.llm_api_key.is_some())
            .field("role_overrides", &roles)
            .field("request_timeout", &self.request_timeout)
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .field("rate_limit_burst", &self.rate_limit_burst)
            .field("social_stagger", &self.social_stagger)
            .field("sheets", &self.sheets)
            .field("smtp", &self.smtp)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .finish_non_exhaustive()
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            llm_api_base: DEFAULT_API_BASE.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            llm_api_key: None,
            role_api_keys: HashMap::new(),
            require_api_key: true,
            request_timeout: Some(Duration::from_secs(120)),
            rate_limit_per_minute: 15,
            rate_limit_burst: 3,

            social_stagger: Duration::ZERO,

            sheets: SheetsConfig::default(),
            smtp: SmtpConfig::default(),

            server_host: "0.0.0.0".to_string(),
            server_port: 8000,
        }
    }
}

impl PipelineConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `LITELLM_API_BASE`: OpenAI-compatible endpoint (default: Gemini)
    /// - `LITELLM_DEFAULT_MODEL`: model name (default: gemini-2.0-flash)
    /// - `LITELLM_API_KEY`: key shared by all roles
    /// - `LITELLM_API_KEY_{RESEARCH,CONTENT,SOCIAL,OPTIMIZATION}`: per-role overrides
    /// - `LITELLM_REQUIRE_API_KEY`: report keyless roles as unhealthy (default: true)
    /// - `LLM_REQUEST_TIMEOUT_SECS`: per-call timeout, 0 disables (default: 120)
    /// - `LLM_RATE_LIMIT_PER_MINUTE`: requests per minute per key, 0 disables (default: 15)
    /// - `LLM_RATE_LIMIT_BURST`: token bucket burst (default: 3)
    /// - `PIPELINE_SOCIAL_STAGGER_SECS`: delay between social sub-tasks (default: 0)
    /// - `GOOGLE_SHEETS_ID`, `GOOGLE_SHEETS_RANGE`, `GOOGLE_SHEETS_API_KEY`,
    ///   `GOOGLE_SHEETS_ACCESS_TOKEN`: spreadsheet source
    /// - `SMTP_SERVER`, `SMTP_PORT`, `SMTP_EMAIL`, `SMTP_PASSWORD`,
    ///   `RECIPIENT_EMAIL`: report delivery
    /// - `SERVER_HOST`, `SERVER_PORT`: HTTP listener (default: 0.0.0.0:8000)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable has an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup. Empty values are
    /// treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        // LLM settings
        if let Some(val) = get("LITELLM_API_BASE") {
            config.llm_api_base = val;
        }
        if let Some(val) = get("LITELLM_DEFAULT_MODEL") {
            config.default_model = val;
        }
        config.llm_api_key = get("LITELLM_API_KEY");
        for role in LlmRole::ALL {
            if let Some(key) = get(role.key_env_var()) {
                config.role_api_keys.insert(role, key);
            }
        }
        if let Some(val) = get("LITELLM_REQUIRE_API_KEY") {
            config.require_api_key = parse_env_bool(&val, "LITELLM_REQUIRE_API_KEY")?;
        }
        if let Some(val) = get("LLM_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = parse_env_value(&val, "LLM_REQUEST_TIMEOUT_SECS")?;
            config.request_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(val) = get("LLM_RATE_LIMIT_PER_MINUTE") {
            config.rate_limit_per_minute = parse_env_value(&val, "LLM_RATE_LIMIT_PER_MINUTE")?;
        }
        if let Some(val) = get("LLM_RATE_LIMIT_BURST") {
            config.rate_limit_burst = parse_env_value(&val, "LLM_RATE_LIMIT_BURST")?;
        }

        // Orchestration settings
        if let Some(val) = get("PIPELINE_SOCIAL_STAGGER_SECS") {
            let secs: u64 = parse_env_value(&val, "PIPELINE_SOCIAL_STAGGER_SECS")?;
            config.social_stagger = Duration::from_secs(secs);
        }

        // Spreadsheet source
        config.sheets.spreadsheet_id = get("GOOGLE_SHEETS_ID");
        if let Some(val) = get("GOOGLE_SHEETS_RANGE") {
            config.sheets.range = val;
        }
        config.sheets.api_key = get("GOOGLE_SHEETS_API_KEY");
        config.sheets.access_token = get("GOOGLE_SHEETS_ACCESS_TOKEN");

        // Email delivery
        if let Some(val) = get("SMTP_SERVER") {
            config.smtp.server = val;
        }
        if let Some(val) = get("SMTP_PORT") {
            config.smtp.port = parse_env_value(&val, "SMTP_PORT")?;
        }
        config.smtp.username = get("SMTP_EMAIL");
        config.smtp.password = get("SMTP_PASSWORD");
        config.smtp.recipient = get("RECIPIENT_EMAIL");

        // HTTP settings
        if let Some(val) = get("SERVER_HOST") {
            config.server_host = val;
        }
        if let Some(val) = get("SERVER_PORT") {
            config.server_port = parse_env_value(&val, "SERVER_PORT")?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    ///
    /// Missing credentials are not validation errors: they surface through
    /// the readiness probe instead.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationFailed` if any values are invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm_api_base.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "llm_api_base cannot be empty".to_string(),
            ));
        }

        if !self.llm_api_base.starts_with("http://") && !self.llm_api_base.starts_with("https://")
        {
            return Err(ConfigError::ValidationFailed(format!(
                "llm_api_base must be an http(s) URL, got '{}'",
                self.llm_api_base
            )));
        }

        if self.default_model.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "default_model cannot be empty".to_string(),
            ));
        }

        if self.rate_limit_per_minute > 0 && self.rate_limit_burst == 0 {
            return Err(ConfigError::ValidationFailed(
                "rate_limit_burst must be greater than 0 when rate limiting is enabled"
                    .to_string(),
            ));
        }

        if self.sheets.range.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "sheets range cannot be empty".to_string(),
            ));
        }

        if self.smtp.server.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "smtp server cannot be empty".to_string(),
            ));
        }

        if self.smtp.port == 0 {
            return Err(ConfigError::ValidationFailed(
                "smtp port must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Key used by `role`: its override if present, else the shared key.
    pub fn api_key_for(&self, role: LlmRole) -> Option<&str> {
        self.role_api_keys
            .get(&role)
            .or(self.llm_api_key.as_ref())
            .map(String::as_str)
    }

    /// Token bucket applied to each distinct API key.
    pub fn rate_limit_policy(&self) -> RateLimitPolicy {
        RateLimitPolicy::per_minute(self.rate_limit_per_minute, self.rate_limit_burst)
    }

    /// `host:port` for the HTTP listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Builder method to set the API base URL.
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.llm_api_base = base.into();
        self
    }

    /// Builder method to set the default model.
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Builder method to set the shared API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.llm_api_key = Some(key.into());
        self
    }

    /// Builder method to set a per-role API key.
    pub fn with_role_api_key(mut self, role: LlmRole, key: impl Into<String>) -> Self {
        self.role_api_keys.insert(role, key.into());
        self
    }

    /// Builder method to set the per-call timeout.
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Builder method to set the per-key rate limit.
    pub fn with_rate_limit(mut self, per_minute: u32, burst: u32) -> Self {
        self.rate_limit_per_minute = per_minute;
        self.rate_limit_burst = burst;
        self
    }

    /// Builder method to set the social dispatch stagger.
    pub fn with_social_stagger(mut self, stagger: Duration) -> Self {
        self.social_stagger = stagger;
        self
    }

    /// Builder method to set the spreadsheet source.
    pub fn with_sheets(mut self, sheets: SheetsConfig) -> Self {
        self.sheets = sheets;
        self
    }

    /// Builder method to set SMTP delivery.
    pub fn with_smtp(mut self, smtp: SmtpConfig) -> Self {
        self.smtp = smtp;
        self
    }

    /// Builder method to set the listener port.
    pub fn with_server_port(mut self, port: u16) -> Self {
        self.server_port = port;
        self
    }
}

/// Parse an environment variable value into a type.
fn parse_env_value<T: std::str::FromStr>(value: &str, key: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("could not parse '{}'", value),
    })
}

/// Parse an environment variable as a boolean.
fn parse_env_bool(value: &str, key: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected boolean value, got '{}'", value),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.llm_api_base, DEFAULT_API_BASE);
        assert_eq!(config.default_model, DEFAULT_MODEL);
        assert!(config.llm_api_key.is_none());
        assert_eq!(config.request_timeout, Some(Duration::from_secs(120)));
        assert_eq!(config.social_stagger, Duration::ZERO);
        assert_eq!(config.sheets.range, "Sheet1!A:Z");
        assert_eq!(config.smtp.server, "smtp.gmail.com");
        assert_eq!(config.smtp.port, 587);
        assert_eq!(config.bind_address(), "0.0.0.0:8000");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup_reads_every_section() {
        let config = PipelineConfig::from_lookup(lookup_from(&[
            ("LITELLM_API_BASE", "http://localhost:4000"),
            ("LITELLM_DEFAULT_MODEL", "gpt-4o-mini"),
            ("LITELLM_API_KEY", "shared"),
            ("LITELLM_API_KEY_SOCIAL", "social-key"),
            ("LLM_REQUEST_TIMEOUT_SECS", "0"),
            ("LLM_RATE_LIMIT_PER_MINUTE", "30"),
            ("LLM_RATE_LIMIT_BURST", "2"),
            ("PIPELINE_SOCIAL_STAGGER_SECS", "45"),
            ("GOOGLE_SHEETS_ID", "sheet-123"),
            ("GOOGLE_SHEETS_API_KEY", "sheets-key"),
            ("SMTP_PORT", "465"),
            ("SMTP_EMAIL", "bot@example.com"),
            ("SMTP_PASSWORD", "secret"),
            ("RECIPIENT_EMAIL", "editor@example.com"),
            ("SERVER_PORT", "9000"),
        ]))
        .expect("config should parse");

        assert_eq!(config.llm_api_base, "http://localhost:4000");
        assert_eq!(config.default_model, "gpt-4o-mini");
        assert_eq!(config.api_key_for(LlmRole::Research), Some("shared"));
        assert_eq!(config.api_key_for(LlmRole::Social), Some("social-key"));
        assert_eq!(config.request_timeout, None);
        assert_eq!(config.social_stagger, Duration::from_secs(45));
        assert!(config.sheets.is_configured());
        assert_eq!(config.smtp.port, 465);
        assert!(config.smtp.has_credentials());
        assert_eq!(config.server_port, 9000);
        match config.rate_limit_policy() {
            RateLimitPolicy::TokenBucket { capacity, .. } => assert_eq!(capacity, 2),
            other => panic!("unexpected policy {:?}", other),
        }
    }

    #[test]
    fn test_from_lookup_treats_blank_as_unset() {
        let config = PipelineConfig::from_lookup(lookup_from(&[
            ("LITELLM_API_KEY", "   "),
            ("SMTP_SERVER", ""),
        ]))
        .expect("config should parse");
        assert!(config.llm_api_key.is_none());
        assert_eq!(config.smtp.server, "smtp.gmail.com");
    }

    #[test]
    fn test_from_lookup_rejects_bad_number() {
        let err = PipelineConfig::from_lookup(lookup_from(&[("SMTP_PORT", "not-a-port")]))
            .expect_err("should fail");
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "SMTP_PORT"));
    }

    #[test]
    fn test_api_key_for_without_any_key() {
        let config = PipelineConfig::default();
        for role in LlmRole::ALL {
            assert!(config.api_key_for(role).is_none());
        }
    }

    #[test]
    fn test_validation_rejects_non_http_base() {
        let config = PipelineConfig::default().with_api_base("localhost:4000");
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("llm_api_base"));
    }

    #[test]
    fn test_validation_empty_model() {
        let config = PipelineConfig::default().with_default_model("");
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("default_model"));
    }

    #[test]
    fn test_validation_zero_burst() {
        let config = PipelineConfig::default().with_rate_limit(10, 0);
        assert!(config.validate().is_err());

        let config = PipelineConfig::default().with_rate_limit(0, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_debug_hides_secrets() {
        let config = PipelineConfig::default()
            .with_api_key("sk-very-secret")
            .with_smtp(SmtpConfig {
                password: Some("hunter2".to_string()),
                ..SmtpConfig::default()
            });
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("sk-very-secret"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_parse_env_bool() {
        assert!(parse_env_bool("true", "test").unwrap());
        assert!(parse_env_bool("1", "test").unwrap());
        assert!(parse_env_bool("YES", "test").unwrap());
        assert!(!parse_env_bool("off", "test").unwrap());
        assert!(!parse_env_bool("0", "test").unwrap());
        assert!(parse_env_bool("invalid", "test").is_err());
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidValue {
            key: "KEY".to_string(),
            message: "bad value".to_string(),
        };
        assert!(err.to_string().contains("KEY"));
        assert!(err.to_string().contains("bad value"));

        let err = ConfigError::ValidationFailed("test failure".to_string());
        assert!(err.to_string().contains("test failure"));
    }
}
