//! TOML-based configuration for deepr
//!
//! Every field has a default, so an empty or missing `deepr.toml` is a valid
//! configuration. Secrets normally come from the environment; the optional
//! `[credentials]` table plays the role of a local secrets file.

use crate::types::{AppError, Credentials};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file name, resolved against the working directory
pub const DEFAULT_CONFIG_FILE: &str = "deepr.toml";

/// Root configuration structure loaded from deepr.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeeprConfig {
    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub firecrawl: FirecrawlConfig,

    #[serde(default)]
    pub research: ResearchConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub credentials: CredentialsConfig,
}

// ============= LLM Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API
    #[serde(default = "default_llm_api_base")]
    pub api_base: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Environment variable holding the model-provider key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    pub temperature: Option<f32>,
}

fn default_llm_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: default_llm_api_base(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            temperature: None,
        }
    }
}

// ============= Firecrawl Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirecrawlConfig {
    #[serde(default = "default_firecrawl_api_base")]
    pub api_base: String,
}

fn default_firecrawl_api_base() -> String {
    crate::research::FIRECRAWL_API_BASE.to_string()
}

impl Default for FirecrawlConfig {
    fn default() -> Self {
        Self {
            api_base: default_firecrawl_api_base(),
        }
    }
}

// ============= Research Configuration =============

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// Return a "research unavailable" report instead of synthesizing one
    /// when the deep research call fails
    #[serde(default)]
    pub fail_fast: bool,
}

// ============= Logging Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON log lines instead of human-readable ones
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ============= Credentials Configuration =============

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    pub openai_api_key: Option<String>,
    pub firecrawl_api_key: Option<String>,
}

impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let masked = |key: &Option<String>| key.as_deref().map(crate::types::mask_secret);
        f.debug_struct("CredentialsConfig")
            .field("openai_api_key", &masked(&self.openai_api_key))
            .field("firecrawl_api_key", &masked(&self.firecrawl_api_key))
            .finish()
    }
}

// ============= Errors =============

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

/// Non-fatal configuration issue
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigWarning {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl DeeprConfig {
    /// Load and validate configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Like [`load`](Self::load), but a missing file yields the defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::FileNotFound(_)) => Ok(Self::default()),
            other => other,
        }
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: DeeprConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check endpoint URLs and the model name
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_url("llm.api_base", &self.llm.api_base)?;
        validate_url("firecrawl.api_base", &self.firecrawl.api_base)?;

        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "llm.model must not be empty".to_string(),
            ));
        }

        if self.llm.api_key_env.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "llm.api_key_env must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Validate, then collect issues that do not prevent a run
    pub fn validate_with_warnings(&self) -> Result<Vec<ConfigWarning>, ConfigError> {
        self.validate()?;

        let mut warnings = Vec::new();

        if let Some(temperature) = self.llm.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                warnings.push(ConfigWarning {
                    field: "llm.temperature".to_string(),
                    message: format!("{} is outside the usual 0.0-2.0 range", temperature),
                });
            }
        }

        if self.credentials.openai_api_key.is_some() || self.credentials.firecrawl_api_key.is_some()
        {
            warnings.push(ConfigWarning {
                field: "credentials".to_string(),
                message: "API keys are stored in plain text; keep this file out of version control"
                    .to_string(),
            });
        }

        Ok(warnings)
    }

    /// Model-provider key: flag, then `[credentials]`, then `llm.api_key_env`
    pub fn model_api_key(&self, flag: Option<&str>) -> Option<String> {
        non_blank(flag)
            .or_else(|| non_blank(self.credentials.openai_api_key.as_deref()))
            .or_else(|| {
                std::env::var(&self.llm.api_key_env)
                    .ok()
                    .filter(|k| !k.trim().is_empty())
            })
    }

    /// Research-service session key: flag, then `[credentials]`.
    ///
    /// `FIRECRAWL_API_KEY` is not read here; credential resolution falls back
    /// to it on its own.
    pub fn research_api_key(&self, flag: Option<&str>) -> Option<String> {
        non_blank(flag).or_else(|| non_blank(self.credentials.firecrawl_api_key.as_deref()))
    }

    /// Snapshot of both credentials for one run
    pub fn credentials(&self, openai_flag: Option<&str>, firecrawl_flag: Option<&str>) -> Credentials {
        Credentials {
            model_api_key: self.model_api_key(openai_flag),
            research_api_key: self.research_api_key(firecrawl_flag),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn validate_url(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(format!(
            "{} must be an http(s) URL, got '{}'",
            field, value
        )))
    }
}

/// Commented template written by `deepr init`
pub const CONFIG_TEMPLATE: &str = r#"# deepr configuration
#
# Every value below is optional; the commented defaults apply when omitted.

[llm]
# Any OpenAI-compatible chat completions endpoint
api_base = "https://api.openai.com/v1"
model = "gpt-4o-mini"
# Environment variable holding the model-provider key
api_key_env = "OPENAI_API_KEY"
# temperature = 0.3

[firecrawl]
api_base = "https://api.firecrawl.dev"

[research]
# true: report "research unavailable" instead of synthesizing when the
# deep research call fails
fail_fast = false

[logging]
# Console progress is shown separately; "info" adds run and state logs.
# Overridden by RUST_LOG when set, and by --verbose.
level = "warn"
json = false

# Optional local secrets. Prefer environment variables or a .env file.
[credentials]
# openai_api_key = "sk-..."
# firecrawl_api_key = "fc-..."
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = DeeprConfig::from_toml_str("").unwrap();
        assert_eq!(config.llm.api_base, "https://api.openai.com/v1");
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.firecrawl.api_base, "https://api.firecrawl.dev");
        assert!(!config.research.fail_fast);
        assert_eq!(config.logging.level, "warn");
        assert!(config.credentials.openai_api_key.is_none());
    }

    #[test]
    fn test_template_parses() {
        let config = DeeprConfig::from_toml_str(CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert!(config.validate_with_warnings().unwrap().is_empty());
    }

    #[test]
    fn test_partial_sections() {
        let config = DeeprConfig::from_toml_str(
            r#"
            [llm]
            model = "gpt-4o"
            temperature = 0.2

            [research]
            fail_fast = true
            "#,
        )
        .unwrap();

        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.api_base, "https://api.openai.com/v1");
        assert_eq!(config.llm.temperature, Some(0.2));
        assert!(config.research.fail_fast);
    }

    #[test]
    fn test_rejects_non_http_url() {
        let err = DeeprConfig::from_toml_str("[firecrawl]\napi_base = \"ftp://example.com\"")
            .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
        assert!(err.to_string().contains("firecrawl.api_base"));
    }

    #[test]
    fn test_rejects_empty_model() {
        let err = DeeprConfig::from_toml_str("[llm]\nmodel = \"  \"").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_parse_error() {
        let err = DeeprConfig::from_toml_str("[llm\nmodel = 1").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_warnings() {
        let config = DeeprConfig::from_toml_str(
            r#"
            [llm]
            temperature = 3.5

            [credentials]
            openai_api_key = "sk-local"
            "#,
        )
        .unwrap();

        let warnings = config.validate_with_warnings().unwrap();
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].field, "llm.temperature");
        assert_eq!(warnings[1].field, "credentials");
    }

    #[test]
    fn test_flag_takes_precedence() {
        let mut config = DeeprConfig::default();
        config.credentials.openai_api_key = Some("from-file".to_string());
        config.credentials.firecrawl_api_key = Some("fc-file".to_string());

        assert_eq!(config.model_api_key(Some("from-flag")).as_deref(), Some("from-flag"));
        assert_eq!(config.model_api_key(Some("  ")).as_deref(), Some("from-file"));
        assert_eq!(config.research_api_key(None).as_deref(), Some("fc-file"));
        assert_eq!(config.research_api_key(Some("fc-flag")).as_deref(), Some("fc-flag"));
    }

    #[test]
    fn test_model_key_reads_configured_env_var() {
        let mut config = DeeprConfig::default();
        config.llm.api_key_env = "DEEPR_TEST_MODEL_KEY_TOML_CONFIG".to_string();

        std::env::set_var("DEEPR_TEST_MODEL_KEY_TOML_CONFIG", "sk-env");
        assert_eq!(config.model_api_key(None).as_deref(), Some("sk-env"));
        std::env::remove_var("DEEPR_TEST_MODEL_KEY_TOML_CONFIG");
        assert_eq!(config.model_api_key(None), None);
    }

    #[test]
    fn test_credentials_debug_is_masked() {
        let credentials = CredentialsConfig {
            openai_api_key: Some("sk-1234567890abcdef".to_string()),
            firecrawl_api_key: None,
        };
        let debug = format!("{:?}", credentials);
        assert!(!debug.contains("567890abcdef"));
        assert!(debug.contains("sk-1****"));
    }

    #[test]
    fn test_config_error_converts_to_configuration() {
        let app: AppError = ConfigError::ValidationError("bad".to_string()).into();
        assert!(matches!(app, AppError::Configuration(_)));
    }
}
