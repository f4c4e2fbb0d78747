use crate::domain::ports::ConfigProvider;
use crate::utils::error::{LookupError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_DEMOGRAPHIC_BASE_URL: &str = "https://api.joshuaproject.net";
pub const DEFAULT_MODEL_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-haiku-4-5-20251001";
pub const DEFAULT_MAX_TOKENS: u32 = 512;
const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LookupConfig {
    #[serde(default)]
    pub demographic: DemographicConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
    /// Extra or corrected country-name → region-code entries.
    #[serde(default)]
    pub countries: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemographicConfig {
    #[serde(default = "default_demographic_base_url")]
    pub base_url: String,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    pub path: Option<PathBuf>,
}

fn default_demographic_base_url() -> String {
    DEFAULT_DEMOGRAPHIC_BASE_URL.to_string()
}

fn default_model_base_url() -> String {
    DEFAULT_MODEL_BASE_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

impl Default for DemographicConfig {
    fn default() -> Self {
        Self {
            base_url: default_demographic_base_url(),
            timeout_seconds: None,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: default_model_base_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            timeout_seconds: None,
        }
    }
}

impl LookupConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| LookupError::ConfigError {
            message: format!(
                "cannot read config file {}: {}",
                path.as_ref().display(),
                e
            ),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;
        Ok(toml::from_str(&processed_content)?)
    }

    /// Loads `path` when given, otherwise falls back to built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// 替換環境變數 (例如 ${JP_BASE_URL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| LookupError::ConfigError {
            message: format!("bad substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Where the credential file lives: the configured path, or
    /// `<config_dir>/pg-lookup/credentials.toml`.
    pub fn credentials_path(&self) -> Result<PathBuf> {
        match &self.credentials.path {
            Some(path) => Ok(path.clone()),
            None => default_credentials_path(),
        }
    }
}

pub fn default_credentials_path() -> Result<PathBuf> {
    credentials_path_under(dirs::config_dir())
}

fn credentials_path_under(config_dir: Option<PathBuf>) -> Result<PathBuf> {
    config_dir
        .map(|dir| dir.join("pg-lookup").join("credentials.toml"))
        .ok_or_else(|| LookupError::MissingConfigError {
            field: "credentials.path".to_string(),
        })
}

impl ConfigProvider for LookupConfig {
    fn demographic_base_url(&self) -> &str {
        &self.demographic.base_url
    }

    fn demographic_timeout(&self) -> Duration {
        Duration::from_secs(
            self.demographic
                .timeout_seconds
                .unwrap_or(DEFAULT_TIMEOUT_SECONDS),
        )
    }

    fn model_base_url(&self) -> &str {
        &self.model.base_url
    }

    fn model_name(&self) -> &str {
        &self.model.model
    }

    fn max_tokens(&self) -> u32 {
        self.model.max_tokens
    }

    fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.model.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))
    }
}

impl Validate for LookupConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("demographic.base_url", &self.demographic.base_url)?;
        validation::validate_url("model.base_url", &self.model.base_url)?;
        validation::validate_non_empty_string("model.model", &self.model.model)?;
        validation::validate_positive_number("model.max_tokens", u64::from(self.model.max_tokens), 1)?;

        if let Some(timeout) = self.demographic.timeout_seconds {
            validation::validate_positive_number("demographic.timeout_seconds", timeout, 1)?;
        }
        if let Some(timeout) = self.model.timeout_seconds {
            validation::validate_positive_number("model.timeout_seconds", timeout, 1)?;
        }

        for (name, code) in &self.countries {
            validation::validate_non_empty_string("countries", name)?;
            validation::validate_country_code(&format!("countries.{}", name), code.trim())?;
        }

        Ok(())
    }
}
