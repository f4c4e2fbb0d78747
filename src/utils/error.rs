use thiserror::Error;

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("{service} API key not set.")]
    AuthError { service: String },

    #[error("{service} API error {status}: {message}")]
    UpstreamError {
        service: String,
        status: u16,
        message: String,
    },

    #[error("No people groups found in Joshua Project matching that search. Try a shorter or different name.")]
    EmptyResultError { reported_name: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("HTTP request failed: {0}")]
    HttpError(reqwest::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV output error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("TOML parsing error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlWriteError(#[from] toml::ser::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

/// The demographic API takes its key in the query string, so the request URL
/// is dropped before the error can reach a log line.
impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        Self::HttpError(err.without_url())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Credentials,
    Upstream,
    NoMatch,
    Input,
    Network,
    Local,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl LookupError {
    pub fn auth(service: &str) -> Self {
        Self::AuthError {
            service: service.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::AuthError { .. } => ErrorCategory::Credentials,
            Self::UpstreamError { .. } => ErrorCategory::Upstream,
            Self::EmptyResultError { .. } => ErrorCategory::NoMatch,
            Self::ValidationError { .. } => ErrorCategory::Input,
            Self::HttpError(_) | Self::UrlError(_) => ErrorCategory::Network,
            Self::IoError(_) | Self::SerializationError(_) | Self::CsvError(_) => {
                ErrorCategory::Local
            }
            Self::TomlParseError(_)
            | Self::TomlWriteError(_)
            | Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::NoMatch => ErrorSeverity::Low,
            ErrorCategory::Upstream | ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Credentials | ErrorCategory::Input | ErrorCategory::Configuration => {
                ErrorSeverity::High
            }
            ErrorCategory::Local => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::AuthError { .. } => {
                "Run `pg-lookup keys set --jp-key <KEY> --anthropic-key <KEY>` first".to_string()
            }
            Self::UpstreamError { status, .. } if *status == 401 || *status == 403 => {
                "The API rejected the key; run `pg-lookup keys clear` and set it again".to_string()
            }
            Self::UpstreamError { status, .. } if *status == 429 => {
                "Rate limited; wait a moment and submit the search again".to_string()
            }
            Self::UpstreamError { .. } | Self::HttpError(_) => {
                "Check your network connection and submit the search again".to_string()
            }
            Self::EmptyResultError { .. } => {
                "Try a shorter or different name, or drop the country filter".to_string()
            }
            Self::ValidationError { .. } => "Check the search input and try again".to_string(),
            Self::UrlError(_) | Self::InvalidConfigValueError { .. } => {
                "Fix the offending value in the configuration file".to_string()
            }
            Self::TomlParseError(_) | Self::TomlWriteError(_) => {
                "Make sure the configuration file is valid TOML".to_string()
            }
            Self::MissingConfigError { field } => {
                format!("Set `{}` in the configuration file or pass it on the command line", field)
            }
            Self::ConfigError { .. } => {
                "Review the configuration file and command-line flags".to_string()
            }
            Self::IoError(_) | Self::SerializationError(_) | Self::CsvError(_) => {
                "Check file permissions and available disk space".to_string()
            }
        }
    }

    /// Short message for the terminal; the `Display` text already reads well
    /// for the lookup-level failures.
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::HttpError(e) if e.is_timeout() => "The request timed out.".to_string(),
            Self::HttpError(e) if e.is_connect() => "Could not connect to the API.".to_string(),
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LookupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_error_message_carries_status_and_body() {
        let err = LookupError::UpstreamError {
            service: "Joshua Project".to_string(),
            status: 500,
            message: "internal failure".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Joshua Project API error 500: internal failure"
        );
        assert_eq!(err.category(), ErrorCategory::Upstream);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
    }

    #[test]
    fn test_auth_error_message() {
        let err = LookupError::auth("Anthropic");
        assert_eq!(err.to_string(), "Anthropic API key not set.");
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.recovery_suggestion().contains("keys set"));
    }

    #[test]
    fn test_empty_result_is_low_severity() {
        let err = LookupError::EmptyResultError {
            reported_name: "Zzz".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Low);
        assert!(err.user_friendly_message().starts_with("No people groups found"));
    }

    #[test]
    fn test_rejected_key_suggestion() {
        let err = LookupError::UpstreamError {
            service: "Anthropic".to_string(),
            status: 401,
            message: "invalid x-api-key".to_string(),
        };
        assert!(err.recovery_suggestion().contains("keys clear"));
    }
}
