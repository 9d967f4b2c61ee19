use thiserror::Error;

#[derive(Error, Debug)]
pub enum AfterShipError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("{message}")]
    Api {
        status: u16,
        code: Option<i64>,
        message: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Missing required parameter: {name}")]
    MissingParameter { name: String },

    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Either trackingId or both slug and trackingNumber must be provided")]
    InvalidIdentifier,

    #[error("Operation '{operation}' is not supported for resource '{resource}'")]
    UnsupportedOperation { resource: String, operation: String },

    #[error("{message}")]
    NotFound { message: String },

    #[error("Export is not ready for download. Current status: {status}")]
    ExportNotReady { status: String },

    #[error("Webhook error: {message}")]
    WebhookError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Api,
    Configuration,
    Input,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AfterShipError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AfterShipError::HttpError(_) => ErrorCategory::Network,
            AfterShipError::Api { .. } => ErrorCategory::Api,
            AfterShipError::ConfigError { .. }
            | AfterShipError::InvalidConfigValueError { .. }
            | AfterShipError::MissingConfigError { .. } => ErrorCategory::Configuration,
            AfterShipError::MissingParameter { .. }
            | AfterShipError::InvalidParameter { .. }
            | AfterShipError::InvalidIdentifier
            | AfterShipError::UnsupportedOperation { .. } => ErrorCategory::Input,
            AfterShipError::NotFound { .. }
            | AfterShipError::ExportNotReady { .. }
            | AfterShipError::SerializationError(_)
            | AfterShipError::WebhookError { .. } => ErrorCategory::Data,
            AfterShipError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AfterShipError::ExportNotReady { .. } => ErrorSeverity::Low,
            AfterShipError::HttpError(_) => ErrorSeverity::Medium,
            AfterShipError::Api { status, .. } if *status == 429 || *status >= 500 => {
                ErrorSeverity::Medium
            }
            AfterShipError::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    /// Whether retrying the same request later could succeed.
    pub fn is_retryable(&self) -> bool {
        self.severity() == ErrorSeverity::Medium
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            AfterShipError::HttpError(e) if e.is_timeout() => {
                "The AfterShip API did not respond in time".to_string()
            }
            AfterShipError::HttpError(_) => "Could not reach the AfterShip API".to_string(),
            AfterShipError::Api { status: 401, .. } => {
                "AfterShip rejected the API key".to_string()
            }
            AfterShipError::Api { status, message, .. } => {
                format!("AfterShip API returned {}: {}", status, message)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check network connectivity and the configured base URL",
            ErrorCategory::Api => match self {
                AfterShipError::Api { status: 401, .. } | AfterShipError::Api { status: 403, .. } => {
                    "Verify the as-api-key value and its permissions in the AfterShip dashboard"
                }
                AfterShipError::Api { status: 429, .. } => {
                    "Rate limit reached, wait before sending more requests"
                }
                _ => "Inspect the request parameters against the AfterShip API reference",
            },
            ErrorCategory::Configuration => "Fix the configuration file or command-line flags",
            ErrorCategory::Input => "Check the resource, operation and parameters supplied",
            ErrorCategory::Data => "Check the referenced object exists and is in the expected state",
            ErrorCategory::System => "Check file paths and permissions",
        }
    }
}

pub type Result<T> = std::result::Result<T, AfterShipError>;
