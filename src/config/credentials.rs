use crate::core::constants::{DEFAULT_API_VERSION, DEFAULT_BASE_URL, SUPPORTED_API_VERSIONS};
use crate::domain::ports::CredentialsProvider;
use crate::utils::error::{AfterShipError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_url, Validate};
use serde::{Deserialize, Serialize};

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Credentials {
    pub fn new(
        api_key: impl Into<String>,
        api_version: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            api_version: api_version.into(),
            base_url: base_url.into(),
        }
    }

    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self::new(api_key, default_api_version(), default_base_url())
    }
}

// The API key never goes to the logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"***")
            .field("api_version", &self.api_version)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl CredentialsProvider for Credentials {
    fn api_key(&self) -> &str {
        &self.api_key
    }

    fn api_version(&self) -> &str {
        &self.api_version
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Validate for Credentials {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("credentials.api_key", &self.api_key)?;
        validate_url("credentials.base_url", &self.base_url)?;
        if !SUPPORTED_API_VERSIONS.contains(&self.api_version.as_str()) {
            return Err(AfterShipError::InvalidConfigValueError {
                field: "credentials.api_version".to_string(),
                value: self.api_version.clone(),
                reason: format!(
                    "Unsupported API version. Supported versions: {}",
                    SUPPORTED_API_VERSIONS.join(", ")
                ),
            });
        }
        Ok(())
    }
}
