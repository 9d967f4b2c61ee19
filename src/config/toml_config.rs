use crate::config::credentials::Credentials;
use crate::core::trigger::TriggerConfig;
use crate::utils::error::{AfterShipError, Result};
use crate::utils::validation::{validate_required_field, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeConfig {
    pub credentials: Option<Credentials>,
    #[serde(default)]
    pub execution: ExecutionConfig,
    pub trigger: Option<TriggerConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionConfig {
    #[serde(default)]
    pub continue_on_fail: bool,
    pub timeout_seconds: Option<u64>,
}

impl NodeConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AfterShipError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AfterShipError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${AFTERSHIP_API_KEY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AfterShipError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn credentials(&self) -> Result<&Credentials> {
        validate_required_field("credentials", &self.credentials)
    }

    pub fn trigger(&self) -> TriggerConfig {
        self.trigger.clone().unwrap_or_default()
    }
}

impl Validate for NodeConfig {
    fn validate(&self) -> Result<()> {
        if let Some(credentials) = &self.credentials {
            credentials.validate()?;
        }
        if self.execution.timeout_seconds == Some(0) {
            return Err(AfterShipError::InvalidConfigValueError {
                field: "execution.timeout_seconds".to_string(),
                value: "0".to_string(),
                reason: "Timeout must be at least 1 second".to_string(),
            });
        }
        Ok(())
    }
}
