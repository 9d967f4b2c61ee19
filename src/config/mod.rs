#[cfg(feature = "cli")]
pub mod cli;
pub mod credentials;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::config::credentials::Credentials;
#[cfg(feature = "cli")]
use crate::config::toml_config::NodeConfig;
#[cfg(feature = "cli")]
use crate::core::constants::{DEFAULT_API_VERSION, DEFAULT_BASE_URL};
#[cfg(feature = "cli")]
use crate::utils::error::{AfterShipError, Result};
#[cfg(feature = "cli")]
use crate::utils::validation::Validate;
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "aftership")]
#[command(about = "Run AfterShip tracking, shipping and returns API operations")]
pub struct CliConfig {
    #[arg(long, help = "Resource, e.g. trackings, couriers, labels, returns")]
    pub resource: Option<String>,

    #[arg(long, help = "Operation on the resource, e.g. list, get, create")]
    pub operation: Option<String>,

    #[arg(long, help = "Parameters as a JSON object, or a JSON array of objects for several items")]
    pub params: Option<String>,

    #[arg(long, help = "File holding the parameters JSON")]
    pub items_file: Option<String>,

    #[arg(long, help = "Directory to write the JSON output into instead of stdout")]
    pub output_path: Option<String>,

    #[arg(long, help = "TOML configuration file")]
    pub config: Option<String>,

    #[arg(long, env = "AFTERSHIP_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "AFTERSHIP_API_VERSION")]
    pub api_version: Option<String>,

    #[arg(long, env = "AFTERSHIP_BASE_URL")]
    pub base_url: Option<String>,

    #[arg(long, help = "Emit an error record and keep going when an item fails")]
    pub continue_on_fail: bool,

    #[arg(long, help = "Only check that the API key is accepted")]
    pub test_credentials: bool,

    #[arg(long, help = "Log as JSON lines")]
    pub json_logs: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn load_file_config(&self) -> Result<NodeConfig> {
        match &self.config {
            Some(path) => {
                let config = NodeConfig::from_file(path)?;
                config.validate()?;
                Ok(config)
            }
            None => Ok(NodeConfig::default()),
        }
    }

    /// Flags and environment win over the config file.
    pub fn resolve_credentials(&self, file_config: &NodeConfig) -> Result<Credentials> {
        let from_file = file_config.credentials.as_ref();

        let api_key = self
            .api_key
            .clone()
            .or_else(|| from_file.map(|c| c.api_key.clone()))
            .ok_or_else(|| AfterShipError::MissingConfigError {
                field: "api_key (--api-key, AFTERSHIP_API_KEY or [credentials])".to_string(),
            })?;
        let api_version = self
            .api_version
            .clone()
            .or_else(|| from_file.map(|c| c.api_version.clone()))
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_string());
        let base_url = self
            .base_url
            .clone()
            .or_else(|| from_file.map(|c| c.base_url.clone()))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let credentials = Credentials::new(api_key, api_version, base_url);
        credentials.validate()?;
        Ok(credentials)
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if self.test_credentials {
            return Ok(());
        }
        if self.resource.is_none() {
            return Err(AfterShipError::MissingConfigError {
                field: "--resource".to_string(),
            });
        }
        if self.operation.is_none() {
            return Err(AfterShipError::MissingConfigError {
                field: "--operation".to_string(),
            });
        }
        if self.params.is_some() && self.items_file.is_some() {
            return Err(AfterShipError::ConfigError {
                message: "Use either --params or --items-file, not both".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliConfig {
        let mut argv = vec!["aftership"];
        argv.extend_from_slice(args);
        CliConfig::parse_from(argv)
    }

    #[test]
    fn test_requires_resource_and_operation() {
        assert!(parse(&["--resource", "trackings"]).validate().is_err());
        assert!(parse(&["--resource", "trackings", "--operation", "list"])
            .validate()
            .is_ok());
        assert!(parse(&["--test-credentials"]).validate().is_ok());
    }

    #[test]
    fn test_flags_override_file_credentials() {
        let file = NodeConfig::from_toml_str(
            "[credentials]\napi_key = \"file-key\"\napi_version = \"2024-07\"\n",
        )
        .unwrap();

        let cli = parse(&[
            "--resource",
            "couriers",
            "--operation",
            "list",
            "--api-key",
            "flag-key",
        ]);
        let credentials = cli.resolve_credentials(&file).unwrap();

        assert_eq!(credentials.api_key, "flag-key");
        assert_eq!(credentials.api_version, "2024-07");
    }
}
