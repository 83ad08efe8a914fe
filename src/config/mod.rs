pub mod env_file;
pub mod settings;
pub mod storage;
pub mod suite_config;

use crate::core::case::CaseFilter;
use crate::utils::error::{Result, SmokeError};
use crate::utils::validation::{validate_path, validate_positive_number, validate_url, Validate};
use settings::{resolve_base_url, RunSettings};
use std::collections::HashMap;

#[cfg(feature = "cli")]
use clap::Parser;

#[derive(Debug, Clone)]
#[cfg_attr(feature = "cli", derive(Parser))]
#[cfg_attr(feature = "cli", command(name = "nuestra-carne-smoke"))]
#[cfg_attr(
    feature = "cli",
    command(about = "Smoke tests for the Nuestra Carne REST API")
)]
pub struct CliConfig {
    /// API base URL, e.g. http://localhost:8001/api
    #[cfg_attr(feature = "cli", arg(long))]
    pub base_url: Option<String>,

    #[cfg_attr(feature = "cli", arg(long, default_value = "frontend/.env"))]
    pub env_file: String,

    /// Suite TOML file; the bundled suite is used when omitted
    #[cfg_attr(feature = "cli", arg(long))]
    pub suite: Option<String>,

    #[cfg_attr(feature = "cli", arg(long, default_value = "admin"))]
    pub admin_username: String,

    #[cfg_attr(feature = "cli", arg(long, default_value = "nuestra123"))]
    pub admin_password: String,

    /// Backend data directory holding products.json / orders.json
    #[cfg_attr(feature = "cli", arg(long))]
    pub data_dir: Option<String>,

    /// Write smoke_results.csv and smoke_results.json here
    #[cfg_attr(feature = "cli", arg(long))]
    pub report_dir: Option<String>,

    #[cfg_attr(feature = "cli", arg(long))]
    pub timeout_seconds: Option<u64>,

    #[cfg_attr(feature = "cli", arg(long, value_delimiter = ','))]
    pub only: Vec<String>,

    #[cfg_attr(feature = "cli", arg(long, value_delimiter = ','))]
    pub skip: Vec<String>,

    #[cfg_attr(feature = "cli", arg(long, help = "List the cases without sending requests"))]
    pub dry_run: bool,

    #[cfg_attr(feature = "cli", arg(long, help = "Enable verbose output"))]
    pub verbose: bool,

    #[cfg_attr(feature = "cli", arg(long, help = "Emit logs as JSON on stderr"))]
    pub json_logs: bool,
}

impl CliConfig {
    /// 合併套件設定與環境檔，產生最終的執行設定
    pub fn to_settings(
        &self,
        suite_base_url: Option<&str>,
        env_vars: &HashMap<String, String>,
    ) -> RunSettings {
        RunSettings {
            base_url: resolve_base_url(self.base_url.as_deref(), suite_base_url, env_vars),
            admin_username: self.admin_username.clone(),
            admin_password: self.admin_password.clone(),
            timeout_seconds: self.timeout_seconds,
            data_dir: self.data_dir.clone(),
            report_dir: self.report_dir.clone(),
        }
    }

    pub fn case_filter(&self) -> CaseFilter {
        CaseFilter {
            only: self.only.clone(),
            skip: self.skip.clone(),
        }
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(base_url) = &self.base_url {
            validate_url("base_url", base_url)?;
        }
        validate_path("env_file", &self.env_file)?;
        if let Some(suite) = &self.suite {
            validate_path("suite", suite)?;
        }
        if let Some(timeout) = self.timeout_seconds {
            validate_positive_number("timeout_seconds", timeout, 1)?;
        }

        if let Some(name) = self.only.iter().find(|name| self.skip.contains(name)) {
            return Err(SmokeError::InvalidConfigValueError {
                field: "only".to_string(),
                value: name.clone(),
                reason: "Case is listed in both --only and --skip".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let config = CliConfig::parse_from(["nuestra-carne-smoke"]);
        assert_eq!(config.env_file, "frontend/.env");
        assert_eq!(config.admin_username, "admin");
        assert_eq!(config.admin_password, "nuestra123");
        assert!(config.base_url.is_none());
        assert!(config.only.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_lists_and_settings() {
        let config = CliConfig::parse_from([
            "nuestra-carne-smoke",
            "--base-url",
            "http://127.0.0.1:8001/api/",
            "--only",
            "health,orders_stats",
            "--timeout-seconds",
            "15",
        ]);
        assert_eq!(config.only, vec!["health", "orders_stats"]);

        let settings = config.to_settings(Some("http://suite/api"), &HashMap::new());
        assert_eq!(settings.base_url, "http://127.0.0.1:8001/api");
        assert_eq!(settings.timeout_seconds, Some(15));
    }

    #[test]
    fn test_cli_validation() {
        let config = CliConfig::parse_from([
            "nuestra-carne-smoke",
            "--only",
            "health",
            "--skip",
            "health",
        ]);
        assert!(config.validate().is_err());

        let config = CliConfig::parse_from(["nuestra-carne-smoke", "--timeout-seconds", "0"]);
        assert!(config.validate().is_err());

        let config = CliConfig::parse_from(["nuestra-carne-smoke", "--base-url", "not a url"]);
        assert!(config.validate().is_err());
    }
}
