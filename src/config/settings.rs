use crate::config::env_file::backend_url_from_env;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_url, Validate,
};
use std::collections::HashMap;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8001/api";

/// 合併命令列、套件與環境檔之後的執行設定
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub base_url: String,
    pub admin_username: String,
    pub admin_password: String,
    pub timeout_seconds: Option<u64>,
    pub data_dir: Option<String>,
    pub report_dir: Option<String>,
}

/// 依序採用：命令列、套件 `base_url`、環境檔、預設值
pub fn resolve_base_url(
    cli_base_url: Option<&str>,
    suite_base_url: Option<&str>,
    env_vars: &HashMap<String, String>,
) -> String {
    let resolved = cli_base_url
        .map(str::to_string)
        .or_else(|| suite_base_url.map(str::to_string))
        .or_else(|| backend_url_from_env(env_vars))
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    resolved.trim_end_matches('/').to_string()
}

impl ConfigProvider for RunSettings {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn admin_username(&self) -> &str {
        &self.admin_username
    }

    fn admin_password(&self) -> &str {
        &self.admin_password
    }

    fn timeout_seconds(&self) -> Option<u64> {
        self.timeout_seconds
    }
}

impl Validate for RunSettings {
    fn validate(&self) -> Result<()> {
        validate_url("base_url", &self.base_url)?;
        validate_non_empty_string("admin_username", &self.admin_username)?;

        if let Some(timeout) = self.timeout_seconds {
            validate_positive_number("timeout_seconds", timeout, 1)?;
        }
        if let Some(dir) = &self.data_dir {
            validate_path("data_dir", dir)?;
        }
        if let Some(dir) = &self.report_dir {
            validate_path("report_dir", dir)?;
        }

        Ok(())
    }
}
