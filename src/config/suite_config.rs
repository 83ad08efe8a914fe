use crate::core::audit::Aggregate;
use crate::core::checks::Check;
use crate::domain::model::{AuthMode, HttpMethod};
use crate::utils::error::{Result, SmokeError};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_range, validate_relative_endpoint,
    validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::sync::LazyLock;

/// 編譯進執行檔的預設測試套件
const BUNDLED_SUITE: &str = include_str!("../../configs/nuestra-carne.toml");

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteConfig {
    pub suite: SuiteInfo,
    #[serde(default)]
    pub cases: Vec<CaseDefinition>,
    #[serde(default)]
    pub audits: Vec<AuditDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteInfo {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub base_url: Option<String>,
    #[serde(default)]
    pub variables: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseDefinition {
    pub name: String,
    pub title: String,
    #[serde(default = "default_section")]
    pub section: String,
    #[serde(default)]
    pub method: HttpMethod,
    pub endpoint: String,
    #[serde(default = "default_expected_status")]
    pub expected_status: u16,
    #[serde(default)]
    pub auth: AuthMode,
    pub token_var: Option<String>,
    pub body: Option<serde_json::Value>,
    #[serde(default)]
    pub requires: Vec<String>,
    #[serde(default)]
    pub requires_vars: Vec<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub capture: BTreeMap<String, String>, // 變數名稱 -> 路徑表達式
    #[serde(default)]
    pub checks: Vec<CheckDefinition>,
    #[serde(default)]
    pub describe: Vec<String>,
    pub tolerate: Option<ToleranceDefinition>,
}

/// 另一種可接受的結果，例如郵件服務不可用時的 503
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToleranceDefinition {
    pub status: Option<u16>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckDefinition {
    pub path: String,
    pub equals: Option<serde_json::Value>,
    pub approx: Option<f64>,
    pub tolerance: Option<f64>,
    pub length: Option<usize>,
    pub min_length: Option<usize>,
    pub exists: Option<bool>,
    pub contains: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditDefinition {
    pub name: String,
    pub title: String,
    pub file: String,
    pub aggregate: String,
    pub compare_var: String,
    pub tolerance: Option<f64>,
    #[serde(default = "default_audit_section")]
    pub section: String,
}

fn default_section() -> String {
    "General".to_string()
}

fn default_audit_section() -> String {
    "Data files".to_string()
}

fn default_expected_status() -> u16 {
    200
}

fn default_enabled() -> bool {
    true
}

impl SuiteConfig {
    /// 從 TOML 檔案載入測試套件
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析測試套件
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| SmokeError::ConfigValidationError {
            field: "suite_toml_parsing".to_string(),
            message: format!("Suite TOML parsing error: {}", e),
        })
    }

    /// 內建的 Nuestra Carne 測試套件
    pub fn bundled() -> Result<Self> {
        Self::from_toml_str(BUNDLED_SUITE)
    }

    /// 替換 `${VAR}`；未定義的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// 驗證測試套件
    pub fn validate(&self) -> Result<()> {
        validate_non_empty_string("suite.name", &self.suite.name)?;

        if let Some(base_url) = &self.suite.base_url {
            validate_url("suite.base_url", base_url)?;
        }

        let mut seen: HashSet<&str> = HashSet::new();
        for case in &self.cases {
            self.validate_case(case, &seen)?;
            seen.insert(case.name.as_str());
        }

        for audit in &self.audits {
            if seen.contains(audit.name.as_str()) {
                return Err(SmokeError::ConfigValidationError {
                    field: format!("audits.{}", audit.name),
                    message: format!("Duplicate name '{}'", audit.name),
                });
            }
            self.validate_audit(audit)?;
            seen.insert(audit.name.as_str());
        }

        Ok(())
    }

    /// `seen` 只包含排在前面的案例，因此向後或自我參照都會被擋下
    fn validate_case(&self, case: &CaseDefinition, seen: &HashSet<&str>) -> Result<()> {
        let field = format!("cases.{}", case.name);

        validate_non_empty_string(&format!("{}.name", field), &case.name)?;
        if seen.contains(case.name.as_str()) {
            return Err(SmokeError::ConfigValidationError {
                field,
                message: format!("Duplicate case name '{}'", case.name),
            });
        }

        validate_relative_endpoint(&format!("{}.endpoint", field), &case.endpoint)?;
        validate_range(
            &format!("{}.expected_status", field),
            case.expected_status,
            100,
            599,
        )?;

        for dep in &case.requires {
            if !seen.contains(dep.as_str()) {
                return Err(SmokeError::ConfigValidationError {
                    field: format!("{}.requires", field),
                    message: format!("'{}' must name an earlier case", dep),
                });
            }
        }

        if matches!(case.auth, AuthMode::Bearer) && case.token_var.is_none() {
            return Err(SmokeError::ConfigValidationError {
                field: format!("{}.token_var", field),
                message: "Bearer auth needs a token_var".to_string(),
            });
        }

        for check in &case.checks {
            Check::from_definition(check).map_err(|e| match e {
                SmokeError::ConfigValidationError { message, .. } => {
                    SmokeError::ConfigValidationError {
                        field: format!("{}.checks.{}", field, check.path),
                        message,
                    }
                }
                other => other,
            })?;
        }

        if let Some(tolerate) = &case.tolerate {
            if tolerate.status.is_none() && tolerate.error.is_none() {
                return Err(SmokeError::ConfigValidationError {
                    field: format!("{}.tolerate", field),
                    message: "Set at least one of status or error".to_string(),
                });
            }
            if let Some(status) = tolerate.status {
                validate_range(&format!("{}.tolerate.status", field), status, 100, 599)?;
            }
        }

        Ok(())
    }

    fn validate_audit(&self, audit: &AuditDefinition) -> Result<()> {
        let field = format!("audits.{}", audit.name);

        validate_non_empty_string(&format!("{}.name", field), &audit.name)?;
        validate_path(&format!("{}.file", field), &audit.file)?;
        validate_non_empty_string(&format!("{}.compare_var", field), &audit.compare_var)?;

        audit
            .aggregate
            .parse::<Aggregate>()
            .map_err(|message| SmokeError::ConfigValidationError {
                field: format!("{}.aggregate", field),
                message,
            })?;

        Ok(())
    }

    /// 取得指定名稱的案例定義
    pub fn get_case(&self, name: &str) -> Option<&CaseDefinition> {
        self.cases.iter().find(|c| c.name == name)
    }

    /// 依執行順序列出啟用的案例
    pub fn enabled_cases(&self) -> Vec<&CaseDefinition> {
        self.cases.iter().filter(|c| c.enabled).collect()
    }
}

impl Validate for SuiteConfig {
    fn validate(&self) -> Result<()> {
        self.validate()
    }
}
