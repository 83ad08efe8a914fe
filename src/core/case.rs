use crate::config::storage::LocalStorage;
use crate::config::suite_config::{CaseDefinition, SuiteConfig};
use crate::core::audit::DataFileAudit;
use crate::core::checks::{run_checks, Check};
use crate::core::client::ApiClient;
use crate::core::path::{evaluate, scalar_to_string};
use crate::core::runner::{SmokeCase, SuiteContext};
use crate::core::template::{describe, render_endpoint, render_json};
use crate::domain::model::{ApiResponse, CaseVerdict};
use crate::utils::error::{Result, SmokeError};

/// 由套件設定產生的 HTTP 測試案例
pub struct ConfiguredCase {
    definition: CaseDefinition,
    checks: Vec<Check>,
}

impl ConfiguredCase {
    pub fn new(definition: CaseDefinition) -> Result<Self> {
        let checks = definition
            .checks
            .iter()
            .map(Check::from_definition)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { definition, checks })
    }

    pub fn definition(&self) -> &CaseDefinition {
        &self.definition
    }

    fn is_tolerated(&self, response: &ApiResponse) -> bool {
        let Some(tolerate) = &self.definition.tolerate else {
            return false;
        };

        let status_ok = tolerate.status.is_none_or(|s| s == response.status);
        let error_ok = tolerate
            .error
            .as_deref()
            .is_none_or(|e| response.error_message() == Some(e));
        status_ok && error_ok
    }

    fn on_expected_status(&self, response: &ApiResponse) -> CaseVerdict {
        let failures = run_checks(&self.checks, &response.body);
        if !failures.is_empty() {
            return CaseVerdict::failed(Some(response.status), failures.join("; "));
        }

        let mut verdict = CaseVerdict::passed(Some(response.status));

        for (var, expression) in &self.definition.capture {
            match evaluate(&response.body, expression) {
                Some(value) if !value.is_null() => {
                    verdict.captures.insert(var.clone(), scalar_to_string(&value));
                }
                _ => tracing::warn!(
                    "📌 {}: '{}' not found in response, {} stays unset",
                    self.definition.name,
                    expression,
                    var
                ),
            }
        }

        verdict.notes = self
            .definition
            .describe
            .iter()
            .map(|line| describe(line, &response.body))
            .collect();

        verdict
    }
}

#[async_trait::async_trait]
impl SmokeCase for ConfiguredCase {
    fn name(&self) -> &str {
        &self.definition.name
    }

    fn title(&self) -> &str {
        &self.definition.title
    }

    fn section(&self) -> &str {
        &self.definition.section
    }

    fn skip_reason(&self, context: &SuiteContext) -> Option<String> {
        if let Some(dep) = self.definition.requires.iter().find(|d| !context.has_passed(d)) {
            return Some(format!("requires '{}' to pass", dep));
        }
        self.definition
            .requires_vars
            .iter()
            .find(|v| context.get_var(v).is_none())
            .map(|v| format!("variable '{}' was not captured", v))
    }

    async fn run(&self, client: &ApiClient, context: &SuiteContext) -> Result<CaseVerdict> {
        let lookup = |name: &str| context.lookup(name);

        let endpoint = render_endpoint(&self.definition.endpoint, lookup)?;
        let body = match &self.definition.body {
            Some(body) if self.definition.method.carries_body() => {
                Some(render_json(body, &lookup)?)
            }
            _ => None,
        };

        let token = self
            .definition
            .token_var
            .as_deref()
            .and_then(|var| context.get_var(var));
        let authorization = client.auth_header(self.definition.auth, token);

        let response = client
            .send(
                self.definition.method,
                &endpoint,
                body.as_ref(),
                authorization.as_deref(),
            )
            .await?;

        if response.status == self.definition.expected_status {
            return Ok(self.on_expected_status(&response));
        }

        if self.is_tolerated(&response) {
            let mut verdict = CaseVerdict::passed(Some(response.status));
            verdict.notes.push(format!(
                "Tolerated {}: {}",
                response.status,
                response.error_message().unwrap_or("no error message")
            ));
            return Ok(verdict);
        }

        let mut verdict = CaseVerdict::failed(
            Some(response.status),
            format!(
                "Expected {}, got {}",
                self.definition.expected_status, response.status
            ),
        );
        verdict.notes.push(format!("Response: {}", response.text));
        Ok(verdict)
    }

    fn describe_plan(&self) -> String {
        format!(
            "{} {} -> {}",
            self.definition.method, self.definition.endpoint, self.definition.expected_status
        )
    }
}

/// `--only` / `--skip` 篩選
#[derive(Debug, Clone, Default)]
pub struct CaseFilter {
    pub only: Vec<String>,
    pub skip: Vec<String>,
}

impl CaseFilter {
    pub fn allows(&self, name: &str) -> bool {
        (self.only.is_empty() || self.only.iter().any(|n| n == name))
            && !self.skip.iter().any(|n| n == name)
    }

    /// 篩選條件中的名稱必須存在於套件內
    fn validate_names(&self, config: &SuiteConfig) -> Result<()> {
        for (field, names) in [("only", &self.only), ("skip", &self.skip)] {
            for name in names {
                let known = config.cases.iter().any(|c| &c.name == name)
                    || config.audits.iter().any(|a| &a.name == name);
                if !known {
                    return Err(SmokeError::InvalidConfigValueError {
                        field: field.to_string(),
                        value: name.clone(),
                        reason: "No case or audit with this name".to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// 依套件設定建立所有案例；稽核排在 HTTP 案例之後
pub fn build_cases(
    config: &SuiteConfig,
    data_dir: Option<&str>,
    filter: &CaseFilter,
) -> Result<Vec<Box<dyn SmokeCase>>> {
    filter.validate_names(config)?;

    let mut cases: Vec<Box<dyn SmokeCase>> = Vec::new();

    for definition in config.enabled_cases() {
        if !filter.allows(&definition.name) {
            tracing::debug!("Filtered out case: {}", definition.name);
            continue;
        }
        cases.push(Box::new(ConfiguredCase::new(definition.clone())?));
    }

    for definition in &config.audits {
        if !filter.allows(&definition.name) {
            tracing::debug!("Filtered out audit: {}", definition.name);
            continue;
        }
        let storage = data_dir.map(|dir| LocalStorage::new(dir.to_string()));
        cases.push(Box::new(DataFileAudit::new(definition.clone(), storage)?));
    }

    Ok(cases)
}
