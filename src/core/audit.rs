use crate::config::suite_config::AuditDefinition;
use crate::core::checks::DEFAULT_MONEY_TOLERANCE;
use crate::core::client::ApiClient;
use crate::core::path::{resolve, Predicate};
use crate::core::runner::{SmokeCase, SuiteContext};
use crate::domain::model::CaseVerdict;
use crate::domain::ports::Storage;
use crate::utils::error::{Result, SmokeError};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// 對資料檔內陣列的彙總方式
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregate {
    Count,
    CountWhere(Predicate),
    Sum(String),
}

impl FromStr for Aggregate {
    type Err = String;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        let raw = raw.trim();
        if raw == "count" {
            return Ok(Aggregate::Count);
        }
        if let Some(condition) = raw.strip_prefix("count_where:") {
            return Predicate::parse(condition)
                .map(Aggregate::CountWhere)
                .ok_or_else(|| format!("Invalid condition '{}'", condition));
        }
        if let Some(path) = raw.strip_prefix("sum:") {
            if path.trim().is_empty() {
                return Err("sum: needs a field path".to_string());
            }
            return Ok(Aggregate::Sum(path.trim().to_string()));
        }
        Err(format!(
            "Unknown aggregate '{}' (expected count, count_where:<cond> or sum:<path>)",
            raw
        ))
    }
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Aggregate::Count => write!(f, "count"),
            Aggregate::CountWhere(p) => write!(f, "count of {}", p.path),
            Aggregate::Sum(path) => write!(f, "sum of {}", path),
        }
    }
}

impl Aggregate {
    /// 非數值的欄位在加總時略過
    pub fn apply(&self, items: &[Value]) -> f64 {
        match self {
            Aggregate::Count => items.len() as f64,
            Aggregate::CountWhere(predicate) => {
                items.iter().filter(|item| predicate.matches(item)).count() as f64
            }
            Aggregate::Sum(path) => items
                .iter()
                .filter_map(|item| resolve(item, path).and_then(Value::as_f64))
                .sum(),
        }
    }
}

/// 將 API 回報的數字與後端 `data/` 目錄下的 JSON 檔比對
pub struct DataFileAudit<S: Storage> {
    definition: AuditDefinition,
    aggregate: Aggregate,
    storage: Option<S>,
}

impl<S: Storage> DataFileAudit<S> {
    pub fn new(definition: AuditDefinition, storage: Option<S>) -> Result<Self> {
        let aggregate = definition.aggregate.parse::<Aggregate>().map_err(|message| {
            SmokeError::ConfigValidationError {
                field: format!("audits.{}.aggregate", definition.name),
                message,
            }
        })?;

        Ok(Self {
            definition,
            aggregate,
            storage,
        })
    }

    /// 檔案不存在時視為空陣列，與後端讀檔行為一致
    async fn load_items(&self, storage: &S) -> Result<Vec<Value>> {
        let bytes = match storage.read_file(&self.definition.file).await {
            Ok(bytes) => bytes,
            Err(SmokeError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    "📂 {}: {} not found, treating as empty",
                    self.definition.name,
                    self.definition.file
                );
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let value: Value =
            serde_json::from_slice(&bytes).map_err(|e| SmokeError::DataFileError {
                file: self.definition.file.clone(),
                message: format!("invalid JSON: {}", e),
            })?;

        match value {
            Value::Array(items) => Ok(items),
            other => Err(SmokeError::DataFileError {
                file: self.definition.file.clone(),
                message: format!("expected a JSON array, found {}", json_kind(&other)),
            }),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[async_trait::async_trait]
impl<S: Storage + 'static> SmokeCase for DataFileAudit<S> {
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
        if self.storage.is_none() {
            return Some("no data directory configured".to_string());
        }
        if context.get_var(&self.definition.compare_var).is_none() {
            return Some(format!(
                "variable '{}' was not captured",
                self.definition.compare_var
            ));
        }
        None
    }

    async fn run(&self, _client: &ApiClient, context: &SuiteContext) -> Result<CaseVerdict> {
        let Some(storage) = &self.storage else {
            return Ok(CaseVerdict::failed(None, "no data directory configured"));
        };

        let raw = context
            .get_var(&self.definition.compare_var)
            .unwrap_or_default();
        let Ok(reported) = raw.parse::<f64>() else {
            return Ok(CaseVerdict::failed(
                None,
                format!(
                    "variable '{}' is not numeric: '{}'",
                    self.definition.compare_var, raw
                ),
            ));
        };

        let items = self.load_items(storage).await?;
        let actual = self.aggregate.apply(&items);
        let tolerance = self.definition.tolerance.unwrap_or(DEFAULT_MONEY_TOLERANCE);

        tracing::debug!(
            "📂 {}: {} of {} = {} (API reported {})",
            self.definition.name,
            self.aggregate,
            self.definition.file,
            actual,
            reported
        );

        if (actual - reported).abs() <= tolerance {
            let mut verdict = CaseVerdict::passed(None);
            verdict.notes.push(format!(
                "{}: {} = {} matches API",
                self.definition.file, self.aggregate, actual
            ));
            Ok(verdict)
        } else {
            Ok(CaseVerdict::failed(
                None,
                format!(
                    "{}: {} = {}, API reported {}",
                    self.definition.file, self.aggregate, actual, reported
                ),
            ))
        }
    }

    fn describe_plan(&self) -> String {
        format!(
            "AUDIT {} ({}) vs {{{}}}",
            self.definition.file, self.aggregate, self.definition.compare_var
        )
    }
}
