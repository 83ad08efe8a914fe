use crate::config::suite_config::CheckDefinition;
use crate::core::path::{resolve, scalar_to_string, value_len};
use crate::utils::error::{Result, SmokeError};
use serde_json::Value;

/// 金額比較的預設容許誤差
pub const DEFAULT_MONEY_TOLERANCE: f64 = 0.005;

#[derive(Debug, Clone, PartialEq)]
pub enum Check {
    Equals { path: String, expected: Value },
    Approx { path: String, expected: f64, tolerance: f64 },
    Length { path: String, expected: usize },
    MinLength { path: String, min: usize },
    Exists { path: String, present: bool },
    Contains { path: String, needle: String },
}

impl Check {
    /// 每個 check 只能有一個斷言
    pub fn from_definition(definition: &CheckDefinition) -> Result<Self> {
        let path = definition.path.clone();
        let mut candidates = Vec::new();

        if let Some(expected) = &definition.equals {
            candidates.push(Check::Equals {
                path: path.clone(),
                expected: expected.clone(),
            });
        }
        if let Some(expected) = definition.approx {
            candidates.push(Check::Approx {
                path: path.clone(),
                expected,
                tolerance: definition.tolerance.unwrap_or(DEFAULT_MONEY_TOLERANCE),
            });
        }
        if let Some(expected) = definition.length {
            candidates.push(Check::Length {
                path: path.clone(),
                expected,
            });
        }
        if let Some(min) = definition.min_length {
            candidates.push(Check::MinLength {
                path: path.clone(),
                min,
            });
        }
        if let Some(present) = definition.exists {
            candidates.push(Check::Exists {
                path: path.clone(),
                present,
            });
        }
        if let Some(needle) = &definition.contains {
            candidates.push(Check::Contains {
                path: path.clone(),
                needle: needle.clone(),
            });
        }

        if candidates.len() != 1 {
            return Err(SmokeError::ConfigValidationError {
                field: format!("checks.{}", definition.path),
                message: format!(
                    "Expected exactly one assertion (equals, approx, length, min_length, exists, contains), found {}",
                    candidates.len()
                ),
            });
        }

        Ok(candidates.remove(0))
    }

    pub fn path(&self) -> &str {
        match self {
            Check::Equals { path, .. }
            | Check::Approx { path, .. }
            | Check::Length { path, .. }
            | Check::MinLength { path, .. }
            | Check::Exists { path, .. }
            | Check::Contains { path, .. } => path,
        }
    }

    /// 失敗時回傳可讀的訊息
    pub fn evaluate(&self, body: &Value) -> std::result::Result<(), String> {
        let actual = resolve(body, self.path());

        match self {
            Check::Exists { path, present } => match (actual.is_some(), *present) {
                (true, true) | (false, false) => Ok(()),
                (false, true) => Err(format!("{} is missing", path)),
                (true, false) => Err(format!("{} should be absent", path)),
            },
            Check::Equals { path, expected } => {
                let actual = actual.ok_or_else(|| format!("{} is missing", path))?;
                if json_equals(actual, expected) {
                    Ok(())
                } else {
                    Err(format!("{} expected {}, got {}", path, expected, actual))
                }
            }
            Check::Approx {
                path,
                expected,
                tolerance,
            } => {
                let actual = actual.ok_or_else(|| format!("{} is missing", path))?;
                let number = actual
                    .as_f64()
                    .ok_or_else(|| format!("{} is not a number: {}", path, actual))?;
                if (number - expected).abs() <= *tolerance {
                    Ok(())
                } else {
                    Err(format!("{} expected {:.2}, got {}", path, expected, number))
                }
            }
            Check::Length { path, expected } => {
                let actual = actual.ok_or_else(|| format!("{} is missing", path))?;
                let len = value_len(actual).ok_or_else(|| format!("{} has no length", path))?;
                if len == *expected {
                    Ok(())
                } else {
                    Err(format!("{} expected {} entries, got {}", path, expected, len))
                }
            }
            Check::MinLength { path, min } => {
                let actual = actual.ok_or_else(|| format!("{} is missing", path))?;
                let len = value_len(actual).ok_or_else(|| format!("{} has no length", path))?;
                if len >= *min {
                    Ok(())
                } else {
                    Err(format!("{} expected at least {} entries, got {}", path, min, len))
                }
            }
            Check::Contains { path, needle } => {
                let actual = actual.ok_or_else(|| format!("{} is missing", path))?;
                let text = scalar_to_string(actual);
                if text.contains(needle.as_str()) {
                    Ok(())
                } else {
                    Err(format!("{} does not contain '{}'", path, needle))
                }
            }
        }
    }
}

/// 數字以數值比較（`72.7` 等於 `72.70`）
fn json_equals(actual: &Value, expected: &Value) -> bool {
    match (actual.as_f64(), expected.as_f64()) {
        (Some(a), Some(b)) if actual.is_number() && expected.is_number() => a == b,
        _ => actual == expected,
    }
}

/// 執行全部 check，回傳所有失敗訊息
pub fn run_checks(checks: &[Check], body: &Value) -> Vec<String> {
    checks
        .iter()
        .filter_map(|check| check.evaluate(body).err())
        .collect()
}
