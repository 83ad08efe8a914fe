use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    /// 只有 POST / PUT 會帶 JSON body
    pub fn carries_body(self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    #[default]
    None,
    /// `Bearer <token>`，使用者登入後取得
    Bearer,
    /// `Basic <base64(user:pass)>`，管理端點
    Basic,
    /// `Basic user:pass`，不經 base64 編碼
    RawBasic,
}

/// 單次 HTTP 呼叫的結果；非 JSON 的回應 body 視為 `{}`
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: serde_json::Value,
    pub text: String,
}

impl ApiResponse {
    pub fn new(status: u16, text: String) -> Self {
        let body = serde_json::from_str(&text)
            .unwrap_or_else(|_| serde_json::Value::Object(serde_json::Map::new()));
        Self { status, body, text }
    }

    /// 後端錯誤回應的 `error` 欄位
    pub fn error_message(&self) -> Option<&str> {
        self.body.get("error").and_then(|v| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseOutcome {
    Passed,
    Failed(String),
    Skipped(String),
}

impl CaseOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            CaseOutcome::Passed => "PASS",
            CaseOutcome::Failed(_) => "FAIL",
            CaseOutcome::Skipped(_) => "SKIP",
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, CaseOutcome::Passed)
    }

    /// Skipped 不計入已執行的測試數
    pub fn is_counted(&self) -> bool {
        !matches!(self, CaseOutcome::Skipped(_))
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            CaseOutcome::Passed => None,
            CaseOutcome::Failed(m) | CaseOutcome::Skipped(m) => Some(m),
        }
    }
}

/// 測試案例自己回報的判定，runner 再補上時間與名稱
#[derive(Debug, Clone)]
pub struct CaseVerdict {
    pub outcome: CaseOutcome,
    pub status: Option<u16>,
    pub captures: HashMap<String, String>,
    pub notes: Vec<String>,
}

impl CaseVerdict {
    pub fn passed(status: Option<u16>) -> Self {
        Self {
            outcome: CaseOutcome::Passed,
            status,
            captures: HashMap::new(),
            notes: Vec::new(),
        }
    }

    pub fn failed(status: Option<u16>, reason: impl Into<String>) -> Self {
        Self {
            outcome: CaseOutcome::Failed(reason.into()),
            status,
            captures: HashMap::new(),
            notes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseResult {
    pub name: String,
    pub title: String,
    pub section: String,
    #[serde(serialize_with = "serialize_outcome")]
    pub outcome: CaseOutcome,
    pub status: Option<u16>,
    #[serde(serialize_with = "serialize_duration_ms")]
    pub duration: Duration,
    pub notes: Vec<String>,
}

impl CaseResult {
    pub fn message(&self) -> &str {
        self.outcome.message().unwrap_or("")
    }
}

fn serialize_outcome<S: serde::Serializer>(
    outcome: &CaseOutcome,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(outcome.label())
}

fn serialize_duration_ms<S: serde::Serializer>(
    duration: &Duration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}
