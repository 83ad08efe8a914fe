use crate::core::calendar::week_range;
use crate::core::path::{evaluate, scalar_to_string};
use crate::utils::error::{Result, SmokeError};
use chrono::NaiveDateTime;
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::LazyLock;
use url::Url;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is valid")
});

static BODY_EXPRESSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}]+)\}").expect("expression pattern is valid"));

/// 執行開始時就固定下來的內建變數，確保同一次執行內的 email 一致
pub fn builtin_variables(now: NaiveDateTime) -> HashMap<String, String> {
    let week = week_range(now.date());
    HashMap::from([
        ("timestamp".to_string(), now.format("%Y%m%d%H%M%S").to_string()),
        ("now".to_string(), now.format("%Y-%m-%d %H:%M:%S").to_string()),
        ("today".to_string(), now.format("%Y-%m-%d").to_string()),
        (
            "week_start".to_string(),
            week.start_date().format("%Y-%m-%d").to_string(),
        ),
        ("week_report_id".to_string(), week.report_id()),
    ])
}

/// 替換 `{name}` 佔位符；任何一個查不到就整體失敗
pub fn render<F>(template: &str, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(missing) = PLACEHOLDER
        .captures_iter(template)
        .map(|caps| caps[1].to_string())
        .find(|name| lookup(name).is_none())
    {
        return Err(SmokeError::TemplateError {
            template: template.to_string(),
            placeholder: missing,
        });
    }

    Ok(PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            lookup(&caps[1]).unwrap_or_default()
        })
        .into_owned())
}

/// 用於 endpoint：每個替換值都當成單一路徑片段編碼
pub fn render_endpoint<F>(template: &str, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    render(template, |name| lookup(name).map(|value| encode_path_segment(&value)))
}

/// `/`、`?`、`#`、空白等字元會被百分比編碼
pub fn encode_path_segment(value: &str) -> String {
    let Ok(mut url) = Url::parse("http://localhost/") else {
        return value.to_string();
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.clear().push(value);
    }
    url.path().trim_start_matches('/').to_string()
}

/// 對 JSON 內所有字串葉節點套用 `render`
pub fn render_json<F>(value: &Value, lookup: &F) -> Result<Value>
where
    F: Fn(&str) -> Option<String>,
{
    Ok(match value {
        Value::String(s) => Value::String(render(s, lookup)?),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| render_json(item, lookup))
                .collect::<Result<Vec<_>>>()?,
        ),
        Value::Object(map) => {
            let mut rendered = serde_json::Map::with_capacity(map.len());
            for (key, item) in map {
                rendered.insert(key.clone(), render_json(item, lookup)?);
            }
            Value::Object(rendered)
        }
        other => other.clone(),
    })
}

/// 成功後的描述行，`{products.0.nombre}`、`{len:products}` 對 response body 取值
pub fn describe(line: &str, body: &Value) -> String {
    BODY_EXPRESSION
        .replace_all(line, |caps: &Captures| {
            evaluate(body, &caps[1])
                .map(|value| scalar_to_string(&value))
                .unwrap_or_else(|| "?".to_string())
        })
        .into_owned()
}
