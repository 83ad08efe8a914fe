//! Small path language used by checks, captures, describe lines and data audits.
//!
//! `products.0.nombre` walks objects and arrays, `requests[estado=pendiente].id` picks
//! the first array element whose field matches, and a `len:` prefix returns a length.

use serde_json::Value;
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Key(String),
    Filter { field: String, value: String },
}

/// 以 `.` 切分路徑，但忽略 `[...]` 內的 `.`
fn split_segments(path: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut filter = String::new();
    let mut depth = 0usize;

    let flush_key = |current: &mut String, segments: &mut Vec<Segment>| {
        if !current.is_empty() {
            segments.push(Segment::Key(std::mem::take(current)));
        }
    };

    for ch in path.chars() {
        match ch {
            '[' if depth == 0 => {
                flush_key(&mut current, &mut segments);
                depth = 1;
            }
            '[' => {
                depth += 1;
                filter.push(ch);
            }
            ']' if depth == 1 => {
                depth = 0;
                let raw = std::mem::take(&mut filter);
                match raw.split_once('=') {
                    Some((field, value)) => segments.push(Segment::Filter {
                        field: field.trim().to_string(),
                        value: value.trim().to_string(),
                    }),
                    None => segments.push(Segment::Key(raw.trim().to_string())),
                }
            }
            ']' if depth > 1 => {
                depth -= 1;
                filter.push(ch);
            }
            '.' if depth == 0 => flush_key(&mut current, &mut segments),
            _ if depth > 0 => filter.push(ch),
            _ => current.push(ch),
        }
    }
    flush_key(&mut current, &mut segments);

    segments
}

/// 依路徑取值；路徑為空時回傳整個 body
pub fn resolve<'a>(body: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = body;
    for segment in split_segments(path) {
        current = match segment {
            Segment::Key(key) => match current {
                Value::Object(map) => map.get(&key)?,
                Value::Array(items) => items.get(key.parse::<usize>().ok()?)?,
                _ => return None,
            },
            Segment::Filter { field, value } => current
                .as_array()?
                .iter()
                .find(|item| {
                    resolve(item, &field).map(scalar_to_string).as_deref()
                        == Some(value.as_str())
                })?,
        };
    }
    Some(current)
}

/// 支援 `len:` 前綴的取值
pub fn evaluate(body: &Value, expression: &str) -> Option<Value> {
    match expression.trim().strip_prefix("len:") {
        Some(path) => value_len(resolve(body, path.trim())?).map(|n| Value::from(n as u64)),
        None => resolve(body, expression.trim()).cloned(),
    }
}

pub fn value_len(value: &Value) -> Option<usize> {
    match value {
        Value::Array(items) => Some(items.len()),
        Value::Object(map) => Some(map.len()),
        Value::String(s) => Some(s.chars().count()),
        _ => None,
    }
}

/// 字串不加引號，其餘沿用 JSON 表示
pub fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
}

/// `precioLb>0` 這類的條件式
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub path: String,
    pub op: CompareOp,
    pub literal: String,
}

impl Predicate {
    pub fn parse(raw: &str) -> Option<Self> {
        const OPERATORS: [(&str, CompareOp); 6] = [
            (">=", CompareOp::Ge),
            ("<=", CompareOp::Le),
            ("!=", CompareOp::Ne),
            ("=", CompareOp::Eq),
            (">", CompareOp::Gt),
            ("<", CompareOp::Lt),
        ];

        let (position, token, op) = OPERATORS
            .iter()
            .filter_map(|(token, op)| raw.find(token).map(|pos| (pos, *token, *op)))
            .min_by(|a, b| a.0.cmp(&b.0).then(b.1.len().cmp(&a.1.len())))?;

        let path = raw[..position].trim();
        let literal = raw[position + token.len()..].trim();
        if path.is_empty() || literal.is_empty() {
            return None;
        }

        Some(Self {
            path: path.to_string(),
            op,
            literal: literal.to_string(),
        })
    }

    pub fn matches(&self, item: &Value) -> bool {
        let Some(value) = resolve(item, &self.path) else {
            return false;
        };

        let ordering = match (value.as_f64(), self.literal.parse::<f64>()) {
            (Some(actual), Ok(expected)) => actual.partial_cmp(&expected),
            _ => match self.op {
                CompareOp::Eq | CompareOp::Ne => {
                    Some(scalar_to_string(value).as_str().cmp(self.literal.as_str()))
                }
                _ => None,
            },
        };

        match (ordering, self.op) {
            (Some(o), CompareOp::Eq) => o == Ordering::Equal,
            (Some(o), CompareOp::Ne) => o != Ordering::Equal,
            (Some(o), CompareOp::Gt) => o == Ordering::Greater,
            (Some(o), CompareOp::Lt) => o == Ordering::Less,
            (Some(o), CompareOp::Ge) => o != Ordering::Less,
            (Some(o), CompareOp::Le) => o != Ordering::Greater,
            (None, _) => false,
        }
    }
}
