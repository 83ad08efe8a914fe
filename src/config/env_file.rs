use crate::utils::error::Result;
use std::collections::HashMap;
use std::path::Path;

/// 前端 `.env` 內指向後端的變數，依序嘗試
const BACKEND_URL_KEYS: [&str; 2] = ["REACT_APP_BACKEND_URL", "BACKEND_URL"];

/// 讀取 `KEY=VALUE` 格式的環境檔；檔案不存在時回傳空的 map
pub fn load_env_file<P: AsRef<Path>>(path: P) -> Result<HashMap<String, String>> {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(parse_env(&content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("Env file {} not found, using defaults", path.display());
            Ok(HashMap::new())
        }
        Err(e) => Err(e.into()),
    }
}

pub fn parse_env(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let line = line.strip_prefix("export ").unwrap_or(line);
            let (key, value) = line.split_once('=')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), unquote(value.trim()).to_string()))
        })
        .collect()
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

/// 後端 URL 加上 `/api` 前綴
pub fn backend_url_from_env(vars: &HashMap<String, String>) -> Option<String> {
    BACKEND_URL_KEYS
        .iter()
        .filter_map(|key| vars.get(*key))
        .map(|url| url.trim())
        .find(|url| !url.is_empty())
        .map(|url| format!("{}/api", url.trim_end_matches('/')))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_env() {
        let content = r#"
# frontend settings
REACT_APP_BACKEND_URL="https://nuestracarnepa.com"
export WDS_SOCKET_PORT=443
EMPTY=
SINGLE='quoted value'
not a pair
"#;
        let vars = parse_env(content);
        assert_eq!(vars["REACT_APP_BACKEND_URL"], "https://nuestracarnepa.com");
        assert_eq!(vars["WDS_SOCKET_PORT"], "443");
        assert_eq!(vars["EMPTY"], "");
        assert_eq!(vars["SINGLE"], "quoted value");
        assert_eq!(vars.len(), 4);
    }

    #[test]
    fn test_backend_url_from_env() {
        let vars = parse_env("REACT_APP_BACKEND_URL=https://nuestracarnepa.com/\n");
        assert_eq!(
            backend_url_from_env(&vars).as_deref(),
            Some("https://nuestracarnepa.com/api")
        );

        let vars = parse_env("REACT_APP_BACKEND_URL=\nBACKEND_URL=http://localhost:8001\n");
        assert_eq!(
            backend_url_from_env(&vars).as_deref(),
            Some("http://localhost:8001/api")
        );

        assert_eq!(backend_url_from_env(&HashMap::new()), None);
    }

    #[test]
    fn test_load_env_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "REACT_APP_BACKEND_URL=http://127.0.0.1:8001").unwrap();
        let vars = load_env_file(file.path()).unwrap();
        assert_eq!(vars["REACT_APP_BACKEND_URL"], "http://127.0.0.1:8001");

        let missing = load_env_file("/definitely/not/here/.env").unwrap();
        assert!(missing.is_empty());
    }
}
