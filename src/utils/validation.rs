use crate::utils::error::{Result, SmokeError};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(SmokeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(SmokeError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(SmokeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

/// 端點必須是相對於 base URL 的路徑
pub fn validate_relative_endpoint(field_name: &str, endpoint: &str) -> Result<()> {
    validate_non_empty_string(field_name, endpoint)?;

    if endpoint.contains("://") {
        return Err(SmokeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: endpoint.to_string(),
            reason: "Endpoint must be relative to the base URL".to_string(),
        });
    }

    if endpoint.contains(char::is_whitespace) {
        return Err(SmokeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: endpoint.to_string(),
            reason: "Endpoint cannot contain whitespace".to_string(),
        });
    }

    Ok(())
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(SmokeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(SmokeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(SmokeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SmokeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(SmokeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("base_url", "https://nuestracarnepa.com/api").is_ok());
        assert!(validate_url("base_url", "http://localhost:8001/api").is_ok());
        assert!(validate_url("base_url", "").is_err());
        assert!(validate_url("base_url", "invalid-url").is_err());
        assert!(validate_url("base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_relative_endpoint() {
        assert!(validate_relative_endpoint("endpoint", "products/retail").is_ok());
        assert!(validate_relative_endpoint("endpoint", "auth/profile/{user_id}").is_ok());
        assert!(validate_relative_endpoint("endpoint", "").is_err());
        assert!(validate_relative_endpoint("endpoint", "http://other/api").is_err());
        assert!(validate_relative_endpoint("endpoint", "orders/ submit").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("expected_status", 200u16, 100, 599).is_ok());
        assert!(validate_range("expected_status", 42u16, 100, 599).is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("timeout_seconds", 5, 1).is_ok());
        assert!(validate_positive_number("timeout_seconds", 0, 1).is_err());
    }
}
