use thiserror::Error;

#[derive(Error, Debug)]
pub enum SmokeError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed at {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Unresolved placeholder {{{placeholder}}} in '{template}'")]
    TemplateError {
        template: String,
        placeholder: String,
    },

    #[error("Data file {file} is unusable: {message}")]
    DataFileError { file: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SmokeError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SmokeError::ApiError(_) => ErrorCategory::Network,
            SmokeError::ConfigError { .. }
            | SmokeError::MissingConfigError { .. }
            | SmokeError::InvalidConfigValueError { .. }
            | SmokeError::ConfigValidationError { .. }
            | SmokeError::TemplateError { .. } => ErrorCategory::Configuration,
            SmokeError::CsvError(_)
            | SmokeError::SerializationError(_)
            | SmokeError::DataFileError { .. } => ErrorCategory::Data,
            SmokeError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 給使用者的下一步建議
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SmokeError::ApiError(_) => {
                "Check that the backend is running and that the base URL (--base-url or REACT_APP_BACKEND_URL) is correct"
            }
            SmokeError::TemplateError { .. } => {
                "Define the variable under [suite.variables] or capture it from an earlier case"
            }
            SmokeError::DataFileError { .. } => {
                "Point --data-dir at the backend data directory containing the JSON files"
            }
            SmokeError::IoError(_) => "Check file paths and permissions",
            SmokeError::CsvError(_) | SmokeError::SerializationError(_) => {
                "Check that the report directory is writable and the data files contain valid JSON"
            }
            _ => "Review the suite file and command line arguments",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not reach the API: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Data => format!("Data problem: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, SmokeError>;
