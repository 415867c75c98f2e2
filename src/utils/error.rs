use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatError {
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Attribute '{value}' is not supported")]
    UnsupportedAttributeError { value: String },

    #[error("Input directory not found: {}", path.display())]
    DirectoryNotFoundError { path: PathBuf },

    #[error("No json files found in directory: {}", path.display())]
    NoInputError { path: PathBuf },

    #[error("Malformed record #{record} at byte {offset} in {}: {source}", path.display())]
    MalformedRecordError {
        path: PathBuf,
        record: u64,
        offset: u64,
        #[source]
        source: serde_json::Error,
    },

    #[error("Attribute value can't be empty: {value:?}")]
    InvalidAttributeError { value: String },

    #[error("Failed to access {}: {source}", path.display())]
    FileAccessError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Data,
    Output,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl StatError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            StatError::ConfigError { .. }
            | StatError::MissingConfigError { .. }
            | StatError::InvalidConfigValueError { .. }
            | StatError::ConfigValidationError { .. }
            | StatError::UnsupportedAttributeError { .. } => ErrorCategory::Configuration,
            StatError::DirectoryNotFoundError { .. }
            | StatError::NoInputError { .. }
            | StatError::FileAccessError { .. } => ErrorCategory::Input,
            StatError::MalformedRecordError { .. } | StatError::InvalidAttributeError { .. } => {
                ErrorCategory::Data
            }
            StatError::SerializationError(_) | StatError::CsvError(_) => ErrorCategory::Output,
            StatError::IoError(_) | StatError::ProcessingError { .. } => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 單一檔案或單一數值的問題，不影響整體執行
            ErrorCategory::Data => ErrorSeverity::Low,
            ErrorCategory::Configuration | ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Output => ErrorSeverity::Medium,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 致命錯誤會在分派任務之前中止整個流程
    pub fn is_fatal(&self) -> bool {
        !matches!(self.category(), ErrorCategory::Data)
    }

    /// 程序結束碼，對應錯誤嚴重程度
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            StatError::UnsupportedAttributeError { .. } => format!(
                "Use one of the supported attribute names: {}",
                crate::domain::model::AttributeKind::labels().join(", ")
            ),
            StatError::ConfigError { .. }
            | StatError::MissingConfigError { .. }
            | StatError::InvalidConfigValueError { .. }
            | StatError::ConfigValidationError { .. } => {
                "Check the command line arguments or the configuration file".to_string()
            }
            StatError::DirectoryNotFoundError { .. } => {
                "Make sure the input path exists and is a directory".to_string()
            }
            StatError::NoInputError { .. } => {
                "Json files in directory are required, check the input path".to_string()
            }
            StatError::MalformedRecordError { .. } => {
                "Fix or remove the malformed record, the rest of that file was skipped".to_string()
            }
            StatError::InvalidAttributeError { .. } => {
                "Blank attribute values are ignored, check the source records".to_string()
            }
            StatError::FileAccessError { .. } | StatError::IoError(_) => {
                "Check file permissions and available disk space".to_string()
            }
            StatError::SerializationError(_) | StatError::CsvError(_) => {
                "Try another report format or check the report directory".to_string()
            }
            StatError::ProcessingError { .. } => "Run again with --verbose for details".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Arguments Error: {}", self),
            ErrorCategory::Input => format!("Input Error: {}", self),
            ErrorCategory::Data => format!("Data Warning: {}", self),
            ErrorCategory::Output => format!("Report Error: {}", self),
            ErrorCategory::System => format!("Error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, StatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_errors_are_fatal() {
        let err = StatError::UnsupportedAttributeError {
            value: "bun-color".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(err.is_fatal());
        assert_eq!(err.exit_code(), 1);
        assert!(err.recovery_suggestion().contains("burger-name"));
        assert!(err.user_friendly_message().starts_with("Arguments Error"));
    }

    #[test]
    fn test_data_errors_are_local() {
        let err = StatError::InvalidAttributeError {
            value: " ".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Low);
        assert!(!err.is_fatal());
        assert_eq!(err.exit_code(), 0);
    }

    #[test]
    fn test_no_input_message_names_directory() {
        let err = StatError::NoInputError {
            path: PathBuf::from("/tmp/orders"),
        };
        assert_eq!(err.to_string(), "No json files found in directory: /tmp/orders");
        assert!(err.is_fatal());
    }
}
