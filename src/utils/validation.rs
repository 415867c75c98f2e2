use crate::domain::model::{AttributeKind, ReportFormat};
use crate::utils::error::{StatError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(StatError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(StatError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(StatError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

/// 屬性名稱必須完全符合支援清單 (區分大小寫)
pub fn validate_attribute(value: &str) -> Result<AttributeKind> {
    value.parse()
}

pub fn validate_report_format(field_name: &str, value: &str) -> Result<ReportFormat> {
    value.parse().map_err(|_| StatError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: format!(
            "Unsupported format. Valid formats: {}",
            ReportFormat::labels().join(", ")
        ),
    })
}
