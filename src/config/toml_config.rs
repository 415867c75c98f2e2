use crate::core::report::DEFAULT_REPORT_DIRECTORY;
use crate::core::ConfigProvider;
use crate::domain::model::{AttributeKind, ReportFormat};
use crate::utils::error::{Result, StatError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([^}]+)\}").unwrap_or_else(|_| panic!("Invalid env var pattern"))
});

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub input: InputConfig,
    #[serde(default)]
    pub report: ReportConfig,
    pub performance: Option<PerformanceConfig>,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub directory: String,
    pub attribute: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_report_directory")]
    pub directory: String,
    #[serde(default = "default_report_format")]
    pub format: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            directory: default_report_directory(),
            format: default_report_format(),
        }
    }
}

fn default_report_directory() -> String {
    DEFAULT_REPORT_DIRECTORY.to_string()
}

fn default_report_format() -> String {
    ReportFormat::default().to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceConfig {
    pub max_workers: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|source| StatError::FileAccessError {
            path: path.as_ref().to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| StatError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${ORDER_DIR})，找不到的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_RE
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    pub fn attribute_kind(&self) -> Result<AttributeKind> {
        validation::validate_attribute(&self.input.attribute)
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn input_directory(&self) -> &Path {
        Path::new(&self.input.directory)
    }

    fn attribute(&self) -> &str {
        &self.input.attribute
    }

    fn report_directory(&self) -> &str {
        &self.report.directory
    }

    fn report_format(&self) -> Result<ReportFormat> {
        validation::validate_report_format("report.format", &self.report.format)
    }

    fn max_workers(&self) -> Option<usize> {
        self.performance.as_ref().and_then(|p| p.max_workers)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("input.directory", &self.input.directory)?;
        validation::validate_attribute(&self.input.attribute)?;
        validation::validate_path("report.directory", &self.report.directory)?;
        self.report_format()?;
        if let Some(workers) = self.max_workers() {
            validation::validate_positive_number("performance.max_workers", workers, 1)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_toml_config() {
        let toml_content = r#"
[input]
directory = "./orders"
attribute = "ingredient-price"

[report]
directory = "./reports"
format = "json"

[performance]
max_workers = 8
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.input_directory(), Path::new("./orders"));
        assert_eq!(config.attribute_kind().unwrap(), AttributeKind::IngredientPrice);
        assert_eq!(config.report_directory(), "./reports");
        assert_eq!(config.report_format().unwrap(), ReportFormat::Json);
        assert_eq!(config.max_workers(), Some(8));
        assert!(!config.monitoring_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_report_section_defaults() {
        let config = TomlConfig::from_toml_str(
            r#"
[input]
directory = "./orders"
attribute = "burger-name"
"#,
        )
        .unwrap();

        assert_eq!(config.report_directory(), "statistic");
        assert_eq!(config.report_format().unwrap(), ReportFormat::Xml);
        assert_eq!(config.max_workers(), None);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("BURGER_STATS_TEST_DIR", "/data/orders");

        let config = TomlConfig::from_toml_str(
            r#"
[input]
directory = "${BURGER_STATS_TEST_DIR}"
attribute = "burger-name"
"#,
        )
        .unwrap();
        assert_eq!(config.input.directory, "/data/orders");

        std::env::remove_var("BURGER_STATS_TEST_DIR");
    }

    #[test]
    fn test_unknown_env_var_is_kept() {
        let config = TomlConfig::from_toml_str(
            r#"
[input]
directory = "${BURGER_STATS_SURELY_UNSET}"
attribute = "burger-name"
"#,
        )
        .unwrap();
        assert_eq!(config.input.directory, "${BURGER_STATS_SURELY_UNSET}");
    }

    #[test]
    fn test_config_validation() {
        let config = TomlConfig::from_toml_str(
            r#"
[input]
directory = "./orders"
attribute = "patty-weight"

[performance]
max_workers = 2
"#,
        )
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(StatError::UnsupportedAttributeError { .. })
        ));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            TomlConfig::from_toml_str("[input\ndirectory ="),
            Err(StatError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(
                br#"
[input]
directory = "./orders"
attribute = "ingredient-name"

[monitoring]
enabled = true
"#,
            )
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.attribute(), "ingredient-name");
        assert!(config.monitoring_enabled());
    }
}
