pub mod cli;
pub mod toml_config;

use crate::core::report::DEFAULT_REPORT_DIRECTORY;
use crate::core::ConfigProvider;
use crate::domain::model::{AttributeKind, ReportFormat};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use std::path::{Path, PathBuf};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, clap::Parser)]
#[command(name = "burger-stats")]
#[command(about = "Count burger and ingredient attributes across a directory of order files")]
#[command(after_help = "Available attribute names: burger-name, ingredient-name, ingredient-price")]
pub struct CliConfig {
    /// Directory scanned recursively for *.json order files
    pub input_directory: PathBuf,

    /// Attribute to count
    pub attribute: String,

    #[arg(long, default_value = DEFAULT_REPORT_DIRECTORY)]
    pub output_dir: String,

    #[arg(long, default_value = "xml", help = "Report format: xml, json or csv")]
    pub format: String,

    #[arg(long, help = "Limit the number of files processed at the same time")]
    pub max_workers: Option<usize>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn new(input_directory: impl Into<PathBuf>, attribute: &str) -> Self {
        Self {
            input_directory: input_directory.into(),
            attribute: attribute.to_string(),
            output_dir: DEFAULT_REPORT_DIRECTORY.to_string(),
            format: ReportFormat::default().to_string(),
            max_workers: None,
            verbose: false,
            monitor: false,
            json_logs: false,
        }
    }

    pub fn attribute_kind(&self) -> Result<AttributeKind> {
        validation::validate_attribute(&self.attribute)
    }
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn input_directory(&self) -> &Path {
        &self.input_directory
    }

    fn attribute(&self) -> &str {
        &self.attribute
    }

    fn report_directory(&self) -> &str {
        &self.output_dir
    }

    fn report_format(&self) -> Result<ReportFormat> {
        validation::validate_report_format("format", &self.format)
    }

    fn max_workers(&self) -> Option<usize> {
        self.max_workers
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_attribute(&self.attribute)?;
        validation::validate_path("input_directory", &self.input_directory.to_string_lossy())?;
        validation::validate_path("output_dir", &self.output_dir)?;
        self.report_format()?;
        if let Some(workers) = self.max_workers {
            validation::validate_positive_number("max_workers", workers, 1)?;
        }
        Ok(())
    }
}
