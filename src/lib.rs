pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;
pub use crate::config::{cli::LocalStorage, toml_config::TomlConfig};

pub use crate::core::{
    counter::FrequencyCounter,
    engine::{run_statistics, StatEngine},
    pipeline::{PipelineStage, StatisticPipeline},
    report::FileReportSink,
};
pub use crate::domain::model::{AttributeKind, ReportFormat, RunSummary, SortedReport};
pub use crate::utils::error::{Result, StatError};
