pub mod counter;
pub mod decoder;
pub mod engine;
pub mod extractor;
pub mod pipeline;
pub mod processor;
pub mod report;
pub mod scanner;

pub use crate::domain::model::{Aggregation, AttributeKind, Order, RunSummary, SortedReport};
pub use crate::domain::ports::{ConfigProvider, Pipeline, ReportSink, Storage};
pub use crate::utils::error::Result;
