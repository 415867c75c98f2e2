use crate::domain::model::{Aggregation, AttributeKind, ReportFormat, RunSummary, SortedReport};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_directory(&self) -> &Path;
    fn attribute(&self) -> &str;
    fn report_directory(&self) -> &str;
    fn report_format(&self) -> Result<ReportFormat>;
    /// `None` 代表不限制同時處理的檔案數
    fn max_workers(&self) -> Option<usize>;
}

/// 接收最終排序結果的輸出端
#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn publish(&self, report: &SortedReport, attribute: AttributeKind) -> Result<String>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<PathBuf>>;
    async fn transform(&self, files: Vec<PathBuf>) -> Result<Aggregation>;
    async fn load(&self, aggregation: Aggregation) -> Result<RunSummary>;
}
