use crate::config::cli::LocalStorage;
use crate::core::pipeline::StatisticPipeline;
use crate::core::report::FileReportSink;
use crate::core::{ConfigProvider, Pipeline};
use crate::domain::model::RunSummary;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use crate::utils::summary;

pub struct StatEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> StatEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!("🚀 Starting statistic run");
        self.monitor.log_stats("Start");

        // Scan
        let files = self.pipeline.extract().await?;
        tracing::info!("📂 Found {} json files", files.len());
        self.monitor.log_stats("Scanning");

        // Process
        let aggregation = self.pipeline.transform(files).await?;
        self.monitor.log_stats("Processing");
        // 報表寫入失敗時總數仍需輸出
        summary::print_processed_orders(aggregation.processed_orders());

        // Report
        let summary = self.pipeline.load(aggregation).await?;
        self.monitor.log_stats("Reporting");
        self.monitor.log_final_stats();

        Ok(summary)
    }
}

/// 以本機報表目錄組裝完整流程並執行
pub async fn run_statistics<C: ConfigProvider>(config: C, monitor_enabled: bool) -> Result<RunSummary> {
    let storage = LocalStorage::new(config.report_directory().to_string());
    let sink = FileReportSink::new(storage, config.report_format()?);
    let pipeline = StatisticPipeline::new(sink, config)?;

    StatEngine::new_with_monitoring(pipeline, monitor_enabled)
        .run()
        .await
}
