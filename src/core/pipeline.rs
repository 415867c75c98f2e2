use crate::core::counter::FrequencyCounter;
use crate::core::{processor, scanner};
use crate::domain::model::{Aggregation, AttributeKind, FileFailure, FileStats, RunSummary};
use crate::domain::ports::{ConfigProvider, Pipeline, ReportSink};
use crate::utils::error::{Result, StatError};
use crate::utils::validation;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};

/// 統計流程的階段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    Scanning,
    Dispatching,
    AwaitingCompletion,
    Reporting,
    Done,
    Failed,
}

impl PipelineStage {
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineStage::Done | PipelineStage::Failed)
    }

    pub fn can_advance_to(self, next: PipelineStage) -> bool {
        use PipelineStage::*;
        match (self, next) {
            (Idle, Scanning)
            | (Scanning, Dispatching)
            | (Dispatching, AwaitingCompletion)
            | (AwaitingCompletion, Reporting)
            | (Reporting, Done) => true,
            (current, Failed) => !current.is_terminal(),
            _ => false,
        }
    }
}

type TaskOutcome = (PathBuf, std::result::Result<Result<FileStats>, JoinError>);

/// 掃描目錄、平行處理每個檔案、最後輸出排序後的統計
///
/// 每個檔案一個 blocking task，全部送出後才開始等待結果。
/// 單一檔案失敗只會被記錄，不會取消其他檔案。
pub struct StatisticPipeline<R: ReportSink, C: ConfigProvider> {
    sink: R,
    config: C,
    attribute: AttributeKind,
    counter: Arc<FrequencyCounter>,
    stage: Mutex<PipelineStage>,
}

impl<R: ReportSink, C: ConfigProvider> StatisticPipeline<R, C> {
    /// 屬性名稱在這裡就會被檢查，不合法時還沒開始掃描
    pub fn new(sink: R, config: C) -> Result<Self> {
        let attribute = validation::validate_attribute(config.attribute())?;
        Ok(Self {
            sink,
            config,
            attribute,
            counter: Arc::new(FrequencyCounter::new()),
            stage: Mutex::new(PipelineStage::Idle),
        })
    }

    pub fn attribute(&self) -> AttributeKind {
        self.attribute
    }

    pub fn stage(&self) -> PipelineStage {
        *self.stage.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn advance(&self, next: PipelineStage) -> Result<()> {
        let mut stage = self.stage.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if !stage.can_advance_to(next) {
            return Err(StatError::ProcessingError {
                message: format!("Invalid pipeline transition {:?} -> {:?}", *stage, next),
            });
        }
        tracing::debug!("Pipeline stage {:?} -> {:?}", *stage, next);
        *stage = next;
        Ok(())
    }

    fn fail<T>(&self, error: StatError) -> Result<T> {
        // 已經是終止狀態時保留原狀態
        let _ = self.advance(PipelineStage::Failed);
        Err(error)
    }

    async fn scan(&self) -> Result<Vec<PathBuf>> {
        let root = self.config.input_directory().to_path_buf();
        tracing::info!("🔎 Scanning {} for json files", root.display());

        let scan_root = root.clone();
        let files = tokio::task::spawn_blocking(move || scanner::scan(&scan_root))
            .await
            .map_err(|e| StatError::ProcessingError {
                message: format!("Scanner task failed: {}", e),
            })??;

        if files.is_empty() {
            return Err(StatError::NoInputError { path: root });
        }
        Ok(files)
    }

    fn dispatch(&self, files: Vec<PathBuf>) -> JoinSet<TaskOutcome> {
        let semaphore = self
            .config
            .max_workers()
            .map(|workers| Arc::new(Semaphore::new(workers.max(1))));
        let mut tasks = JoinSet::new();

        for path in files {
            let counter = Arc::clone(&self.counter);
            let semaphore = semaphore.clone();
            let attribute = self.attribute;

            tasks.spawn(async move {
                // 有設定上限時才排隊，否則交給 blocking pool 自行成長
                let _permit = match semaphore {
                    Some(semaphore) => semaphore.acquire_owned().await.ok(),
                    None => None,
                };
                let task_path = path.clone();
                let outcome = tokio::task::spawn_blocking(move || {
                    processor::process(&task_path, attribute, &counter)
                })
                .await;
                (path, outcome)
            });
        }

        tasks
    }

    async fn await_completion(&self, mut tasks: JoinSet<TaskOutcome>) -> Aggregation {
        let mut aggregation = Aggregation {
            files_total: tasks.len(),
            ..Default::default()
        };

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(Ok(stats)))) => aggregation.processed.push(stats),
                Ok((path, Ok(Err(e)))) => {
                    let orders_before_failure = match &e {
                        StatError::MalformedRecordError { record, .. } => *record,
                        _ => 0,
                    };
                    tracing::warn!("⚠️ Failed to process {}: {}", path.display(), e);
                    aggregation.failures.push(FileFailure {
                        path,
                        orders_before_failure,
                        message: e.to_string(),
                    });
                }
                Ok((path, Err(e))) => {
                    tracing::error!("❌ Worker for {} did not complete: {}", path.display(), e);
                    aggregation.failures.push(FileFailure {
                        path,
                        orders_before_failure: 0,
                        message: format!("worker did not complete: {}", e),
                    });
                }
                Err(e) => {
                    tracing::error!("❌ Error collecting processed orders: {}", e);
                    aggregation.failures.push(FileFailure {
                        path: PathBuf::new(),
                        orders_before_failure: 0,
                        message: format!("task did not complete: {}", e),
                    });
                }
            }
        }

        aggregation
    }
}

#[async_trait::async_trait]
impl<R: ReportSink, C: ConfigProvider> Pipeline for StatisticPipeline<R, C> {
    async fn extract(&self) -> Result<Vec<PathBuf>> {
        self.advance(PipelineStage::Scanning)?;
        match self.scan().await {
            Ok(files) => Ok(files),
            Err(e) => self.fail(e),
        }
    }

    async fn transform(&self, files: Vec<PathBuf>) -> Result<Aggregation> {
        self.advance(PipelineStage::Dispatching)?;
        let file_count = files.len();
        let tasks = self.dispatch(files);
        tracing::debug!("Dispatched {} file tasks", file_count);

        self.advance(PipelineStage::AwaitingCompletion)?;
        let aggregation = self.await_completion(tasks).await;

        tracing::info!(
            "⚙️ Processed {} of {} files ({} orders, {} failed)",
            aggregation.processed.len(),
            aggregation.files_total,
            aggregation.processed_orders(),
            aggregation.failures.len()
        );
        Ok(aggregation)
    }

    async fn load(&self, aggregation: Aggregation) -> Result<RunSummary> {
        self.advance(PipelineStage::Reporting)?;

        let report = self.counter.snapshot_sorted();
        let report_path = match self.sink.publish(&report, self.attribute).await {
            Ok(path) => path,
            Err(e) => return self.fail(e),
        };

        self.advance(PipelineStage::Done)?;
        tracing::info!(
            "📝 Report with {} entries written to {}",
            report.len(),
            report_path
        );

        Ok(RunSummary {
            attribute: self.attribute,
            report_path,
            report_entries: report.len(),
            files_total: aggregation.files_total,
            processed_orders: aggregation.processed_orders(),
            rejected_values: aggregation.rejected_values(),
            failures: aggregation.failures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ReportFormat, SortedReport};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    struct TestConfig {
        input: PathBuf,
        attribute: String,
        max_workers: Option<usize>,
    }

    impl ConfigProvider for TestConfig {
        fn input_directory(&self) -> &Path {
            &self.input
        }

        fn attribute(&self) -> &str {
            &self.attribute
        }

        fn report_directory(&self) -> &str {
            "unused"
        }

        fn report_format(&self) -> Result<ReportFormat> {
            Ok(ReportFormat::Xml)
        }

        fn max_workers(&self) -> Option<usize> {
            self.max_workers
        }
    }

    #[derive(Default)]
    struct MemorySink {
        published: Mutex<Vec<(SortedReport, AttributeKind)>>,
    }

    #[async_trait::async_trait]
    impl ReportSink for Arc<MemorySink> {
        async fn publish(&self, report: &SortedReport, attribute: AttributeKind) -> Result<String> {
            self.published
                .lock()
                .unwrap()
                .push((report.clone(), attribute));
            Ok("memory".to_string())
        }
    }

    fn config(input: &Path, attribute: &str, max_workers: Option<usize>) -> TestConfig {
        TestConfig {
            input: input.to_path_buf(),
            attribute: attribute.to_string(),
            max_workers,
        }
    }

    fn order_json(id: u32, burgers: &[&str]) -> String {
        let burgers: Vec<String> = burgers
            .iter()
            .enumerate()
            .map(|(i, name)| {
                format!(
                    r#"{{"id": "00000000-0000-4000-8000-{:06}{:06}", "name": "{}", "ingredients": []}}"#,
                    id, i, name
                )
            })
            .collect();
        format!(
            r#"{{"id": "00000000-0000-4000-9000-{:012}", "createdAt": "2024-06-01T12:00:00Z", "burgers": [{}]}}"#,
            id,
            burgers.join(",")
        )
    }

    #[test]
    fn test_stage_transitions() {
        use PipelineStage::*;
        assert!(Idle.can_advance_to(Scanning));
        assert!(Scanning.can_advance_to(Failed));
        assert!(AwaitingCompletion.can_advance_to(Reporting));
        assert!(!Idle.can_advance_to(Reporting));
        assert!(!Done.can_advance_to(Failed));
        assert!(!Failed.can_advance_to(Scanning));
    }

    #[test]
    fn test_unsupported_attribute_rejected_before_scanning() {
        let dir = TempDir::new().unwrap();
        let result = StatisticPipeline::new(
            Arc::new(MemorySink::default()),
            config(dir.path(), "burger-weight", None),
        );
        assert!(matches!(
            result,
            Err(StatError::UnsupportedAttributeError { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_directory_fails_with_no_input() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("notes.txt"), "not an order").unwrap();

        let pipeline = StatisticPipeline::new(
            Arc::new(MemorySink::default()),
            config(dir.path(), "burger-name", None),
        )
        .unwrap();

        let result = pipeline.extract().await;
        assert!(matches!(result, Err(StatError::NoInputError { .. })));
        assert_eq!(pipeline.stage(), PipelineStage::Failed);
    }

    #[tokio::test]
    async fn test_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let pipeline = StatisticPipeline::new(
            Arc::new(MemorySink::default()),
            config(&dir.path().join("nope"), "burger-name", None),
        )
        .unwrap();

        assert!(matches!(
            pipeline.extract().await,
            Err(StatError::DirectoryNotFoundError { .. })
        ));
        assert_eq!(pipeline.stage(), PipelineStage::Failed);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_full_run_with_bounded_workers() {
        let dir = TempDir::new().unwrap();
        for i in 0..12u32 {
            let content = format!("[{}]", order_json(i, &["Classic", "Smash"]));
            fs::write(dir.path().join(format!("orders_{}.json", i)), content).unwrap();
        }

        let sink = Arc::new(MemorySink::default());
        let pipeline =
            StatisticPipeline::new(Arc::clone(&sink), config(dir.path(), "burger-name", Some(2)))
                .unwrap();

        let files = pipeline.extract().await.unwrap();
        assert_eq!(files.len(), 12);
        let aggregation = pipeline.transform(files).await.unwrap();
        assert_eq!(pipeline.stage(), PipelineStage::AwaitingCompletion);
        assert_eq!(aggregation.processed_orders(), 12);

        let summary = pipeline.load(aggregation).await.unwrap();
        assert_eq!(pipeline.stage(), PipelineStage::Done);
        assert_eq!(summary.processed_orders, 12);
        assert_eq!(summary.report_entries, 2);

        let published = sink.published.lock().unwrap();
        assert_eq!(published.len(), 1);
        let (report, attribute) = &published[0];
        assert_eq!(*attribute, AttributeKind::BurgerName);
        assert_eq!(report.values(), vec!["Classic", "Smash"]);
        assert_eq!(report.get("Classic"), Some(12));
    }

    #[tokio::test]
    async fn test_failed_file_does_not_cancel_siblings() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("good.json"),
            order_json(1, &["Classic"]),
        )
        .unwrap();
        fs::write(
            dir.path().join("bad.json"),
            format!("{}\n{{ not json", order_json(2, &["Classic", "Bacon"])),
        )
        .unwrap();

        let sink = Arc::new(MemorySink::default());
        let pipeline =
            StatisticPipeline::new(Arc::clone(&sink), config(dir.path(), "burger-name", None))
                .unwrap();

        let files = pipeline.extract().await.unwrap();
        let aggregation = pipeline.transform(files).await.unwrap();

        assert_eq!(aggregation.files_total, 2);
        assert_eq!(aggregation.processed_orders(), 1);
        assert_eq!(aggregation.failures.len(), 1);
        assert_eq!(aggregation.failures[0].orders_before_failure, 1);
        assert!(aggregation.failures[0].path.ends_with("bad.json"));

        let summary = pipeline.load(aggregation).await.unwrap();
        let published = sink.published.lock().unwrap();
        // 失敗檔案中先前成功的訂單仍然計入
        assert_eq!(published[0].0.get("Classic"), Some(2));
        assert_eq!(published[0].0.get("Bacon"), Some(1));
        assert_eq!(summary.processed_orders, 1);
    }

    #[tokio::test]
    async fn test_phases_cannot_run_out_of_order() {
        let dir = TempDir::new().unwrap();
        let pipeline = StatisticPipeline::new(
            Arc::new(MemorySink::default()),
            config(dir.path(), "burger-name", None),
        )
        .unwrap();

        assert!(matches!(
            pipeline.load(Aggregation::default()).await,
            Err(StatError::ProcessingError { .. })
        ));
        assert_eq!(pipeline.stage(), PipelineStage::Idle);
    }
}
