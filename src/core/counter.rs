use crate::domain::model::SortedReport;
use crate::utils::error::{Result, StatError};
use dashmap::DashMap;

/// 可由多個 worker 同時累加的屬性計數表
///
/// 只提供 `increment` 與統計完成後的 `snapshot_sorted`，不開放直接修改內部資料。
/// `snapshot_sorted` 應在所有 worker 結束之後才呼叫。
#[derive(Debug, Default)]
pub struct FrequencyCounter {
    counts: DashMap<String, u64>,
}

impl FrequencyCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self, value: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(StatError::InvalidAttributeError {
                value: value.to_string(),
            });
        }

        // 已存在的 key 不必再配置新的 String
        if let Some(mut count) = self.counts.get_mut(value) {
            *count += 1;
            return Ok(());
        }
        *self.counts.entry(value.to_string()).or_insert(0) += 1;
        Ok(())
    }

    pub fn get(&self, value: &str) -> Option<u64> {
        self.counts.get(value).map(|count| *count)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn snapshot_sorted(&self) -> SortedReport {
        SortedReport::from_counts(
            self.counts
                .iter()
                .map(|entry| (entry.key().clone(), *entry.value())),
        )
    }
}
