use crate::core::counter::FrequencyCounter;
use crate::core::decoder::OrderStream;
use crate::core::extractor::extract;
use crate::domain::model::{AttributeKind, FileStats};
use crate::utils::error::{Result, StatError};
use std::path::Path;

/// 處理單一檔案：解碼、取出屬性、累加計數
///
/// 空白屬性值只會被略過並記錄在 `rejected_values`。解碼失敗時檔案會先被關閉再回傳錯誤，
/// 之前已計入的訂單不會回滾。
pub fn process(path: &Path, kind: AttributeKind, counter: &FrequencyCounter) -> Result<FileStats> {
    let mut stats = FileStats {
        path: path.to_path_buf(),
        orders: 0,
        rejected_values: 0,
    };

    // stream 在任何離開路徑上都會被 drop，檔案隨之關閉
    for order in OrderStream::open(path)? {
        let order = order?;

        for value in extract(&order, kind) {
            match counter.increment(value) {
                Ok(()) => {}
                Err(StatError::InvalidAttributeError { value }) => {
                    tracing::debug!(
                        "Ignoring blank {} value {:?} in {}",
                        kind,
                        value,
                        path.display()
                    );
                    stats.rejected_values += 1;
                }
                Err(e) => return Err(e),
            }
        }
        stats.orders += 1;
    }

    tracing::debug!(
        "📄 Processed {} orders from {}",
        stats.orders,
        path.display()
    );
    Ok(stats)
}
