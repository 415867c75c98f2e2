use crate::domain::model::{AttributeKind, RunSummary};
use std::io::{self, Write};
use std::time::Duration;

pub const USAGE: &str = "Usage: burger-stats <path/to/json-data/inputDirectory> <attribute-name>";

pub fn print_usage_hint() {
    eprintln!("{}", USAGE);
    eprintln!(
        "Available attribute names: [{}]",
        AttributeKind::labels().join(", ")
    );
}

/// 處理完成後立即輸出訂單總數；總數為 0 時不輸出
pub fn print_processed_orders(processed_orders: u64) {
    if let Err(e) = write_processed_orders(&mut io::stdout().lock(), processed_orders) {
        tracing::warn!("Failed to print processed orders: {}", e);
    }
}

fn write_processed_orders<W: Write>(out: &mut W, processed_orders: u64) -> io::Result<()> {
    if processed_orders != 0 {
        writeln!(out, "Orders processed: {}", processed_orders)?;
    }
    Ok(())
}

/// 輸出失敗檔案與報表位置
pub fn print_summary(summary: &RunSummary) {
    if !summary.failures.is_empty() {
        eprintln!(
            "⚠️ {} of {} files could not be fully processed:",
            summary.failures.len(),
            summary.files_total
        );
        for failure in &summary.failures {
            eprintln!(
                "  {} ({} orders counted before failure): {}",
                failure.path.display(),
                failure.orders_before_failure,
                failure.message
            );
        }
    }

    if summary.rejected_values > 0 {
        tracing::info!(
            "Ignored {} blank {} values",
            summary.rejected_values,
            summary.attribute
        );
    }

    println!("📁 Report saved to: {}", summary.report_path);
}

pub fn print_duration(attribute: &str, elapsed: Duration) {
    println!(
        "Execution with '{}' attribute is completed in {} ms",
        attribute,
        elapsed.as_millis()
    );
}
