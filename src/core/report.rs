use crate::domain::model::{AttributeKind, ReportFormat, SortedReport};
use crate::domain::ports::{ReportSink, Storage};
use crate::utils::error::{Result, StatError};
use async_trait::async_trait;

pub const DEFAULT_REPORT_DIRECTORY: &str = "statistic";

/// 報表檔名，例如 `statistic_by_burger-name.xml`
pub fn report_file_name(attribute: AttributeKind, format: ReportFormat) -> String {
    format!("statistic_by_{}.{}", attribute.label(), format.extension())
}

pub fn render(report: &SortedReport, attribute: AttributeKind, format: ReportFormat) -> Result<Vec<u8>> {
    match format {
        ReportFormat::Xml => Ok(render_xml(report, attribute).into_bytes()),
        ReportFormat::Json => Ok(serde_json::to_vec_pretty(report.entries())?),
        ReportFormat::Csv => render_csv(report, attribute),
    }
}

fn render_xml(report: &SortedReport, attribute: AttributeKind) -> String {
    let element = attribute.element_name();
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>\n");

    if report.is_empty() {
        xml.push_str("<statistic/>\n");
        return xml;
    }

    xml.push_str("<statistic>\n");
    for entry in report.iter() {
        xml.push_str("  <item>\n");
        xml.push_str(&format!(
            "    <{0}>{1}</{0}>\n",
            element,
            escape_xml(&entry.value)
        ));
        xml.push_str(&format!("    <count>{}</count>\n", entry.count));
        xml.push_str("  </item>\n");
    }
    xml.push_str("</statistic>\n");
    xml
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn render_csv(report: &SortedReport, attribute: AttributeKind) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([attribute.label(), "count"])?;
    for entry in report.iter() {
        let count = entry.count.to_string();
        writer.write_record([entry.value.as_str(), count.as_str()])?;
    }
    writer
        .into_inner()
        .map_err(|e| StatError::IoError(e.into_error()))
}

/// 將報表寫入 storage 的 ReportSink
pub struct FileReportSink<S: Storage> {
    storage: S,
    format: ReportFormat,
}

impl<S: Storage> FileReportSink<S> {
    pub fn new(storage: S, format: ReportFormat) -> Self {
        Self { storage, format }
    }
}

#[async_trait]
impl<S: Storage> ReportSink for FileReportSink<S> {
    async fn publish(&self, report: &SortedReport, attribute: AttributeKind) -> Result<String> {
        let data = render(report, attribute, self.format)?;
        let file_name = report_file_name(attribute, self.format);

        tracing::debug!(
            "Writing {} report with {} entries ({} bytes) to {}",
            self.format,
            report.len(),
            data.len(),
            file_name
        );
        self.storage.write_file(&file_name, &data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::cli::LocalStorage;
    use tempfile::TempDir;

    fn sample_report() -> SortedReport {
        SortedReport::from_counts(vec![
            ("Fish & Chips".to_string(), 1),
            ("Classic".to_string(), 3),
        ])
    }

    #[test]
    fn test_report_file_name() {
        assert_eq!(
            report_file_name(AttributeKind::BurgerName, ReportFormat::Xml),
            "statistic_by_burger-name.xml"
        );
        assert_eq!(
            report_file_name(AttributeKind::IngredientPrice, ReportFormat::Csv),
            "statistic_by_ingredient-price.csv"
        );
    }

    #[test]
    fn test_render_xml() {
        let xml = String::from_utf8(
            render(&sample_report(), AttributeKind::BurgerName, ReportFormat::Xml).unwrap(),
        )
        .unwrap();

        let expected = [
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>",
            "<statistic>",
            "  <item>",
            "    <burgername>Classic</burgername>",
            "    <count>3</count>",
            "  </item>",
            "  <item>",
            "    <burgername>Fish &amp; Chips</burgername>",
            "    <count>1</count>",
            "  </item>",
            "</statistic>",
            "",
        ]
        .join("\n");
        assert_eq!(xml, expected);
    }

    #[test]
    fn test_render_empty_xml() {
        let xml = String::from_utf8(
            render(&SortedReport::default(), AttributeKind::IngredientName, ReportFormat::Xml)
                .unwrap(),
        )
        .unwrap();
        assert!(xml.ends_with("<statistic/>\n"));
    }

    #[test]
    fn test_render_json_keeps_order() {
        let json = render(&sample_report(), AttributeKind::BurgerName, ReportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        let items = value.as_array().unwrap();
        assert_eq!(items[0]["value"], "Classic");
        assert_eq!(items[0]["count"].to_string(), "3");
        assert_eq!(items[1]["value"], "Fish & Chips");
    }

    #[test]
    fn test_render_csv() {
        let csv = String::from_utf8(
            render(&sample_report(), AttributeKind::IngredientName, ReportFormat::Csv).unwrap(),
        )
        .unwrap();
        assert_eq!(csv, "ingredient-name,count\nClassic,3\nFish & Chips,1\n");
    }

    #[test]
    fn test_file_sink_creates_report_directory() {
        let temp_dir = TempDir::new().unwrap();
        let report_dir = temp_dir.path().join("statistic");
        let sink = FileReportSink::new(
            LocalStorage::new(report_dir.to_string_lossy().to_string()),
            ReportFormat::Xml,
        );

        let written = tokio_test::block_on(sink.publish(&sample_report(), AttributeKind::BurgerName))
            .unwrap();

        assert!(written.ends_with("statistic_by_burger-name.xml"));
        let content = std::fs::read_to_string(report_dir.join("statistic_by_burger-name.xml")).unwrap();
        assert!(content.contains("<burgername>Classic</burgername>"));
    }
}
