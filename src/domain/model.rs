use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::str::FromStr;
use uuid::Uuid;

use crate::utils::error::StatError;

/// 單筆訂單，解碼後即不可變；相等性只看 id (缺少 id 時為 `None`)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub burgers: Vec<Burger>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Burger {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub unit_price: Option<UnitPrice>,
}

macro_rules! identity_by_id {
    ($($ty:ty),*) => {
        $(
            impl PartialEq for $ty {
                fn eq(&self, other: &Self) -> bool {
                    self.id == other.id
                }
            }

            impl Eq for $ty {}

            impl Hash for $ty {
                fn hash<H: Hasher>(&self, state: &mut H) {
                    self.id.hash(state);
                }
            }
        )*
    };
}

identity_by_id!(Order, Burger, Ingredient);

/// 超過此範圍的指數視為無效價格，避免展開成巨大字串
const MAX_PRICE_EXPONENT: i64 = 4096;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid decimal unit price: {0:?}")]
pub struct ParsePriceError(String);

/// 精確的十進位單價，保存為不含指數的標準字串
///
/// 小數位數與尾端的零完全依照來源文字保留 (`2.50` 仍是 `2.50`)，
/// 指數形式會以移動小數點的方式展開 (`1.5e2` 變成 `150`)。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnitPrice(String);

impl UnitPrice {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for UnitPrice {
    type Err = ParsePriceError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        canonical_decimal(text)
            .map(UnitPrice)
            .ok_or_else(|| ParsePriceError(text.to_string()))
    }
}

impl<'de> Deserialize<'de> for UnitPrice {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // arbitrary_precision 讓數字保留原始文字，不經過 f64
        let raw = match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::Number(number) => number.to_string(),
            serde_json::Value::String(text) => text,
            other => {
                return Err(D::Error::custom(format!(
                    "expected a decimal unit price, found {}",
                    other
                )))
            }
        };
        raw.parse().map_err(D::Error::custom)
    }
}

fn canonical_decimal(text: &str) -> Option<String> {
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.strip_prefix('+').unwrap_or(text)),
    };

    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(idx) => (&unsigned[..idx], unsigned[idx + 1..].parse::<i64>().ok()?),
        None => (unsigned, 0),
    };
    if exponent.abs() > MAX_PRICE_EXPONENT {
        return None;
    }

    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let plain = if exponent == 0 {
        if frac_part.is_empty() {
            int_part.to_string()
        } else {
            format!("{}.{}", int_part, frac_part)
        }
    } else {
        let digits = format!("{}{}", int_part, frac_part);
        let point = int_part.len() as i64 + exponent;
        let len = digits.len() as i64;
        if point <= 0 {
            format!("0.{}{}", "0".repeat((-point) as usize), digits)
        } else if point >= len {
            format!("{}{}", digits, "0".repeat((point - len) as usize))
        } else {
            let (head, tail) = digits.split_at(point as usize);
            format!("{}.{}", head, tail)
        }
    };

    let (int_digits, fraction) = match plain.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (plain.as_str(), None),
    };
    let int_digits = match int_digits.trim_start_matches('0') {
        "" => "0",
        trimmed => trimmed,
    };

    Some(match fraction {
        Some(f) => format!("{}{}.{}", sign, int_digits, f),
        None => format!("{}{}", sign, int_digits),
    })
}

/// 可統計的屬性種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    BurgerName,
    IngredientName,
    IngredientPrice,
}

impl AttributeKind {
    pub const ALL: [AttributeKind; 3] = [
        AttributeKind::BurgerName,
        AttributeKind::IngredientName,
        AttributeKind::IngredientPrice,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AttributeKind::BurgerName => "burger-name",
            AttributeKind::IngredientName => "ingredient-name",
            AttributeKind::IngredientPrice => "ingredient-price",
        }
    }

    pub fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(AttributeKind::label).collect()
    }

    /// 報表中使用的元素名稱，例如 `burgername`
    pub fn element_name(&self) -> String {
        self.label().replace('-', "")
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AttributeKind {
    type Err = StatError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.label() == value)
            .ok_or_else(|| StatError::UnsupportedAttributeError {
                value: value.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Xml,
    Json,
    Csv,
}

impl ReportFormat {
    pub const ALL: [ReportFormat; 3] = [ReportFormat::Xml, ReportFormat::Json, ReportFormat::Csv];

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Xml => "xml",
            ReportFormat::Json => "json",
            ReportFormat::Csv => "csv",
        }
    }

    pub fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(ReportFormat::extension).collect()
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ReportFormat {
    type Err = StatError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.extension().eq_ignore_ascii_case(value))
            .ok_or_else(|| StatError::InvalidConfigValueError {
                field: "format".to_string(),
                value: value.to_string(),
                reason: format!("Valid formats: {}", Self::labels().join(", ")),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    pub value: String,
    pub count: u64,
}

/// 依次數遞減、再依名稱遞增排序的統計結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortedReport {
    entries: Vec<ReportEntry>,
}

impl SortedReport {
    pub fn from_counts<I>(counts: I) -> Self
    where
        I: IntoIterator<Item = (String, u64)>,
    {
        let mut entries: Vec<ReportEntry> = counts
            .into_iter()
            .map(|(value, count)| ReportEntry { value, count })
            .collect();
        entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
        Self { entries }
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ReportEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, value: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|entry| entry.value == value)
            .map(|entry| entry.count)
    }

    pub fn values(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.value.as_str()).collect()
    }
}

/// 單一檔案的處理結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStats {
    pub path: PathBuf,
    pub orders: u64,
    pub rejected_values: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub path: PathBuf,
    /// 失敗前已計入統計的訂單數 (不會回滾)
    pub orders_before_failure: u64,
    pub message: String,
}

/// 所有檔案處理完成後的彙總 (不含計數表本身)
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub files_total: usize,
    pub processed: Vec<FileStats>,
    pub failures: Vec<FileFailure>,
}

impl Aggregation {
    /// 只計算成功完成的檔案
    pub fn processed_orders(&self) -> u64 {
        self.processed.iter().map(|stats| stats.orders).sum()
    }

    pub fn rejected_values(&self) -> u64 {
        self.processed.iter().map(|stats| stats.rejected_values).sum()
    }
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub attribute: AttributeKind,
    pub report_path: String,
    pub report_entries: usize,
    pub files_total: usize,
    pub processed_orders: u64,
    pub rejected_values: u64,
    pub failures: Vec<FileFailure>,
}
