use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::services::analysis::types::{ColumnSummary, RelatedColumns};

/// A single cell as delivered by the row parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Number(f64),
    Text(String),
}

/// Hashable identity of a non-blank cell. Numbers and text never collide,
/// so `1` and `"1"` count as two distinct values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DistinctKey<'a> {
    Number(u64),
    Text(&'a str),
}

impl CellValue {
    /// Null and the empty string both mean "no data".
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) => s.is_empty(),
            CellValue::Number(_) => false,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn distinct_key(&self) -> DistinctKey<'_> {
        match self {
            // -0 and 0 are the same value, every NaN is the same value
            CellValue::Number(n) if *n == 0.0 => DistinctKey::Number(0f64.to_bits()),
            CellValue::Number(n) if n.is_nan() => DistinctKey::Number(f64::NAN.to_bits()),
            CellValue::Number(n) => DistinctKey::Number(n.to_bits()),
            CellValue::Text(s) => DistinctKey::Text(s),
            CellValue::Null => DistinctKey::Text(""),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => write!(f, "null"),
            CellValue::Number(n) if *n == 0.0 => write!(f, "0"),
            CellValue::Number(n) if n.is_nan() => write!(f, "NaN"),
            CellValue::Number(n) if n.is_infinite() => {
                write!(f, "{}", if *n > 0.0 { "Infinity" } else { "-Infinity" })
            }
            // Exponent form outside [1e-6, 1e21), with an explicit `+` on positive powers
            CellValue::Number(n) if n.abs() < 1e-6 || n.abs() >= 1e21 => {
                let exp = format!("{:e}", n);
                match exp.split_once('e') {
                    Some((mantissa, power)) if !power.starts_with('-') => {
                        write!(f, "{}e+{}", mantissa, power)
                    }
                    _ => write!(f, "{}", exp),
                }
            }
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

/// One parsed row keyed by column name. Column order lives in `CsvData::headers`.
pub type Record = BTreeMap<String, CellValue>;

/// A fully analysed dataset, ready for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvData {
    pub id: String,
    pub filename: String,
    pub headers: Vec<String>,
    pub records: Vec<Record>,
    pub summary: Vec<ColumnSummary>,
    pub related_columns: Vec<RelatedColumns>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetInfo {
    pub id: String,
    pub filename: String,
    pub row_count: usize,
    pub column_count: usize,
    pub relation_count: usize,
}

impl From<&CsvData> for DatasetInfo {
    fn from(data: &CsvData) -> Self {
        Self {
            id: data.id.clone(),
            filename: data.filename.clone(),
            row_count: data.records.len(),
            column_count: data.headers.len(),
            relation_count: data.related_columns.len(),
        }
    }
}
