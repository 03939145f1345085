use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Numeric,
    Categorical,
    Date,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Bar,
    Line,
    Pie,
    Scatter,
    Column,
    Area,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Numeric => "numeric",
            ColumnType::Categorical => "categorical",
            ColumnType::Date => "date",
            ColumnType::Text => "text",
        };
        f.write_str(name)
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChartType::Bar => "bar",
            ChartType::Line => "line",
            ChartType::Pie => "pie",
            ChartType::Scatter => "scatter",
            ChartType::Column => "column",
            ChartType::Area => "area",
        };
        f.write_str(name)
    }
}

/// Per-column metadata derived once from a dataset snapshot.
///
/// `min`, `max` and `average` are only present for numeric columns and
/// `distribution` only for categorical ones. `recommended_chart` is the one
/// field a consumer may replace afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub unique_values: usize,
    pub has_nulls: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution: Option<BTreeMap<String, usize>>,
    pub recommended_chart: ChartType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub is_empty: bool,
}

/// A driving axis paired with the measurement column that follows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedColumns {
    pub x_axis: String,
    pub y_axis: SmallVec<[String; 1]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub recommended: ChartType,
}

impl RelatedColumns {
    pub fn pair(x_axis: &str, y_axis: &str, recommended: ChartType) -> Self {
        let mut y = SmallVec::new();
        y.push(y_axis.to_string());
        Self {
            x_axis: x_axis.to_string(),
            y_axis: y,
            title: Some(format!("{} by {}", y_axis, x_axis)),
            recommended,
        }
    }

    /// Every column name this relation draws from.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.x_axis.as_str()).chain(self.y_axis.iter().map(String::as_str))
    }
}
