use std::collections::{BTreeMap, HashSet};

use super::types::{ChartType, ColumnSummary, ColumnType};
use super::utils::is_date_string;
use crate::models::{CellValue, Record};

const CATEGORICAL_MAX_UNIQUE: usize = 20;
const CATEGORICAL_MAX_RATIO: f64 = 0.2;

/// Classifies one column of `records` and recommends how to chart it.
///
/// Missing keys and empty strings count as blanks alongside nulls. The
/// result depends only on the cell values, never on row order.
pub fn analyze_column(records: &[Record], column_name: &str) -> ColumnSummary {
    let cells: Vec<Option<&CellValue>> = records.iter().map(|r| r.get(column_name)).collect();

    let null_count = cells
        .iter()
        .filter(|cell| cell.map_or(true, CellValue::is_blank))
        .count();
    let non_null_values: Vec<&CellValue> = cells
        .into_iter()
        .flatten()
        .filter(|value| !value.is_blank())
        .collect();

    let unique_values = non_null_values
        .iter()
        .map(|value| value.distinct_key())
        .collect::<HashSet<_>>()
        .len();

    let mut summary = ColumnSummary {
        name: column_name.to_string(),
        column_type: ColumnType::Text,
        unique_values,
        has_nulls: null_count > 0,
        min: None,
        max: None,
        average: None,
        distribution: None,
        recommended_chart: ChartType::Bar,
        unit: None,
        is_empty: non_null_values.is_empty(),
    };

    if summary.is_empty {
        tracing::debug!(column = column_name, "column has no data");
        return summary;
    }

    summary.column_type = classify(&non_null_values, unique_values, records.len());
    match summary.column_type {
        ColumnType::Numeric => {
            let (min, max, average) = numeric_stats(&non_null_values);
            summary.min = Some(min);
            summary.max = Some(max);
            summary.average = Some(average);
        }
        ColumnType::Categorical => {
            summary.distribution = Some(distribution(&non_null_values));
        }
        ColumnType::Date | ColumnType::Text => {}
    }
    summary.recommended_chart = recommend_chart(summary.column_type, unique_values, records.len());

    tracing::debug!(
        column = column_name,
        column_type = %summary.column_type,
        unique_values,
        chart = %summary.recommended_chart,
        "column analysed"
    );
    summary
}

/// First match wins: numeric, date, categorical, then text.
/// `values` must be non-empty and contain no blanks.
fn classify(values: &[&CellValue], unique_values: usize, record_count: usize) -> ColumnType {
    if values.iter().all(|v| v.as_number().is_some()) {
        ColumnType::Numeric
    } else if values.iter().all(|v| is_date_string(&v.to_string())) {
        ColumnType::Date
    } else if unique_values <= CATEGORICAL_MAX_UNIQUE
        && (unique_values as f64) < record_count as f64 * CATEGORICAL_MAX_RATIO
    {
        ColumnType::Categorical
    } else {
        ColumnType::Text
    }
}

fn numeric_stats(values: &[&CellValue]) -> (f64, f64, f64) {
    let (min, max, sum, count) = values.iter().filter_map(|v| v.as_number()).fold(
        (f64::INFINITY, f64::NEG_INFINITY, 0.0, 0usize),
        |(min, max, sum, count), n| (min.min(n), max.max(n), sum + n, count + 1),
    );
    (min, max, sum / count as f64)
}

fn distribution(values: &[&CellValue]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for value in values {
        *counts.entry(value.to_string()).or_insert(0) += 1;
    }
    counts
}

pub fn recommend_chart(column_type: ColumnType, unique_values: usize, record_count: usize) -> ChartType {
    let unique = unique_values as f64;
    let rows = record_count as f64;
    match column_type {
        ColumnType::Numeric if unique > rows * 0.7 => ChartType::Line,
        ColumnType::Numeric if unique_values > 5 => ChartType::Column,
        ColumnType::Numeric => ChartType::Bar,
        ColumnType::Date if record_count > 15 => ChartType::Area,
        ColumnType::Date => ChartType::Line,
        ColumnType::Categorical if unique_values <= 5 => ChartType::Pie,
        ColumnType::Categorical if unique_values <= 10 => ChartType::Bar,
        ColumnType::Categorical => ChartType::Column,
        ColumnType::Text if unique > rows * 0.5 => ChartType::Scatter,
        ColumnType::Text => ChartType::Bar,
    }
}
