use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;

use super::types::{ChartType, ColumnSummary, ColumnType, RelatedColumns};
use super::utils::parse_date;
use crate::models::{CellValue, CsvData, Record};

pub const CHART_COLORS: [&str; 8] = [
    "#3B82F6", // blue
    "#8B5CF6", // purple
    "#EC4899", // pink
    "#F59E0B", // yellow
    "#10B981", // green
    "#6366F1", // indigo
    "#EF4444", // red
    "#6B7280", // gray
];

const NO_DATA_MESSAGE: &str =
    "This dataset doesn't contain any columns with valid data for visualization.";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedChartPlan {
    pub x_axis: String,
    pub y_axis: String,
    pub chart_type: ChartType,
    pub color: &'static str,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnChartPlan {
    pub name: String,
    pub chart_type: ChartType,
    pub color: &'static str,
    pub description: String,
}

/// What the dashboard should draw for one dataset, and in which order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardPlan {
    pub dataset_id: String,
    pub filename: String,
    pub related_charts: Vec<RelatedChartPlan>,
    pub column_charts: Vec<ColumnChartPlan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub name: CellValue,
    pub value: CellValue,
}

/// Lays out related charts first, then one chart for each remaining column
/// that has data and is not already drawn as part of a relation.
pub fn plan_dashboard(data: &CsvData) -> DashboardPlan {
    let non_empty: Vec<&ColumnSummary> = data.summary.iter().filter(|c| !c.is_empty).collect();

    let mut plan = DashboardPlan {
        dataset_id: data.id.clone(),
        filename: data.filename.clone(),
        related_charts: Vec::new(),
        column_charts: Vec::new(),
        message: None,
    };

    if non_empty.is_empty() {
        plan.message = Some(NO_DATA_MESSAGE.to_string());
        return plan;
    }

    let used_columns: HashSet<&str> = data
        .related_columns
        .iter()
        .flat_map(RelatedColumns::columns)
        .collect();

    plan.related_charts = data
        .related_columns
        .iter()
        .enumerate()
        .filter_map(|(index, related)| {
            let y_axis = related.y_axis.first()?;
            let has_data = !relation_series(&data.records, &related.x_axis, y_axis).is_empty();
            Some(RelatedChartPlan {
                x_axis: related.x_axis.clone(),
                y_axis: y_axis.clone(),
                chart_type: related.recommended,
                color: CHART_COLORS[index % CHART_COLORS.len()],
                title: related
                    .title
                    .clone()
                    .unwrap_or_else(|| format!("{} by {}", y_axis, related.x_axis)),
                description: relation_description(&related.x_axis, y_axis, has_data),
            })
        })
        .collect();

    plan.column_charts = non_empty
        .into_iter()
        .filter(|column| !used_columns.contains(column.name.as_str()))
        .enumerate()
        .map(|(index, column)| ColumnChartPlan {
            name: column.name.clone(),
            chart_type: column.recommended_chart,
            color: CHART_COLORS[index % CHART_COLORS.len()],
            description: describe_column(column),
        })
        .collect();

    plan
}

pub fn describe_column(column: &ColumnSummary) -> String {
    if column.is_empty {
        return format!("No data available for {}", column.name);
    }
    match column.column_type {
        ColumnType::Numeric => {
            let unit = column
                .unit
                .as_deref()
                .map(|u| format!(" {}", u))
                .unwrap_or_default();
            format!(
                "Shows {} values ranging from {:.2} to {:.2}{}",
                column.name,
                column.min.unwrap_or_default(),
                column.max.unwrap_or_default(),
                unit
            )
        }
        ColumnType::Categorical => format!(
            "Displays distribution of {} different {} categories",
            column.distribution.as_ref().map_or(0, |d| d.len()),
            column.name
        ),
        ColumnType::Date => format!("Timeline of {} data points over time", column.name),
        ColumnType::Text => format!("Visualization of {} data", column.name),
    }
}

fn relation_description(x_axis: &str, y_axis: &str, has_data: bool) -> String {
    if has_data {
        format!("Visualizes {} values across different {} values", y_axis, x_axis)
    } else {
        format!("No related data available between {} and {}", x_axis, y_axis)
    }
}

/// Rows where both columns hold data, ordered along the x-axis.
///
/// The whole series is ordered numerically when every x is a number,
/// chronologically when every x parses as a date, and as text otherwise.
pub fn relation_series(records: &[Record], x_axis: &str, y_axis: &str) -> Vec<SeriesPoint> {
    let mut points: Vec<SeriesPoint> = records
        .iter()
        .filter_map(|record| {
            let name = record.get(x_axis).filter(|v| !v.is_blank())?;
            let value = record.get(y_axis).filter(|v| !v.is_blank())?;
            Some(SeriesPoint {
                name: name.clone(),
                value: value.clone(),
            })
        })
        .collect();

    if points.iter().all(|p| p.name.as_number().is_some()) {
        points.sort_by(|a, b| compare_numbers(&a.name, &b.name));
        return points;
    }

    let dates: Option<Vec<_>> = points.iter().map(|p| parse_date(&p.name.to_string())).collect();
    match dates {
        Some(dates) => {
            let mut keyed: Vec<_> = dates.into_iter().zip(points).collect();
            keyed.sort_by(|a, b| a.0.cmp(&b.0));
            keyed.into_iter().map(|(_, point)| point).collect()
        }
        None => {
            points.sort_by_cached_key(|p| p.name.to_string());
            points
        }
    }
}

fn compare_numbers(a: &CellValue, b: &CellValue) -> Ordering {
    match (a.as_number(), b.as_number()) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        _ => Ordering::Equal,
    }
}
