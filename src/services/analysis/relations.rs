use std::collections::HashSet;

use super::types::{ChartType, ColumnSummary, ColumnType, RelatedColumns};
use super::utils::name_contains;
use crate::models::Record;

const TEMPORAL_KEYWORDS: [&str; 4] = ["year", "month", "date", "time"];

/// Charts handed out in turn when nothing about the axis suggests one.
const VARIETY_ROTATION: [ChartType; 5] = [
    ChartType::Column,
    ChartType::Line,
    ChartType::Area,
    ChartType::Bar,
    ChartType::Scatter,
];

const YEAR_LINE_MIN_ROWS: usize = 15;
const SCATTER_MIN_UNIQUE_DATES: usize = 20;

/// Pairs each temporal column with the numeric column directly to its right.
///
/// `summaries` must be index-aligned with `headers`. Every x-axis yields at
/// most one relation, and only the immediately adjacent column is considered.
pub fn find_related_columns(
    headers: &[String],
    summaries: &[ColumnSummary],
    records: &[Record],
) -> Vec<RelatedColumns> {
    let mut seen_axes = HashSet::new();

    summaries
        .iter()
        .filter(|summary| is_axis_candidate(summary))
        .fold(Vec::new(), |mut related, x_axis| {
            if !seen_axes.insert(x_axis.name.as_str()) {
                return related;
            }
            if let Some(y_axis) = adjacent_measure(headers, summaries, &x_axis.name) {
                let recommended = pick_chart(x_axis, records.len(), related.len());
                tracing::debug!(
                    x_axis = %x_axis.name,
                    y_axis = %y_axis.name,
                    chart = %recommended,
                    "related columns found"
                );
                related.push(RelatedColumns::pair(&x_axis.name, &y_axis.name, recommended));
            }
            related
        })
}

fn is_axis_candidate(summary: &ColumnSummary) -> bool {
    let temporal = summary.column_type == ColumnType::Date
        || TEMPORAL_KEYWORDS
            .iter()
            .any(|keyword| name_contains(&summary.name, keyword));
    temporal && !summary.is_empty
}

fn adjacent_measure<'a>(
    headers: &[String],
    summaries: &'a [ColumnSummary],
    x_name: &str,
) -> Option<&'a ColumnSummary> {
    let x_index = headers.iter().position(|h| h == x_name)?;
    summaries
        .get(x_index + 1)
        .filter(|next| next.column_type == ColumnType::Numeric && !next.is_empty)
}

/// `accepted` is the number of relations emitted before this one and drives
/// the fallback rotation.
fn pick_chart(x_axis: &ColumnSummary, record_count: usize, accepted: usize) -> ChartType {
    if name_contains(&x_axis.name, "year") {
        if record_count > YEAR_LINE_MIN_ROWS {
            ChartType::Line
        } else {
            ChartType::Column
        }
    } else if name_contains(&x_axis.name, "month") {
        ChartType::Line
    } else if x_axis.column_type == ColumnType::Date
        && x_axis.unique_values > SCATTER_MIN_UNIQUE_DATES
    {
        ChartType::Scatter
    } else {
        VARIETY_ROTATION[accepted % VARIETY_ROTATION.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CellValue;
    use crate::services::analysis::analyzer::analyze_column;

    fn summary(name: &str, column_type: ColumnType, unique_values: usize) -> ColumnSummary {
        ColumnSummary {
            name: name.to_string(),
            column_type,
            unique_values,
            has_nulls: false,
            min: None,
            max: None,
            average: None,
            distribution: None,
            recommended_chart: ChartType::Bar,
            unit: None,
            is_empty: false,
        }
    }

    fn empty(name: &str) -> ColumnSummary {
        ColumnSummary {
            is_empty: true,
            ..summary(name, ColumnType::Text, 0)
        }
    }

    fn names(summaries: &[ColumnSummary]) -> Vec<String> {
        summaries.iter().map(|s| s.name.clone()).collect()
    }

    fn rows(count: usize) -> Vec<Record> {
        vec![Record::new(); count]
    }

    #[test]
    fn year_and_temperature() {
        let records: Vec<Record> = (0..16)
            .map(|i| {
                Record::from([
                    ("Year".to_string(), CellValue::Number(2000.0 + i as f64)),
                    ("Temp".to_string(), CellValue::Number(14.1 + i as f64 / 10.0)),
                ])
            })
            .collect();
        let headers = vec!["Year".to_string(), "Temp".to_string()];
        let summaries: Vec<ColumnSummary> = headers.iter().map(|h| analyze_column(&records, h)).collect();

        assert_eq!(summaries[0].column_type, ColumnType::Numeric);
        assert_eq!(summaries[1].column_type, ColumnType::Numeric);

        let related = find_related_columns(&headers, &summaries, &records);
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].x_axis, "Year");
        assert_eq!(related[0].y_axis.as_slice(), ["Temp".to_string()]);
        assert_eq!(related[0].recommended, ChartType::Line);
        assert_eq!(related[0].title.as_deref(), Some("Temp by Year"));
    }

    #[test]
    fn short_year_series_uses_columns() {
        let summaries = vec![
            summary("year", ColumnType::Numeric, 10),
            summary("sales", ColumnType::Numeric, 10),
        ];
        let related = find_related_columns(&names(&summaries), &summaries, &rows(15));
        assert_eq!(related[0].recommended, ChartType::Column);
    }

    #[test]
    fn month_rainfall_notes() {
        let summaries = vec![
            summary("Month", ColumnType::Date, 12),
            summary("Rainfall", ColumnType::Numeric, 12),
            summary("Notes", ColumnType::Text, 12),
        ];
        let related = find_related_columns(&names(&summaries), &summaries, &rows(12));

        assert_eq!(related.len(), 1);
        assert_eq!(related[0].x_axis, "Month");
        assert_eq!(related[0].y_axis[0], "Rainfall");
        assert_eq!(related[0].recommended, ChartType::Line);
        assert!(related.iter().all(|r| r.columns().all(|c| c != "Notes")));
    }

    #[test]
    fn dense_dates_scatter() {
        let summaries = vec![
            summary("observed", ColumnType::Date, 21),
            summary("value", ColumnType::Numeric, 21),
        ];
        let related = find_related_columns(&names(&summaries), &summaries, &rows(21));
        assert_eq!(related[0].recommended, ChartType::Scatter);
    }

    #[test]
    fn fallback_rotates_by_accepted_count() {
        let summaries = vec![
            summary("start date", ColumnType::Text, 3),
            summary("a", ColumnType::Numeric, 3),
            summary("end date", ColumnType::Text, 3),
            summary("b", ColumnType::Numeric, 3),
            summary("Year", ColumnType::Numeric, 3),
            summary("c", ColumnType::Numeric, 3),
            summary("timestamp", ColumnType::Date, 3),
            summary("d", ColumnType::Numeric, 3),
        ];
        let related = find_related_columns(&names(&summaries), &summaries, &rows(3));
        let charts: Vec<ChartType> = related.iter().map(|r| r.recommended).collect();

        // the year relation still advances the rotation
        assert_eq!(
            charts,
            vec![ChartType::Column, ChartType::Line, ChartType::Column, ChartType::Bar]
        );
    }

    #[test]
    fn rotation_wraps_after_five() {
        let mut summaries = Vec::new();
        for i in 0..6 {
            summaries.push(summary(&format!("time {}", i), ColumnType::Text, 2));
            summaries.push(summary(&format!("v{}", i), ColumnType::Numeric, 2));
        }
        let related = find_related_columns(&names(&summaries), &summaries, &rows(2));
        assert_eq!(related.len(), 6);
        assert_eq!(related[4].recommended, ChartType::Scatter);
        assert_eq!(related[5].recommended, ChartType::Column);
    }

    #[test]
    fn skips_empty_and_non_numeric_neighbours() {
        let summaries = vec![
            empty("Date"),
            summary("x", ColumnType::Numeric, 4),
            summary("Year", ColumnType::Numeric, 4),
            empty("blank"),
            summary("time", ColumnType::Date, 4),
            summary("label", ColumnType::Categorical, 2),
            summary("month", ColumnType::Date, 4),
        ];
        let related = find_related_columns(&names(&summaries), &summaries, &rows(4));
        assert!(related.is_empty());
    }

    #[test]
    fn adjacent_column_only() {
        let summaries = vec![
            summary("Date", ColumnType::Date, 4),
            summary("Notes", ColumnType::Text, 4),
            summary("Value", ColumnType::Numeric, 4),
        ];
        let related = find_related_columns(&names(&summaries), &summaries, &rows(4));
        assert!(related.is_empty());
    }

    #[test]
    fn chained_axes_each_pair_once() {
        // "Year" can be both the y of "date" and the x of its own pair
        let summaries = vec![
            summary("date", ColumnType::Date, 4),
            summary("Year", ColumnType::Numeric, 4),
            summary("value", ColumnType::Numeric, 4),
        ];
        let related = find_related_columns(&names(&summaries), &summaries, &rows(4));

        assert_eq!(related.len(), 2);
        assert_eq!(related[0].x_axis, "date");
        assert_eq!(related[0].y_axis[0], "Year");
        assert_eq!(related[1].x_axis, "Year");
        assert_eq!(related[1].y_axis[0], "value");
        for r in &related {
            assert!(!r.y_axis.contains(&r.x_axis));
        }
    }

    #[test]
    fn no_columns_no_relations() {
        assert!(find_related_columns(&[], &[], &[]).is_empty());
    }
}
