use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use super::utils::unique_header_name;
use crate::error::AppError;
use crate::models::{CellValue, Record};

static FLOAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*-?(\d+\.?|\.\d+|\d+\.\d+)([eE][-+]?\d+)?\s*$").expect("float pattern is valid")
});

// Integers beyond 2^53 lose precision as f64 and stay text
const MAX_SAFE_NUMBER: f64 = 9_007_199_254_740_992.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCsv {
    pub headers: Vec<String>,
    pub records: Vec<Record>,
}

/// Splits CSV text into a header list and typed records.
///
/// Numeric-looking fields become numbers and empty fields become nulls;
/// everything else is kept verbatim as text.
pub fn parse_csv(data: &str) -> Result<ParsedCsv, AppError> {
    let data = data.strip_prefix('\u{feff}').unwrap_or(data);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(data.as_bytes());

    let mut rows = reader.records();
    let header_row = match rows.next() {
        Some(row) => row?,
        None => return Err(AppError::ParseError("CSV file has no header row".to_string())),
    };

    let mut existing_names = HashSet::new();
    let headers: Vec<String> = header_row
        .iter()
        .map(|name| unique_header_name(name, &mut existing_names))
        .collect();

    let mut records = Vec::new();
    for row in rows {
        let row = row?;
        let record: Record = headers
            .iter()
            .enumerate()
            .map(|(idx, header)| (header.clone(), row.get(idx).map_or(CellValue::Null, to_cell)))
            .collect();
        records.push(record);
    }

    tracing::debug!("Parsed {} rows across {} columns", records.len(), headers.len());
    Ok(ParsedCsv { headers, records })
}

fn to_cell(field: &str) -> CellValue {
    if field.is_empty() {
        return CellValue::Null;
    }
    if FLOAT.is_match(field) {
        if let Ok(n) = field.trim().parse::<f64>() {
            if n.abs() < MAX_SAFE_NUMBER {
                return CellValue::Number(n);
            }
        }
    }
    CellValue::Text(field.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn types_cells_dynamically() {
        let parsed = parse_csv("Year,Temp,City\n2000,14.1,Paris\n2001,,\" Lyon \"\n").unwrap();

        assert_eq!(parsed.headers, vec!["Year", "Temp", "City"]);
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.records[0]["Year"], CellValue::Number(2000.0));
        assert_eq!(parsed.records[0]["Temp"], CellValue::Number(14.1));
        assert_eq!(parsed.records[0]["City"], CellValue::from("Paris"));
        assert_eq!(parsed.records[1]["Temp"], CellValue::Null);
        assert_eq!(parsed.records[1]["City"], CellValue::from(" Lyon "));
    }

    #[test]
    fn number_shapes() {
        assert_eq!(to_cell("-3"), CellValue::Number(-3.0));
        assert_eq!(to_cell(".5"), CellValue::Number(0.5));
        assert_eq!(to_cell("1."), CellValue::Number(1.0));
        assert_eq!(to_cell("2e3"), CellValue::Number(2000.0));
        assert_eq!(to_cell(" 7 "), CellValue::Number(7.0));
        assert_eq!(to_cell("1,000"), CellValue::from("1,000"));
        assert_eq!(to_cell("12abc"), CellValue::from("12abc"));
        assert_eq!(to_cell("2024-01-01"), CellValue::from("2024-01-01"));
        assert_eq!(to_cell("99999999999999999999"), CellValue::from("99999999999999999999"));
    }

    #[test]
    fn short_rows_fill_with_null_and_extra_fields_are_dropped() {
        let parsed = parse_csv("a,b\n1\n2,3,4\n").unwrap();
        assert_eq!(parsed.records[0]["b"], CellValue::Null);
        assert_eq!(parsed.records[1].len(), 2);
    }

    #[test]
    fn skips_empty_lines() {
        let parsed = parse_csv("a,b\n\n1,2\n\n3,4\n").unwrap();
        assert_eq!(parsed.records.len(), 2);
    }

    #[test]
    fn duplicate_headers_and_bom() {
        let parsed = parse_csv("\u{feff}id,id,name\n1,2,x\n").unwrap();
        assert_eq!(parsed.headers, vec!["id", "id_1", "name"]);
        assert_eq!(parsed.records[0]["id_1"], CellValue::Number(2.0));
    }

    #[test]
    fn header_only_file_has_no_records() {
        let parsed = parse_csv("a,b\n").unwrap();
        assert_eq!(parsed.headers.len(), 2);
        assert!(parsed.records.is_empty());
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(parse_csv(""), Err(AppError::ParseError(_))));
    }
}
