use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static YEAR_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?\d{4}$").expect("year pattern is valid"));
static YEAR_MONTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})[-/](\d{1,2})$").expect("year-month pattern is valid"));
static MONTH_NAME_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z]+)\.?\s+(\d{4})$").expect("month-name year pattern is valid")
});

const DATETIME_FORMATS: [&str; 9] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%b %d, %Y %H:%M:%S",
];

const DATE_FORMATS: [&str; 13] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%a %b %d %Y",
    "%A, %B %d, %Y",
    "%Y.%m.%d",
];

// Month names without a day, e.g. "March 2021" or "Mar 2021"
const MONTH_YEAR_FORMATS: [&str; 2] = ["%d %B %Y", "%d %b %Y"];

/// Single locale-agnostic attempt at reading a calendar date or timestamp.
pub fn parse_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.naive_utc());
    }

    // "%b %d %Y" would read "Feb 2024" as day 20 of year 24
    if let Some(caps) = MONTH_NAME_YEAR.captures(s) {
        let with_day = format!("1 {} {}", &caps[1], &caps[2]);
        return MONTH_YEAR_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(&with_day, format).ok())
            .and_then(|date| date.and_hms_opt(0, 0, 0));
    }

    for format in DATETIME_FORMATS.iter() {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }
    for format in DATE_FORMATS.iter() {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    if YEAR_ONLY.is_match(s) {
        let year: i32 = s.parse().ok()?;
        return NaiveDate::from_ymd_opt(year, 1, 1)?.and_hms_opt(0, 0, 0);
    }
    if let Some(caps) = YEAR_MONTH.captures(s) {
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, 1)?.and_hms_opt(0, 0, 0);
    }
    None
}

pub fn is_date_string(s: &str) -> bool {
    parse_date(s).is_some()
}

/// Case-insensitive substring test used for temporal column names.
pub fn name_contains(name: &str, keyword: &str) -> bool {
    name.to_lowercase().contains(keyword)
}

/// Keeps header names unique by suffixing repeats with `_1`, `_2`, ...
pub fn unique_header_name(name: &str, existing_names: &mut HashSet<String>) -> String {
    let mut candidate = name.to_string();
    let mut counter = 1;
    while !existing_names.insert(candidate.clone()) {
        candidate = format!("{}_{}", name, counter);
        counter += 1;
    }
    candidate
}

pub fn is_csv_filename(filename: &str) -> bool {
    filename.to_lowercase().ends_with(".csv")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_common_date_shapes() {
        for s in [
            "2023-01-15",
            "2023/01/15",
            "01/15/2023",
            "2023-01-15 10:30:00",
            "2023-01-15T10:30:00Z",
            "Tue, 1 Jul 2003 10:52:37 +0200",
            "January 5, 2021",
            "Mar 2021",
            "2021-03",
            "2000",
        ] {
            assert!(is_date_string(s), "{} should parse", s);
        }
    }

    #[test]
    fn rejects_non_dates() {
        for s in ["A", "Paris", "14.1", "", "  ", "2023-13-45", "hello 2021"] {
            assert!(!is_date_string(s), "{} should not parse", s);
        }
    }

    #[test]
    fn year_month_is_first_of_month() {
        let dt = parse_date("2021-03").unwrap();
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2021, 3, 1).unwrap());
    }

    #[test]
    fn month_name_and_year_keep_the_full_year() {
        let first_of = |y, m| NaiveDate::from_ymd_opt(y, m, 1).unwrap();
        assert_eq!(parse_date("Feb 2024").unwrap().date(), first_of(2024, 2));
        assert_eq!(parse_date("March 2021").unwrap().date(), first_of(2021, 3));
        assert_eq!(parse_date("Dec. 1999").unwrap().date(), first_of(1999, 12));
        assert!(parse_date("Dec 1999").unwrap() < parse_date("Jan 2024").unwrap());
        assert!(parse_date("Hello 2021").is_none());
    }

    #[test]
    fn keyword_match_ignores_case() {
        assert!(name_contains("Fiscal YEAR", "year"));
        assert!(name_contains("timestamp", "time"));
        assert!(!name_contains("Temp", "time"));
    }

    #[test]
    fn duplicate_headers_get_suffixes() {
        let mut seen = HashSet::new();
        assert_eq!(unique_header_name("a", &mut seen), "a");
        assert_eq!(unique_header_name("a", &mut seen), "a_1");
        assert_eq!(unique_header_name("a", &mut seen), "a_2");
        assert_eq!(unique_header_name("b", &mut seen), "b");
    }

    #[test]
    fn csv_extension_check() {
        assert!(is_csv_filename("data.CSV"));
        assert!(!is_csv_filename("data.xlsx"));
    }
}
