use crate::errors::LoadError;
use crate::models::{Metric, PerformanceRecord};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::BTreeMap;
use tracing::debug;

const DATE_ALIASES: &[&str] = &["date", "날짜"];

/// Tried against the value with all whitespace removed.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%Y%m%d",
    "%m/%d/%Y",
    "%Y년%m월%d일",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
];

/// Parses sheet CSV into records sorted by date, one per date.
///
/// The header row is checked positionally: date first, then the metric
/// columns in `Metric::ALL` order. Missing trailing columns read as zero and
/// columns past the last metric are ignored.
pub fn parse_csv(text: &str) -> Result<Vec<PerformanceRecord>, LoadError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    validate_headers(&headers)?;
    let metric_columns = (headers.len() - 1).min(Metric::ALL.len());

    let mut by_date: BTreeMap<NaiveDate, PerformanceRecord> = BTreeMap::new();
    let mut dropped = 0usize;

    for row in reader.records() {
        let row = row?;
        let Some(date) = row.get(0).and_then(parse_date) else {
            dropped += 1;
            continue;
        };

        let mut record = PerformanceRecord::empty(date);
        for (index, metric) in Metric::ALL.into_iter().take(metric_columns).enumerate() {
            let value = row.get(index + 1).map(coerce_count).unwrap_or(0);
            record.set(metric, value);
        }

        by_date
            .entry(date)
            .and_modify(|existing| existing.absorb(&record))
            .or_insert(record);
    }

    if dropped > 0 {
        debug!(dropped, "skipped rows without a parseable date");
    }

    Ok(by_date.into_values().collect())
}

fn validate_headers(headers: &StringRecord) -> Result<(), LoadError> {
    if headers.iter().all(|name| normalize_header(name).is_empty()) {
        return Err(LoadError::MissingHeader);
    }

    let expected = std::iter::once(("date", DATE_ALIASES))
        .chain(Metric::ALL.into_iter().map(|m| (m.key(), m.header_aliases())));

    for (position, ((key, aliases), found)) in expected.zip(headers.iter()).enumerate() {
        let name = normalize_header(found);
        if !aliases.iter().any(|alias| *alias == name) {
            return Err(LoadError::SchemaMismatch {
                position,
                expected: key,
                found: found.to_string(),
            });
        }
    }

    Ok(())
}

fn normalize_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_lowercase()
}

/// Permissive date parsing. Returns `None` for anything unrecognised.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let compact: String = trimmed
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let compact = compact.trim_end_matches('.');
    if compact.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(compact, format).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
                .map(|datetime| datetime.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|datetime| datetime.date_naive())
        })
}

/// Strips whitespace and thousands separators and reads a non-negative
/// count. Decimals truncate toward zero; anything else becomes 0.
pub fn coerce_count(raw: &str) -> u64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();

    if let Ok(value) = cleaned.parse::<u64>() {
        return value;
    }

    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => value.trunc() as u64,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn coerces_counts() {
        assert_eq!(coerce_count("1,234"), 1234);
        assert_eq!(coerce_count(" 56 "), 56);
        assert_eq!(coerce_count("abc"), 0);
        assert_eq!(coerce_count(""), 0);
        assert_eq!(coerce_count("12.9"), 12);
        assert_eq!(coerce_count("-4"), 0);
        assert_eq!(coerce_count("NaN"), 0);
    }

    #[test]
    fn parses_common_sheet_dates() {
        assert_eq!(parse_date("2024-01-05"), Some(date(2024, 1, 5)));
        assert_eq!(parse_date(" 2024/1/5 "), Some(date(2024, 1, 5)));
        assert_eq!(parse_date("2024. 1. 5."), Some(date(2024, 1, 5)));
        assert_eq!(parse_date("2024년 1월 5일"), Some(date(2024, 1, 5)));
        assert_eq!(parse_date("01/05/2024"), Some(date(2024, 1, 5)));
        assert_eq!(parse_date("2024-01-05 09:30:00"), Some(date(2024, 1, 5)));
        assert_eq!(parse_date("2024-01-05T09:30:00+09:00"), Some(date(2024, 1, 5)));
        assert_eq!(parse_date("soon"), None);
        assert_eq!(parse_date("   "), None);
        assert_eq!(parse_date("2024-02-30"), None);
    }

    #[test]
    fn rows_come_back_sorted_without_bad_dates() {
        let csv = "date,visitors,signups,posts,comments,churned\n\
                   2024-01-03,30,3,1,0,0\n\
                   not a date,999,9,9,9,9\n\
                   2024-01-01,\"1,000\",10,5,2,1\n\
                   ,5,5,5,5,5\n\
                   2024-01-02,abc,8,6,3,2\n";
        let records = parse_csv(csv).unwrap();
        let dates: Vec<_> = records.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 3)]);
        assert_eq!(records[0].visitors, 1000);
        assert_eq!(records[1].visitors, 0);
        assert_eq!(records[1].signups, 8);
    }

    #[test]
    fn accepts_korean_headers_and_missing_trailing_columns() {
        let csv = "\u{feff}날짜,방문자,가입자\n2024-01-01,100,10\n2024-01-02,120\n";
        let records = parse_csv(csv).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].signups, 10);
        assert_eq!(records[0].posts, 0);
        assert_eq!(records[1].visitors, 120);
        assert_eq!(records[1].signups, 0);
    }

    #[test]
    fn ignores_columns_past_the_schema() {
        let csv = "Date,Visitors,Signups,Posts,Comments,Churned,Notes\n\
                   2024-01-01,1,2,3,4,5,launch day\n";
        let records = parse_csv(csv).unwrap();
        assert_eq!(records[0].churned, 5);
    }

    #[test]
    fn duplicate_dates_are_merged() {
        let csv = "date,visitors,signups\n2024-01-01,10,1\n2024-01-01,5,2\n";
        let records = parse_csv(csv).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].visitors, 15);
        assert_eq!(records[0].signups, 3);
    }

    #[test]
    fn misnamed_column_is_a_schema_mismatch() {
        let csv = "date,signups,visitors\n2024-01-01,1,2\n";
        match parse_csv(csv) {
            Err(LoadError::SchemaMismatch {
                position,
                expected,
                found,
            }) => {
                assert_eq!(position, 1);
                assert_eq!(expected, "visitors");
                assert_eq!(found, "signups");
            }
            other => panic!("expected schema mismatch, got {other:?}"),
        }
    }

    #[test]
    fn empty_document_has_no_header() {
        assert!(matches!(parse_csv(""), Err(LoadError::MissingHeader)));
    }
}
