use crate::diagnosis::diagnose;
use crate::models::{
    ChartPoint, ChartSeries, DashboardResponse, Granularity, HeadlineMetrics, Metric,
    PerformanceRecord, TableRow,
};
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::BTreeMap;

/// Builds everything the page shows from daily records sorted by date.
///
/// Headline and diagnosis always look at the latest day; chart and table use
/// the requested granularity.
pub fn build_dashboard(
    records: &[PerformanceRecord],
    granularity: Granularity,
    metrics: &[Metric],
) -> DashboardResponse {
    let periods = aggregate(records, granularity);

    DashboardResponse {
        granularity,
        metrics: metrics.to_vec(),
        record_count: records.len(),
        headline: headline(records),
        diagnosis: records.last().map(diagnose),
        chart: chart_series(&periods, granularity, metrics),
        table: table_rows(&periods, granularity),
    }
}

/// Sums records into period buckets. Daily passes records through.
/// Output is ascending by bucket start.
pub fn aggregate(records: &[PerformanceRecord], granularity: Granularity) -> Vec<PerformanceRecord> {
    if granularity == Granularity::Daily {
        return records.to_vec();
    }

    let mut buckets: BTreeMap<NaiveDate, PerformanceRecord> = BTreeMap::new();
    for record in records {
        let start = bucket_start(record.date, granularity);
        buckets
            .entry(start)
            .or_insert_with(|| PerformanceRecord::empty(start))
            .absorb(record);
    }
    buckets.into_values().collect()
}

pub fn bucket_start(date: NaiveDate, granularity: Granularity) -> NaiveDate {
    match granularity {
        Granularity::Daily => date,
        Granularity::Weekly => week_start(date),
        Granularity::Monthly => date.with_day(1).unwrap_or(date),
    }
}

pub fn period_label(date: NaiveDate, granularity: Granularity) -> String {
    match granularity {
        Granularity::Daily => date_key(date),
        Granularity::Weekly => week_label(date),
        Granularity::Monthly => date.format("%Y-%m").to_string(),
    }
}

pub fn headline(records: &[PerformanceRecord]) -> Option<HeadlineMetrics> {
    let latest = records.last()?;
    let previous = records.len().checked_sub(2).map_or(latest, |index| &records[index]);

    Some(HeadlineMetrics {
        date: latest.date,
        visitors: latest.visitors,
        signups: latest.signups,
        posts: latest.posts,
        comments: latest.comments,
        churned: latest.churned,
        visitors_delta: delta(latest.visitors, previous.visitors),
        signups_delta: delta(latest.signups, previous.signups),
    })
}

pub fn chart_series(
    periods: &[PerformanceRecord],
    granularity: Granularity,
    metrics: &[Metric],
) -> Vec<ChartSeries> {
    metrics
        .iter()
        .map(|&metric| ChartSeries {
            metric,
            label: metric.label().to_string(),
            points: periods
                .iter()
                .map(|record| ChartPoint {
                    date: record.date,
                    label: period_label(record.date, granularity),
                    value: record.value(metric),
                })
                .collect(),
        })
        .collect()
}

/// Newest first, for the table.
pub fn table_rows(periods: &[PerformanceRecord], granularity: Granularity) -> Vec<TableRow> {
    periods
        .iter()
        .rev()
        .map(|record| TableRow {
            period: period_label(record.date, granularity),
            record: *record,
        })
        .collect()
}

/// Signed change, clamped to the `i64` range.
fn delta(current: u64, previous: u64) -> i64 {
    let change = i128::from(current) - i128::from(previous);
    i64::try_from(change).unwrap_or(if change > 0 { i64::MAX } else { i64::MIN })
}

fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Weeks start on Monday, matching ISO week numbering.
fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

fn week_label(date: NaiveDate) -> String {
    let iso = date.iso_week();
    format!("{}-W{:02}", iso.year(), iso.week())
}
