use crate::errors::QueryError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    pub date: NaiveDate,
    pub visitors: u64,
    pub signups: u64,
    pub posts: u64,
    pub comments: u64,
    pub churned: u64,
}

impl PerformanceRecord {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            visitors: 0,
            signups: 0,
            posts: 0,
            comments: 0,
            churned: 0,
        }
    }

    /// Adds every numeric field of `other` into `self`, keeping `self.date`.
    pub fn absorb(&mut self, other: &PerformanceRecord) {
        self.visitors = self.visitors.saturating_add(other.visitors);
        self.signups = self.signups.saturating_add(other.signups);
        self.posts = self.posts.saturating_add(other.posts);
        self.comments = self.comments.saturating_add(other.comments);
        self.churned = self.churned.saturating_add(other.churned);
    }

    pub fn value(&self, metric: Metric) -> u64 {
        match metric {
            Metric::Visitors => self.visitors,
            Metric::Signups => self.signups,
            Metric::Posts => self.posts,
            Metric::Comments => self.comments,
            Metric::Churned => self.churned,
        }
    }

    pub fn set(&mut self, metric: Metric, value: u64) {
        match metric {
            Metric::Visitors => self.visitors = value,
            Metric::Signups => self.signups = value,
            Metric::Posts => self.posts = value,
            Metric::Comments => self.comments = value,
            Metric::Churned => self.churned = value,
        }
    }
}

/// Numeric columns of the sheet, in column order after the date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Visitors,
    Signups,
    Posts,
    Comments,
    Churned,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::Visitors,
        Metric::Signups,
        Metric::Posts,
        Metric::Comments,
        Metric::Churned,
    ];

    pub const DEFAULT_SELECTION: [Metric; 2] = [Metric::Visitors, Metric::Signups];

    pub fn key(self) -> &'static str {
        match self {
            Metric::Visitors => "visitors",
            Metric::Signups => "signups",
            Metric::Posts => "posts",
            Metric::Comments => "comments",
            Metric::Churned => "churned",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::Visitors => "Visitors",
            Metric::Signups => "Signups",
            Metric::Posts => "Posts",
            Metric::Comments => "Comments",
            Metric::Churned => "Churned",
        }
    }

    /// Header names accepted for this column.
    pub fn header_aliases(self) -> &'static [&'static str] {
        match self {
            Metric::Visitors => &["visitors", "방문자"],
            Metric::Signups => &["signups", "가입자"],
            Metric::Posts => &["posts", "게시글"],
            Metric::Comments => &["comments", "댓글"],
            Metric::Churned => &["churned", "탈퇴자"],
        }
    }

    pub fn parse(raw: &str) -> Result<Self, QueryError> {
        let needle = raw.trim().to_ascii_lowercase();
        Metric::ALL
            .into_iter()
            .find(|metric| metric.key() == needle)
            .ok_or_else(|| QueryError::UnknownMetric(raw.trim().to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Granularity {
    pub const ALL: [Granularity; 3] = [Granularity::Daily, Granularity::Weekly, Granularity::Monthly];

    pub fn key(self) -> &'static str {
        match self {
            Granularity::Daily => "daily",
            Granularity::Weekly => "weekly",
            Granularity::Monthly => "monthly",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Granularity::Daily => "Daily",
            Granularity::Weekly => "Weekly",
            Granularity::Monthly => "Monthly",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, QueryError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "daily" | "day" => Ok(Granularity::Daily),
            "weekly" | "week" => Ok(Granularity::Weekly),
            "monthly" | "month" => Ok(Granularity::Monthly),
            _ => Err(QueryError::UnknownGranularity(raw.trim().to_string())),
        }
    }
}

/// What the sidebar asks for: a granularity and the metrics to chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardQuery {
    pub granularity: Granularity,
    pub metrics: Vec<Metric>,
}

impl Default for DashboardQuery {
    fn default() -> Self {
        Self {
            granularity: Granularity::Daily,
            metrics: Metric::DEFAULT_SELECTION.to_vec(),
        }
    }
}

impl DashboardQuery {
    /// Decodes `view` and `metrics` from URL query pairs.
    ///
    /// `metrics` may repeat or hold a comma separated list. When the key is
    /// absent the default selection applies; when present but blank the
    /// selection is empty.
    pub fn from_pairs(pairs: &[(String, String)]) -> Result<Self, QueryError> {
        let mut query = DashboardQuery::default();
        let mut explicit_metrics: Option<Vec<Metric>> = None;

        for (key, value) in pairs {
            match key.as_str() {
                "view" => query.granularity = Granularity::parse(value)?,
                "metrics" => {
                    let selected = explicit_metrics.get_or_insert_with(Vec::new);
                    for part in value.split(',').filter(|part| !part.trim().is_empty()) {
                        let metric = Metric::parse(part)?;
                        if !selected.contains(&metric) {
                            selected.push(metric);
                        }
                    }
                }
                _ => {}
            }
        }

        if let Some(mut metrics) = explicit_metrics {
            metrics.sort_by_key(|metric| Metric::ALL.iter().position(|m| m == metric));
            query.metrics = metrics;
        }

        Ok(query)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadlineMetrics {
    pub date: NaiveDate,
    pub visitors: u64,
    pub signups: u64,
    pub posts: u64,
    pub comments: u64,
    pub churned: u64,
    pub visitors_delta: i64,
    pub signups_delta: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    LowConversion,
    HighChurn,
    LowEngagement,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub kind: FindingKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub date: NaiveDate,
    pub conversion_rate: f64,
    pub posts_per_signup: f64,
    pub churn_rate: f64,
    pub findings: Vec<Finding>,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub label: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub metric: Metric,
    pub label: String,
    pub points: Vec<ChartPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub period: String,
    #[serde(flatten)]
    pub record: PerformanceRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub granularity: Granularity,
    pub metrics: Vec<Metric>,
    pub record_count: usize,
    pub headline: Option<HeadlineMetrics>,
    pub diagnosis: Option<Diagnosis>,
    pub chart: Vec<ChartSeries>,
    pub table: Vec<TableRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn query_defaults_to_daily_visitors_and_signups() {
        let query = DashboardQuery::from_pairs(&[]).unwrap();
        assert_eq!(query.granularity, Granularity::Daily);
        assert_eq!(query.metrics, vec![Metric::Visitors, Metric::Signups]);
    }

    #[test]
    fn query_accepts_repeated_and_comma_separated_metrics() {
        let query = DashboardQuery::from_pairs(&pairs(&[
            ("view", "weekly"),
            ("metrics", "churned,posts"),
            ("metrics", "posts"),
            ("metrics", "visitors"),
        ]))
        .unwrap();
        assert_eq!(query.granularity, Granularity::Weekly);
        assert_eq!(
            query.metrics,
            vec![Metric::Visitors, Metric::Posts, Metric::Churned]
        );
    }

    #[test]
    fn blank_metrics_key_means_no_selection() {
        let query = DashboardQuery::from_pairs(&pairs(&[("metrics", "")])).unwrap();
        assert!(query.metrics.is_empty());
    }

    #[test]
    fn unknown_values_are_rejected() {
        assert!(matches!(
            DashboardQuery::from_pairs(&pairs(&[("view", "hourly")])),
            Err(QueryError::UnknownGranularity(_))
        ));
        assert!(matches!(
            DashboardQuery::from_pairs(&pairs(&[("metrics", "revenue")])),
            Err(QueryError::UnknownMetric(_))
        ));
    }

    #[test]
    fn record_absorb_sums_fields() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut total = PerformanceRecord::empty(date);
        let mut other = PerformanceRecord::empty(date);
        other.set(Metric::Visitors, 7);
        other.set(Metric::Churned, 2);
        total.absorb(&other);
        total.absorb(&other);
        assert_eq!(total.value(Metric::Visitors), 14);
        assert_eq!(total.value(Metric::Churned), 4);
        assert_eq!(total.value(Metric::Posts), 0);
    }
}
