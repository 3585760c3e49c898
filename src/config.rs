use std::env;
use std::time::Duration;

pub const DEFAULT_SHEET_ID: &str = "1cYYSlXxnOwl7POi7tBrcdKLLGvlN2dDrWJ8XC5MU7-U";
pub const DEFAULT_SHEET_GID: &str = "1174906177";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_CACHE_TTL_SECS: u64 = 10;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub port: u16,
    pub sheet_url: String,
    pub cache_ttl: Duration,
    pub fetch_timeout: Duration,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let sheet_url = lookup("SHEET_CSV_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| {
                let id = lookup("SHEET_ID").unwrap_or_else(|| DEFAULT_SHEET_ID.to_string());
                let gid = lookup("SHEET_GID").unwrap_or_else(|| DEFAULT_SHEET_GID.to_string());
                export_url(&id, &gid)
            });

        Self {
            port: parse_or(&lookup, "PORT", DEFAULT_PORT),
            sheet_url,
            cache_ttl: Duration::from_secs(parse_or(&lookup, "SHEET_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)),
            fetch_timeout: Duration::from_secs(parse_or(
                &lookup,
                "SHEET_FETCH_TIMEOUT_SECS",
                DEFAULT_FETCH_TIMEOUT_SECS,
            )),
        }
    }
}

pub fn export_url(sheet_id: &str, gid: &str) -> String {
    format!("https://docs.google.com/spreadsheets/d/{sheet_id}/export?format=csv&gid={gid}")
}

fn parse_or<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key)
        .and_then(|value| value.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Settings {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_point_at_the_marketing_sheet() {
        let settings = settings(&[]);
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.cache_ttl, Duration::from_secs(10));
        assert_eq!(
            settings.sheet_url,
            "https://docs.google.com/spreadsheets/d/1cYYSlXxnOwl7POi7tBrcdKLLGvlN2dDrWJ8XC5MU7-U/export?format=csv&gid=1174906177"
        );
    }

    #[test]
    fn explicit_url_wins_over_sheet_id() {
        let settings = settings(&[
            ("SHEET_CSV_URL", "http://127.0.0.1:9000/sheet.csv"),
            ("SHEET_ID", "ignored"),
            ("PORT", "3000"),
            ("SHEET_CACHE_TTL_SECS", "0"),
        ]);
        assert_eq!(settings.sheet_url, "http://127.0.0.1:9000/sheet.csv");
        assert_eq!(settings.port, 3000);
        assert_eq!(settings.cache_ttl, Duration::ZERO);
    }

    #[test]
    fn unparseable_numbers_fall_back() {
        let settings = settings(&[("PORT", "eighty"), ("SHEET_GID", "42")]);
        assert_eq!(settings.port, 8080);
        assert!(settings.sheet_url.ends_with("gid=42"));
    }
}
