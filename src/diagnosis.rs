use crate::models::{Diagnosis, Finding, FindingKind, PerformanceRecord};

pub const CONVERSION_FLOOR_PCT: f64 = 5.0;
pub const CHURN_CEILING_PCT: f64 = 10.0;
pub const POSTS_PER_SIGNUP_FLOOR: f64 = 0.5;

const SUGGESTIONS: [&str; 3] = [
    "Test a shorter signup form and a clearer call to action on the landing page.",
    "Send new members a welcome message that invites them to write a first post.",
    "Reach out to members who went quiet this week before they leave.",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ratios {
    pub conversion_rate: f64,
    pub posts_per_signup: f64,
    pub churn_rate: f64,
}

/// Ratios for one period. A zero denominator yields 0.
pub fn ratios(record: &PerformanceRecord) -> Ratios {
    Ratios {
        conversion_rate: ratio(record.signups, record.visitors) * 100.0,
        posts_per_signup: ratio(record.posts, record.signups),
        churn_rate: ratio(record.churned, record.signups) * 100.0,
    }
}

pub fn diagnose(record: &PerformanceRecord) -> Diagnosis {
    let Ratios {
        conversion_rate,
        posts_per_signup,
        churn_rate,
    } = ratios(record);

    let mut findings = Vec::new();
    if conversion_rate < CONVERSION_FLOOR_PCT {
        findings.push(Finding {
            kind: FindingKind::LowConversion,
            message: format!(
                "Conversion is {conversion_rate:.2}%, below {CONVERSION_FLOOR_PCT}%. Visitors arrive but few sign up."
            ),
        });
    }
    if churn_rate > CHURN_CEILING_PCT {
        findings.push(Finding {
            kind: FindingKind::HighChurn,
            message: format!(
                "Churn is {churn_rate:.2}% of new signups, above {CHURN_CEILING_PCT}%. Members are leaving faster than they settle in."
            ),
        });
    }
    if posts_per_signup < POSTS_PER_SIGNUP_FLOOR {
        findings.push(Finding {
            kind: FindingKind::LowEngagement,
            message: format!(
                "Only {posts_per_signup:.2} posts per signup, below {POSTS_PER_SIGNUP_FLOOR}. New members are not taking part yet."
            ),
        });
    }
    if findings.is_empty() {
        findings.push(Finding {
            kind: FindingKind::Stable,
            message: "Conversion, churn and engagement are all within range. Performance is stable.".to_string(),
        });
    }

    Diagnosis {
        date: record.date,
        conversion_rate,
        posts_per_signup,
        churn_rate,
        findings,
        suggestions: SUGGESTIONS.iter().map(|s| s.to_string()).collect(),
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
