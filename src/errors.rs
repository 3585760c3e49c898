use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn bad_gateway(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: err.to_string(),
        }
    }
}

impl From<LoadError> for AppError {
    fn from(err: LoadError) -> Self {
        Self::bad_gateway(err)
    }
}

impl From<QueryError> for AppError {
    fn from(err: QueryError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

/// Failures while fetching or normalizing the sheet.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to fetch sheet: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("sheet responded with status {0}")]
    Status(reqwest::StatusCode),
    #[error("failed to read sheet CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("sheet has no header row")]
    MissingHeader,
    #[error("column {position} should be '{expected}' but the sheet has '{found}'")]
    SchemaMismatch {
        position: usize,
        expected: &'static str,
        found: String,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("unknown view '{0}', expected daily, weekly or monthly")]
    UnknownGranularity(String),
    #[error("unknown metric '{0}'")]
    UnknownMetric(String),
}
