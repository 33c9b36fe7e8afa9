use serde::Deserialize;

use std::fmt;
use std::sync::Arc;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("request failed: {0}")]
    RequestFailed(Arc<reqwest::Error>),
    #[error("backend rejected the query: {0}")]
    Backend(BackendError),
    #[error("invalid response body: {0}")]
    Decode(Arc<serde_json::Error>),
    #[error("no matching row")]
    NotFound,
    #[error("missing environment variable: {0}")]
    MissingEnv(&'static str),
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Self::RequestFailed(Arc::new(error))
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Decode(Arc::new(error))
    }
}

/// An error body reported by the backend, surfaced to callers unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BackendError {
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(code) = &self.code {
            write!(f, "{} ({code})", self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_error_body_survives_unchanged() {
        let error: BackendError = serde_json::from_str(
            r#"{
                "message": "permission denied for table series",
                "code": "42501",
                "details": null,
                "hint": null
            }"#,
        )
        .unwrap();

        assert_eq!(error.message, "permission denied for table series");
        assert_eq!(error.code.as_deref(), Some("42501"));
        assert_eq!(
            error.to_string(),
            "permission denied for table series (42501)"
        );
    }
}
