use crate::{Error, Result};

use std::env;

pub const URL_VAR: &str = "SUPABASE_URL";
pub const KEY_VAR: &str = "SUPABASE_KEY";

/// Backend endpoint and access key, read once at startup.
///
/// Both variables are required; a missing one fails fast before any
/// query can run.
#[derive(Debug, Clone)]
pub struct Config {
    pub url: String,
    pub key: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            url: require(URL_VAR)?,
            key: require(KEY_VAR)?,
        })
    }

    pub fn new(url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            key: key.into(),
        }
    }
}

fn require(var: &'static str) -> Result<String> {
    match env::var(var) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(Error::MissingEnv(var)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_variable_names_the_variable() {
        let error = require("SERIEBASE_TEST_UNSET").unwrap_err();

        assert!(matches!(error, Error::MissingEnv("SERIEBASE_TEST_UNSET")));
    }

    #[test]
    fn empty_variable_counts_as_missing() {
        // SAFETY: test runs single-threaded over this variable.
        unsafe { env::set_var("SERIEBASE_TEST_EMPTY", "") };

        let error = require("SERIEBASE_TEST_EMPTY").unwrap_err();

        assert!(matches!(error, Error::MissingEnv("SERIEBASE_TEST_EMPTY")));
    }
}
