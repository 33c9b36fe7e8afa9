use crate::query::Query;
use crate::{Config, Result};

use std::time::Duration;

/// Handle to the hosted backend.
///
/// Cheap to clone; construct one at startup and pass it to the query
/// functions. Authentication headers are attached to every request.
#[derive(Debug, Clone)]
pub struct Client {
    pub(crate) http: reqwest::Client,
    pub(crate) url: String,
    pub(crate) key: String,
}

impl Client {
    pub fn new(config: Config) -> Self {
        let http = reqwest::ClientBuilder::new()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Build reqwest client");

        Self {
            http,
            url: config.url.trim_end_matches('/').to_owned(),
            key: config.key,
        }
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self::new(Config::from_env()?))
    }

    /// Starts a query against one backend table.
    pub fn from(&self, table: &'static str) -> Query<'_> {
        Query::new(self, table)
    }

    pub(crate) fn endpoint(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_strips_trailing_slash() {
        let client = Client::new(Config::new("https://example.supabase.co/", "key"));

        assert_eq!(
            client.endpoint("series"),
            "https://example.supabase.co/rest/v1/series"
        );
    }
}
