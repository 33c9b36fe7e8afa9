use crate::error::BackendError;
use crate::{Client, Error, Result};

use bytes::Bytes;
use serde::de::DeserializeOwned;

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    pub fn from_ascending(ascending: bool) -> Self {
        if ascending {
            Self::Ascending
        } else {
            Self::Descending
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

/// A filtered, sorted, projected read of one backend table.
///
/// Builder methods mirror the backend's query-string syntax: filters become
/// `column=op.value` parameters, ordering becomes `order=a.desc,b.asc`, and
/// order or limit keys scoped to a joined foreign table are prefixed with
/// that table's name. Nothing is sent until one of the fetch methods runs.
pub struct Query<'a> {
    client: &'a Client,
    table: &'static str,
    select: Option<String>,
    filters: Vec<(String, String)>,
    orders: Vec<(Option<&'static str>, String)>,
    limits: Vec<(Option<&'static str>, usize)>,
}

impl<'a> Query<'a> {
    pub(crate) fn new(client: &'a Client, table: &'static str) -> Self {
        Self {
            client,
            table,
            select: None,
            filters: Vec::new(),
            orders: Vec::new(),
            limits: Vec::new(),
        }
    }

    /// Column projection, including nested foreign-table columns.
    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.select = Some(columns.into());
        self
    }

    pub fn eq(self, column: &str, value: impl fmt::Display) -> Self {
        self.filter(column, format_args!("eq.{value}"))
    }

    pub fn gte(self, column: &str, value: impl fmt::Display) -> Self {
        self.filter(column, format_args!("gte.{value}"))
    }

    pub fn lte(self, column: &str, value: impl fmt::Display) -> Self {
        self.filter(column, format_args!("lte.{value}"))
    }

    /// Membership filter: the column's value is one of `values`.
    ///
    /// Values are double-quoted so commas and parentheses inside them cannot
    /// corrupt the list encoding.
    pub fn any_of<T: fmt::Display>(
        self,
        column: &str,
        values: impl IntoIterator<Item = T>,
    ) -> Self {
        let values = values
            .into_iter()
            .map(|value| quote(&value.to_string()))
            .collect::<Vec<_>>()
            .join(",");

        self.filter(column, format_args!("in.({values})"))
    }

    fn filter(mut self, column: &str, spec: impl fmt::Display) -> Self {
        self.filters.push((column.to_owned(), spec.to_string()));
        self
    }

    /// Appends a sort key. Keys accumulate into a fixed tie-break chain in
    /// call order.
    pub fn order(mut self, column: &str, direction: Direction) -> Self {
        self.orders
            .push((None, format!("{column}.{}", direction.keyword())));
        self
    }

    /// Sort key applied to the rows of a joined foreign table.
    pub fn order_foreign(
        mut self,
        foreign: &'static str,
        column: &str,
        direction: Direction,
    ) -> Self {
        self.orders
            .push((Some(foreign), format!("{column}.{}", direction.keyword())));
        self
    }

    pub fn limit(mut self, count: usize) -> Self {
        self.limits.push((None, count));
        self
    }

    /// Row cap applied to a joined foreign table instead of the top level.
    pub fn limit_foreign(mut self, foreign: &'static str, count: usize) -> Self {
        self.limits.push((Some(foreign), count));
        self
    }

    /// Executes the query, expecting a list of rows.
    pub async fn fetch<T: DeserializeOwned>(self) -> Result<Vec<T>> {
        let body = self.run(false).await?;

        Ok(serde_json::from_slice(&body)?)
    }

    /// Executes the query in single-row mode; exactly one row must match.
    pub async fn fetch_one<T: DeserializeOwned>(self) -> Result<T> {
        let body = self.run(true).await?;

        Ok(serde_json::from_slice(&body)?)
    }

    /// Executes the query capped to one row, returning it if present.
    pub async fn fetch_optional<T: DeserializeOwned>(self) -> Result<Option<T>> {
        let rows: Vec<T> = self.limit(1).fetch().await?;

        Ok(rows.into_iter().next())
    }

    async fn run(self, single: bool) -> Result<Bytes> {
        let url = self.client.endpoint(self.table);
        let params = self.params();

        log::info!("Querying {url} ({} parameters)", params.len());

        let mut request = self
            .client
            .http
            .get(&url)
            .query(&params)
            .header("apikey", &self.client.key)
            .bearer_auth(&self.client.key);

        if single {
            request = request.header("Accept", "application/vnd.pgrst.object+json");
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() {
            return Ok(body);
        }

        let error: BackendError = serde_json::from_slice(&body).unwrap_or_else(|_| BackendError {
            message: format!("{status}: {}", String::from_utf8_lossy(&body)),
            ..BackendError::default()
        });

        // The backend reports an unsatisfied single-row fetch as its own
        // error code rather than an empty result.
        if single && error.code.as_deref() == Some("PGRST116") {
            return Err(Error::NotFound);
        }

        Err(Error::Backend(error))
    }

    /// The query-string parameters this query sends, in wire order.
    pub(crate) fn params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();

        if let Some(select) = &self.select {
            params.push(("select".to_owned(), select.clone()));
        }

        params.extend(self.filters.iter().cloned());

        for scope in scopes(self.orders.iter().map(|(scope, _)| *scope)) {
            let keys = self
                .orders
                .iter()
                .filter(|(candidate, _)| *candidate == scope)
                .map(|(_, key)| key.as_str())
                .collect::<Vec<_>>()
                .join(",");

            params.push((scoped("order", scope), keys));
        }

        for (scope, count) in &self.limits {
            params.push((scoped("limit", *scope), count.to_string()));
        }

        params
    }
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn scoped(key: &str, scope: Option<&'static str>) -> String {
    match scope {
        None => key.to_owned(),
        Some(foreign) => format!("{foreign}.{key}"),
    }
}

fn scopes(
    all: impl Iterator<Item = Option<&'static str>>,
) -> impl Iterator<Item = Option<&'static str>> {
    let mut seen = Vec::new();

    for scope in all {
        if !seen.contains(&scope) {
            seen.push(scope);
        }
    }

    seen.into_iter()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;

    fn client() -> Client {
        Client::new(Config::new("https://example.supabase.co", "key"))
    }

    #[test]
    fn filters_keep_insertion_order() {
        let client = client();
        let query = client
            .from("publications")
            .select("id,name")
            .gte("date", "2024-01-01")
            .lte("date", "2024-01-31")
            .any_of("publisher_id", [3, 5]);

        assert_eq!(
            query.params(),
            vec![
                ("select".to_owned(), "id,name".to_owned()),
                ("date".to_owned(), "gte.2024-01-01".to_owned()),
                ("date".to_owned(), "lte.2024-01-31".to_owned()),
                ("publisher_id".to_owned(), r#"in.("3","5")"#.to_owned()),
            ]
        );
    }

    #[test]
    fn membership_values_with_reserved_characters_stay_intact() {
        let client = client();
        let query = client
            .from("series")
            .any_of("status", ["on hold, hiatus", r#"odd "status""#]);

        assert_eq!(
            query.params(),
            vec![(
                "status".to_owned(),
                r#"in.("on hold, hiatus","odd \"status\"")"#.to_owned()
            )]
        );
    }

    #[test]
    fn order_keys_chain_in_call_order() {
        let client = client();
        let query = client
            .from("publications")
            .order("date", Direction::Ascending)
            .order("wide", Direction::Descending)
            .order("name", Direction::Ascending)
            .order("edition", Direction::Descending);

        assert_eq!(
            query.params(),
            vec![(
                "order".to_owned(),
                "date.asc,wide.desc,name.asc,edition.desc".to_owned()
            )]
        );
    }

    #[test]
    fn foreign_order_and_limit_are_scoped() {
        let client = client();
        let query = client
            .from("series")
            .order("status", Direction::Ascending)
            .order_foreign("publications", "date", Direction::Ascending)
            .order_foreign("publications", "edition", Direction::Descending)
            .limit_foreign("publications", 1)
            .limit(10);

        assert_eq!(
            query.params(),
            vec![
                ("order".to_owned(), "status.asc".to_owned()),
                (
                    "publications.order".to_owned(),
                    "date.asc,edition.desc".to_owned()
                ),
                ("publications.limit".to_owned(), "1".to_owned()),
                ("limit".to_owned(), "10".to_owned()),
            ]
        );
    }

    #[tokio::test]
    async fn transport_failure_surfaces_as_request_failed() {
        // Discard port; nothing listens there, so the connection is refused
        // before any backend semantics come into play.
        let client = Client::new(Config::new("http://127.0.0.1:9", "key"));

        let result: Result<Vec<serde_json::Value>> = client.from("series").fetch().await;

        assert!(matches!(result, Err(Error::RequestFailed(_))));
    }
}
