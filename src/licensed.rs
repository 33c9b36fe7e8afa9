//! Licensing announcements, independent of whether any release has shipped.

use crate::query::Direction;
use crate::{Client, Result, publisher, serie};

use chrono::{DateTime, Utc};
use futures_util::future;
use serde::Deserialize;

/// Shown while a publisher record has no display name yet.
pub const PENDING_LABEL: &str = "updating…";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Licensed {
    pub serie_id: serie::Id,
    pub publisher_id: publisher::Id,
    pub source: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A [`Licensed`] record with its publisher name resolved for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub licensed: Licensed,
    pub publisher_label: String,
}

const COLUMNS: &str = "serie_id,publisher_id,source,image_url,created_at";

/// The licensing record of one serie, if any.
pub async fn for_serie(client: &Client, serie: serie::Id) -> Result<Option<Licensed>> {
    client
        .from("licensed")
        .select(COLUMNS)
        .eq("serie_id", serie)
        .fetch_optional()
        .await
}

/// Every licensing record, newest first, labelled with its publisher name.
///
/// Labels are resolved with one lookup per record, issued concurrently and
/// awaited together. Fine while the licensing table stays small; batch the
/// resolution if it ever grows.
pub async fn list(client: &Client) -> Result<Vec<Entry>> {
    let records: Vec<Licensed> = client
        .from("licensed")
        .select(COLUMNS)
        .order("created_at", Direction::Descending)
        .order("publisher_id", Direction::Ascending)
        .fetch()
        .await?;

    let labels = future::try_join_all(
        records
            .iter()
            .map(|record| label(client, record.publisher_id)),
    )
    .await?;

    Ok(records
        .into_iter()
        .zip(labels)
        .map(|(licensed, publisher_label)| Entry {
            licensed,
            publisher_label,
        })
        .collect())
}

async fn label(client: &Client, id: publisher::Id) -> Result<String> {
    #[derive(Deserialize)]
    struct Name {
        name: Option<String>,
    }

    let row: Option<Name> = client
        .from("publishers")
        .select("name")
        .eq("id", id)
        .fetch_optional()
        .await?;

    Ok(label_for(row.and_then(|row| row.name)))
}

fn label_for(name: Option<String>) -> String {
    match name {
        Some(name) if !name.is_empty() => name,
        _ => PENDING_LABEL.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_publisher_keeps_its_name() {
        assert_eq!(label_for(Some("Planeta".to_owned())), "Planeta");
    }

    #[test]
    fn missing_or_empty_name_falls_back_to_the_placeholder() {
        assert_eq!(label_for(None), PENDING_LABEL);
        assert_eq!(label_for(Some(String::new())), PENDING_LABEL);
    }
}
