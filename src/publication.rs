use crate::query::Direction;
use crate::relation::{self, Singular};
use crate::{Client, Publisher, Result, publisher, serie};

use chrono::{Datelike, Days, Months, NaiveDate, Utc};
use serde::Deserialize;

use std::fmt;

/// One dated, priced release belonging to a serie.
#[derive(Debug, Clone, PartialEq)]
pub struct Publication {
    pub id: Id,
    pub serie_id: Option<serie::Id>,
    pub publisher_id: Option<publisher::Id>,
    pub name: String,
    pub edition: i32,
    pub date: NaiveDate,
    pub price: Option<f64>,
    /// Display cover: the first element of the backend's image list.
    pub image_url: Option<String>,
    pub wide: bool,
    pub publisher: Option<Publisher>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(transparent)]
pub struct Id(pub(crate) i64);

impl From<i64> for Id {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// An inclusive span of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Range {
    /// The first through last day of the month containing `date`.
    pub fn month_of(date: NaiveDate) -> Self {
        let start = date.with_day(1).expect("day 1 is valid in any month");

        Self {
            start,
            end: start + Months::new(1) - Days::new(1),
        }
    }

    pub fn current_month() -> Self {
        Self::month_of(Utc::now().date_naive())
    }
}

/// All entries in a calendar day, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct Day {
    pub date: NaiveDate,
    pub entries: Vec<Publication>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Row {
    id: Id,
    #[serde(default)]
    serie_id: Option<serie::Id>,
    #[serde(default)]
    publisher_id: Option<publisher::Id>,
    name: String,
    edition: i32,
    date: NaiveDate,
    #[serde(default)]
    price: Option<f64>,
    #[serde(default)]
    images: Option<Vec<String>>,
    #[serde(default)]
    wide: bool,
    #[serde(default)]
    publisher: Option<Singular<Publisher>>,
}

impl From<Row> for Publication {
    fn from(row: Row) -> Self {
        Self {
            id: row.id,
            serie_id: row.serie_id,
            publisher_id: row.publisher_id,
            name: row.name,
            edition: row.edition,
            date: row.date,
            price: row.price,
            image_url: row.images.and_then(|images| images.into_iter().next()),
            wide: row.wide,
            publisher: relation::collapse(row.publisher),
        }
    }
}

const CALENDAR_COLUMNS: &str =
    "id,serie_id,publisher_id,name,edition,date,price,images,wide,publisher:publishers(id,name)";

const SERIE_COLUMNS: &str = "id,serie_id,publisher_id,name,edition,date,price,images,wide";

/// Entries dated within `range`, inclusive on both ends.
///
/// `range` defaults to the current month. An empty `publishers` slice means
/// no publisher filter. The sort is a fixed tie-break chain: date (direction
/// per `ascending`), wide releases first, then name, then newest edition.
pub async fn list_in_range(
    client: &Client,
    range: Option<Range>,
    publishers: &[publisher::Id],
    ascending: bool,
) -> Result<Vec<Publication>> {
    let range = range.unwrap_or_else(Range::current_month);

    let mut query = client
        .from("publications")
        .select(CALENDAR_COLUMNS)
        .gte("date", range.start)
        .lte("date", range.end);

    if !publishers.is_empty() {
        query = query.any_of("publisher_id", publishers.iter().copied());
    }

    let rows: Vec<Row> = query
        .order("date", Direction::from_ascending(ascending))
        .order("wide", Direction::Descending)
        .order("name", Direction::Ascending)
        .order("edition", Direction::Descending)
        .fetch()
        .await?;

    Ok(rows.into_iter().map(Publication::from).collect())
}

/// Entries in `range` partitioned into one [`Day`] per distinct date.
///
/// Days appear in first-occurrence order of the (already sorted) entries;
/// entry order within a day is preserved.
pub async fn list_grouped_by_date(
    client: &Client,
    range: Option<Range>,
    publishers: &[publisher::Id],
    ascending: bool,
) -> Result<Vec<Day>> {
    let entries = list_in_range(client, range, publishers, ascending).await?;

    Ok(group_by_date(entries))
}

/// All publications of one serie, oldest first, newest edition first.
pub async fn list_by_serie(
    client: &Client,
    serie: serie::Id,
    limit: Option<usize>,
) -> Result<Vec<Publication>> {
    let mut query = client
        .from("publications")
        .select(SERIE_COLUMNS)
        .eq("serie_id", serie)
        .order("date", Direction::Ascending)
        .order("edition", Direction::Descending);

    if let Some(limit) = limit {
        query = query.limit(limit);
    }

    let rows: Vec<Row> = query.fetch().await?;

    Ok(rows.into_iter().map(Publication::from).collect())
}

fn group_by_date(entries: Vec<Publication>) -> Vec<Day> {
    let mut days: Vec<Day> = Vec::new();

    for entry in entries {
        match days.iter_mut().find(|day| day.date == entry.date) {
            Some(day) => day.entries.push(entry),
            None => days.push(Day {
                date: entry.date,
                entries: vec![entry],
            }),
        }
    }

    days
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(ymd: (i32, u32, u32)) -> NaiveDate {
        NaiveDate::from_ymd_opt(ymd.0, ymd.1, ymd.2).unwrap()
    }

    fn entry(name: &str, on: NaiveDate) -> Publication {
        Publication {
            id: Id(0),
            serie_id: None,
            publisher_id: None,
            name: name.to_owned(),
            edition: 1,
            date: on,
            price: None,
            image_url: None,
            wide: false,
            publisher: None,
        }
    }

    #[test]
    fn month_of_covers_first_through_last_day() {
        let range = Range::month_of(date((2024, 6, 17)));

        assert_eq!(range.start, date((2024, 6, 1)));
        assert_eq!(range.end, date((2024, 6, 30)));
    }

    #[test]
    fn month_of_handles_december() {
        let range = Range::month_of(date((2023, 12, 25)));

        assert_eq!(range.start, date((2023, 12, 1)));
        assert_eq!(range.end, date((2023, 12, 31)));
    }

    #[test]
    fn month_of_handles_leap_february() {
        let range = Range::month_of(date((2024, 2, 1)));

        assert_eq!(range.end, date((2024, 2, 29)));
    }

    #[test]
    fn grouping_is_lossless_and_keeps_first_occurrence_order() {
        let a = entry("a", date((2024, 1, 2)));
        let b = entry("b", date((2024, 1, 2)));
        let c = entry("c", date((2024, 1, 5)));

        let days = group_by_date(vec![a.clone(), b.clone(), c.clone()]);

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, date((2024, 1, 2)));
        assert_eq!(days[0].entries, vec![a, b]);
        assert_eq!(days[1].entries, vec![c]);
    }

    #[test]
    fn grouping_empty_input_yields_no_days() {
        assert!(group_by_date(Vec::new()).is_empty());
    }

    #[test]
    fn cover_is_the_first_image() {
        let row: Row = serde_json::from_str(
            r#"{
                "id": 7,
                "name": "Volume 1",
                "edition": 1,
                "date": "2024-01-01",
                "images": ["cover.png", "back.png"],
                "publisher": [{"id": 3, "name": "Ivrea"}]
            }"#,
        )
        .unwrap();

        let publication = Publication::from(row);

        assert_eq!(publication.image_url.as_deref(), Some("cover.png"));
        assert_eq!(
            publication.publisher.and_then(|publisher| publisher.name),
            Some("Ivrea".to_owned())
        );
    }

    #[test]
    fn missing_image_list_means_no_cover() {
        let row: Row = serde_json::from_str(
            r#"{"id": 7, "name": "Volume 1", "edition": 1, "date": "2024-01-01"}"#,
        )
        .unwrap();

        assert_eq!(Publication::from(row).image_url, None);
    }
}
