use crate::query::Direction;
use crate::relation::{self, Singular};
use crate::{Client, Kind, Licensed, Publication, Publisher, Result, kind, publication, publisher};

use serde::Deserialize;

use std::fmt;

/// A tracked serie as listed in the catalogue, with its cover derived from
/// the nested image sources.
#[derive(Debug, Clone, PartialEq)]
pub struct Serie {
    pub id: Id,
    pub name: String,
    pub anilist_id: Option<i64>,
    pub status: String,
    pub kind: Option<Kind>,
    pub publisher: Option<Publisher>,
    /// First publication cover, else the licensing image, else nothing.
    pub image_url: Option<String>,
}

/// One serie with every relation attached.
#[derive(Debug, Clone, PartialEq)]
pub struct Detail {
    pub id: Id,
    pub name: String,
    pub anilist_id: Option<i64>,
    pub status: String,
    pub kind: Option<Kind>,
    pub publisher: Option<Publisher>,
    pub publications: Vec<Publication>,
    pub licensed: Option<Licensed>,
}

/// Identifier and name only, for index and navigation pages.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Summary {
    pub id: Id,
    pub name: String,
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

/// Membership filters for [`list`]; empty lists mean "no filter".
#[derive(Debug, Clone, Default)]
pub struct Filter {
    pub publishers: Vec<publisher::Id>,
    pub kinds: Vec<kind::Id>,
    pub statuses: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ListRow {
    id: Id,
    name: String,
    #[serde(default)]
    anilist_id: Option<i64>,
    status: String,
    #[serde(default, rename = "type")]
    kind: Option<Singular<Kind>>,
    #[serde(default)]
    publisher: Option<Singular<Publisher>>,
    #[serde(default)]
    publications: Option<Vec<Cover>>,
    #[serde(default)]
    licensed: Option<Singular<LicensedImage>>,
}

#[derive(Debug, Clone, Deserialize)]
struct Cover {
    #[serde(default)]
    images: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
struct LicensedImage {
    #[serde(default)]
    image_url: Option<String>,
}

impl From<ListRow> for Serie {
    fn from(row: ListRow) -> Self {
        let image_url = cover_url(row.publications, row.licensed);

        Self {
            id: row.id,
            name: row.name,
            anilist_id: row.anilist_id,
            status: row.status,
            kind: relation::collapse(row.kind),
            publisher: relation::collapse(row.publisher),
            image_url,
        }
    }
}

fn cover_url(
    publications: Option<Vec<Cover>>,
    licensed: Option<Singular<LicensedImage>>,
) -> Option<String> {
    let published = publications
        .and_then(|covers| covers.into_iter().next())
        .and_then(|cover| cover.images)
        .and_then(|images| images.into_iter().next());

    published.or_else(|| relation::collapse(licensed).and_then(|licensed| licensed.image_url))
}

const LIST_COLUMNS: &str = "id,name,anilist_id,status,type:types(id,name,color),\
                            publisher:publishers(id,name),publications(name,images),\
                            licensed(image_url)";

const DETAIL_COLUMNS: &str = "id,name,anilist_id,status,type:types(id,name,color),\
                              publisher:publishers(id,name),\
                              publications(id,serie_id,publisher_id,name,edition,date,price,images,wide),\
                              licensed(serie_id,publisher_id,source,image_url,created_at)";

/// The catalogue listing: status first, then publisher, then name.
pub async fn list(client: &Client, filter: &Filter) -> Result<Vec<Serie>> {
    let mut query = client.from("series").select(LIST_COLUMNS);

    if !filter.publishers.is_empty() {
        query = query.any_of("publisher_id", filter.publishers.iter().copied());
    }

    if !filter.kinds.is_empty() {
        query = query.any_of("type_id", filter.kinds.iter().copied());
    }

    if !filter.statuses.is_empty() {
        query = query.any_of("status", filter.statuses.iter().cloned());
    }

    let rows: Vec<ListRow> = query
        .order("status", Direction::Ascending)
        .order("publisher_id", Direction::Ascending)
        .order("name", Direction::Ascending)
        .order_foreign("publications", "name", Direction::Ascending)
        .fetch()
        .await?;

    Ok(rows.into_iter().map(Serie::from).collect())
}

/// One serie with nested type, publisher, publications, and licensing.
///
/// Fails with [`crate::Error::NotFound`] when no serie matches.
pub async fn fetch_detail(client: &Client, id: Id) -> Result<Detail> {
    #[derive(Deserialize)]
    struct DetailRow {
        id: Id,
        name: String,
        #[serde(default)]
        anilist_id: Option<i64>,
        status: String,
        #[serde(default, rename = "type")]
        kind: Option<Singular<Kind>>,
        #[serde(default)]
        publisher: Option<Singular<Publisher>>,
        #[serde(default)]
        publications: Option<Vec<publication::Row>>,
        #[serde(default)]
        licensed: Option<Singular<Licensed>>,
    }

    let row: DetailRow = client
        .from("series")
        .select(DETAIL_COLUMNS)
        .eq("id", id)
        .order_foreign("publications", "date", Direction::Ascending)
        .order_foreign("publications", "edition", Direction::Descending)
        .limit_foreign("licensed", 1)
        .fetch_one()
        .await?;

    Ok(Detail {
        id: row.id,
        name: row.name,
        anilist_id: row.anilist_id,
        status: row.status,
        kind: relation::collapse(row.kind),
        publisher: relation::collapse(row.publisher),
        publications: row
            .publications
            .unwrap_or_default()
            .into_iter()
            .map(Publication::from)
            .collect(),
        licensed: relation::collapse(row.licensed),
    })
}

pub async fn list_ids(client: &Client) -> Result<Vec<Summary>> {
    client.from("series").select("id,name").fetch().await
}
