use crate::{Client, Result};

use serde::Deserialize;

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Publisher {
    pub id: Id,
    pub name: Option<String>,
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

pub async fn fetch(client: &Client, id: Id) -> Result<Publisher> {
    client
        .from("publishers")
        .select("id,name")
        .eq("id", id)
        .fetch_one()
        .await
}

pub async fn list(client: &Client) -> Result<Vec<Publisher>> {
    client.from("publishers").select("id,name").fetch().await
}
