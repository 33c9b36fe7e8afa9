use serde::Deserialize;

/// A joined singular relation as the backend returns it.
///
/// The backend encodes one-to-one joins inconsistently: a plain object, a
/// one-element list, or null. Decoding into this variant once at the API
/// boundary keeps the rest of the crate on plain `Option`s.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Singular<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> Singular<T> {
    /// Collapses to a single object, taking the first element of a list.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::One(value) => Some(value),
            Self::Many(values) => values.into_iter().next(),
        }
    }
}

pub fn collapse<T>(relation: Option<Singular<T>>) -> Option<T> {
    relation.and_then(Singular::into_option)
}
