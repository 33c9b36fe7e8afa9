//! Read-only data access for the serie catalogue hosted behind a
//! PostgREST-style backend: publications, series, publishers, types, and
//! licensing records, reshaped into view-friendly structures.

pub mod client;
pub mod config;
pub mod error;
pub mod kind;
pub mod licensed;
pub mod publication;
pub mod publisher;
pub mod query;
pub mod serie;

mod relation;

pub use client::Client;
pub use config::Config;
pub use error::{BackendError, Error, Result};
pub use kind::Kind;
pub use licensed::Licensed;
pub use publication::Publication;
pub use publisher::Publisher;
pub use query::{Direction, Query};
pub use serie::Serie;
