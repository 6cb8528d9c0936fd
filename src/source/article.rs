//! The core data type delivered by the article service.
//!
//! `Article` represents a single entry as the service sends it.  Once
//! received it is treated as an immutable value: the accumulator appends it
//! and the UI reads it, nobody rewrites it.
//!
//! ## For contributors
//!
//! If the service grows new fields, add them here with `#[serde(default)]`
//! so older servers keep working.  Nothing downstream needs to change —
//! accumulation and rendering are field-agnostic apart from what the list
//! row displays.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single article as delivered by the remote service.
///
/// Arrival order is the only order: the client never re-sorts, deduplicates,
/// or truncates what the server sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Server-assigned identifier.
    pub id: u64,

    /// Headline shown in the list.
    pub title: String,

    /// Full article text (shown truncated in the list row).
    #[serde(default)]
    pub body: String,

    /// Publication timestamp, if the server provides one.
    #[serde(default)]
    pub published: Option<DateTime<Utc>>,
}

/// One stream frame on the wire: a batch of zero or more articles.
///
/// The server streams these as newline-delimited JSON objects, e.g.
/// `{"articles":[{"id":1,"title":"..."}]}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListResponse {
    #[serde(default)]
    pub articles: Vec<Article>,
}
