//! The data types shared between the headline source, the cache, the
//! pipeline and the persisted collections.
//!
//! `Headline` is what a feed produces. `GeneratedEntry` is a headline plus the
//! poem written for it and the selections in effect when it was written; it
//! is what history and favorites store.
//!
//! ## For contributors
//!
//! The serialized field names of [`GeneratedEntry`] are the on-disk format of
//! history and favorites. Renaming a field without a `#[serde(rename)]`
//! silently empties every user's collections on the next load.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::locale::Category;

/// A single news headline, normalised from any headline source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headline {
    /// Headline text, with any trailing " - Publisher" removed.
    pub title: String,

    /// Publisher name (e.g. "BBC News"). May be empty.
    pub source: String,

    /// Link to the article.
    pub url: String,
}

impl Headline {
    pub fn new(
        title: impl Into<String>,
        source: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            source: source.into(),
            url: url.into(),
        }
    }
}

/// A finished poem together with the headline it was written for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedEntry {
    pub title: String,
    pub source: String,
    pub url: String,

    /// The three-line poem.
    #[serde(rename = "haiku")]
    pub poem: String,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    /// Country edition the headline came from.
    pub country: String,

    #[serde(default)]
    pub category: Category,

    /// Concrete language code the poem was requested in. Never "auto".
    #[serde(rename = "haikuLang", default)]
    pub poem_language: String,
}

impl GeneratedEntry {
    pub fn new(
        headline: &Headline,
        poem: impl Into<String>,
        created_at: DateTime<Utc>,
        country: impl Into<String>,
        category: Category,
        poem_language: impl Into<String>,
    ) -> Self {
        Self {
            title: headline.title.clone(),
            source: headline.source.clone(),
            url: headline.url.clone(),
            poem: poem.into(),
            created_at,
            country: country.into(),
            category,
            poem_language: poem_language.into(),
        }
    }

    /// Identity used for de-duplication across history and favorites.
    pub fn key(&self) -> EntryKey {
        EntryKey(format!("{}|{}|{}", self.title, self.url, self.poem).to_lowercase())
    }

    pub fn headline(&self) -> Headline {
        Headline::new(&self.title, &self.source, &self.url)
    }
}

/// Case-insensitive composite of title, url and poem.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryKey(String);

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
