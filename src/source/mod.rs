//! Remote collaborators: where headlines and poems come from.
//!
//! This module defines the [`HeadlineSource`] and [`PoemSource`] traits and
//! the shared [`Headline`] / [`GeneratedEntry`] types. Concrete
//! implementations live in sub-modules ([`rss`] for headlines, [`gemini`] for
//! poems).
//!
//! ## For contributors: adding a new backend
//!
//! 1. Create a new file in this directory (e.g. `newsapi.rs`).
//! 2. Define a struct and implement [`HeadlineSource`] or [`PoemSource`].
//! 3. Add the `mod` line below and re-export the struct.
//! 4. Construct it in `main.rs` in place of the default.
//!
//! The cache, pipeline and UI only ever see the traits.

mod gemini;
mod headline;
mod rss;

pub use gemini::{GeminiPoet, GEMINI_ENDPOINT, GEMINI_MODEL};
pub use headline::{EntryKey, GeneratedEntry, Headline};
pub use rss::{GoogleNewsSource, GOOGLE_NEWS_RSS};

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

use crate::locale::Category;

/// Anything that can produce a pool of headlines for a category and country.
///
/// Called from [`HeadlineCache`](crate::cache::HeadlineCache) on a spawned
/// task, so implementations must be `Send + Sync`. Errors are never shown to
/// the user; the cache falls back to its previous pool.
#[async_trait]
pub trait HeadlineSource: Send + Sync {
    /// Short label for logs.
    fn name(&self) -> &str;

    async fn fetch(&self, category: Category, country: &str) -> Result<Vec<Headline>>;
}

/// Why a poem could not be produced.
#[derive(Debug, Error)]
pub enum PoemError {
    #[error("no API key configured for the poem generator")]
    MissingApiKey,

    #[error("poem request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("poem generator returned no text")]
    Empty,
}

/// Anything that can write a short poem about a headline.
#[async_trait]
pub trait PoemSource: Send + Sync {
    fn name(&self) -> &str;

    /// Write a poem about `headline` in `language` (a concrete code such as
    /// "lt", never "auto"). The result has at most three non-empty lines.
    async fn compose(&self, headline: &str, language: &str) -> Result<String, PoemError>;
}
