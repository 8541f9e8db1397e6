//! Google News RSS headline source.
//!
//! Google News publishes one RSS edition per country/language pair and one
//! feed per topic section. This module maps a [`Category`] and a country code
//! onto that URL scheme, downloads the feed and turns its items into
//! [`Headline`]s.
//!
//! ## For contributors
//!
//! Parsing lives in [`GoogleNewsSource::parse_channel`], which does no I/O,
//! so feed quirks can be pinned down with inline XML in the tests below.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;

use super::{Headline, HeadlineSource};
use crate::locale::{default_language_for_country, Category};

/// Default feed root.
pub const GOOGLE_NEWS_RSS: &str = "https://news.google.com/rss";

/// A Google News RSS data source.
pub struct GoogleNewsSource {
    /// Feed root, e.g. `https://news.google.com/rss`.
    base: String,
    client: reqwest::Client,
}

impl GoogleNewsSource {
    pub fn new(base: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Build the feed URL for a category in a country's edition.
    pub fn feed_url(&self, category: Category, country: &str) -> Result<Url> {
        let country = country.to_ascii_uppercase();
        let language = default_language_for_country(&country);
        let (lang, hl) = match language.split_once('-') {
            // zh-CN, zh-TW and zh-HK are already full tags.
            Some((lang, _)) => (lang.to_string(), language.to_string()),
            None => (language.to_string(), format!("{language}-{country}")),
        };
        let ceid = format!("{country}:{lang}");

        let path = match topic(category) {
            Some(topic) => format!("{}/headlines/section/topic/{topic}", self.base),
            None => self.base.clone(),
        };

        let params = [
            ("hl", hl.as_str()),
            ("gl", country.as_str()),
            ("ceid", ceid.as_str()),
        ];
        Url::parse_with_params(&path, &params)
            .with_context(|| format!("invalid feed base {:?}", self.base))
    }

    /// Parse an already-fetched [`rss::Channel`] into [`Headline`]s.
    ///
    /// The publisher comes from the item's `<source>` element, falling back
    /// to the channel title. Google appends " - Publisher" to every title;
    /// that suffix is removed.
    pub fn parse_channel(channel: &rss::Channel) -> Vec<Headline> {
        channel
            .items()
            .iter()
            .filter_map(|item| {
                let raw_title = item.title()?.trim();
                if raw_title.is_empty() {
                    return None;
                }

                let source = item
                    .source()
                    .and_then(|s| s.title())
                    .unwrap_or_else(|| channel.title())
                    .trim()
                    .to_string();

                let title = raw_title
                    .strip_suffix(source.as_str())
                    .and_then(|rest| rest.trim_end().strip_suffix('-'))
                    .map(str::trim_end)
                    .filter(|t| !t.is_empty() && !source.is_empty())
                    .unwrap_or(raw_title)
                    .to_string();

                Some(Headline {
                    title,
                    source,
                    url: item.link().unwrap_or("#").to_string(),
                })
            })
            .collect()
    }
}

fn topic(category: Category) -> Option<&'static str> {
    match category {
        Category::General => None,
        Category::Business => Some("BUSINESS"),
        Category::Entertainment => Some("ENTERTAINMENT"),
        Category::Health => Some("HEALTH"),
        Category::Science => Some("SCIENCE"),
        Category::Sports => Some("SPORTS"),
        Category::Technology => Some("TECHNOLOGY"),
    }
}

#[async_trait]
impl HeadlineSource for GoogleNewsSource {
    fn name(&self) -> &str {
        "google-news"
    }

    async fn fetch(&self, category: Category, country: &str) -> Result<Vec<Headline>> {
        let url = self.feed_url(category, country)?;
        tracing::debug!(%url, "fetching headlines");

        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()
            .context("news fetch failed")?
            .bytes()
            .await?;
        let channel = rss::Channel::read_from(body.as_ref())?;
        Ok(Self::parse_channel(&channel))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
