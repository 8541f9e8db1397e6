//! Test doubles shared by the unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;

use crate::locale::Category;
use crate::sound::{Beeper, Tone};
use crate::source::{GeneratedEntry, Headline, HeadlineSource, PoemError, PoemSource};

/// Shorthand entry whose url is derived from the title.
pub fn entry(title: &str, poem: &str) -> GeneratedEntry {
    GeneratedEntry::new(
        &Headline::new(title, "Example News", format!("https://example.com/{title}")),
        poem,
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        "US",
        Category::General,
        "en",
    )
}

/// Serves a fixed list of headlines and counts fetches.
pub struct StaticHeadlines {
    items: Vec<Headline>,
    fetches: AtomicUsize,
    fail: AtomicBool,
    requests: Mutex<Vec<(Category, String)>>,
}

impl StaticHeadlines {
    pub fn new(titles: &[&str]) -> Self {
        Self {
            items: titles
                .iter()
                .map(|t| Headline::new(*t, "Example News", format!("https://example.com/{t}")))
                .collect(),
            fetches: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Make every following fetch fail until reset.
    pub fn fail_next(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<(Category, String)> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl HeadlineSource for StaticHeadlines {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch(&self, category: Category, country: &str) -> Result<Vec<Headline>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push((category, country.to_string()));
        if self.fail.load(Ordering::SeqCst) {
            return Err(anyhow!("network down"));
        }
        Ok(self.items.clone())
    }
}

/// Replies with queued results, then with a default poem.
#[derive(Default)]
pub struct ScriptedPoet {
    replies: Mutex<VecDeque<Result<String, PoemError>>>,
    requests: Mutex<Vec<(String, String)>>,
    delay: Duration,
}

impl ScriptedPoet {
    /// A poet that takes `delay` to answer each request.
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn push(&self, reply: Result<String, PoemError>) {
        self.replies.lock().push_back(reply);
    }

    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl PoemSource for ScriptedPoet {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn compose(&self, headline: &str, language: &str) -> Result<String, PoemError> {
        self.requests
            .lock()
            .push((headline.to_string(), language.to_string()));
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok("old pond\na frog leaps in\nwater's sound".to_string()))
    }
}

/// Records every tone it is asked to play.
#[derive(Default)]
pub struct RecordingBeeper {
    tones: Mutex<Vec<Tone>>,
}

impl RecordingBeeper {
    pub fn tones(&self) -> Vec<Tone> {
        self.tones.lock().clone()
    }
}

impl Beeper for RecordingBeeper {
    fn beep(&self, tone: Tone) {
        self.tones.lock().push(tone);
    }
}
