//! Command-line and environment configuration.

use std::path::PathBuf;

use clap::Parser;

use crate::source::{GEMINI_ENDPOINT, GEMINI_MODEL, GOOGLE_NEWS_RSS};

/// Turn live news headlines into three-line poems.
#[derive(Debug, Parser)]
#[command(name = "news-haiku", version, about)]
pub struct Cli {
    /// Root of the Google News RSS feeds.
    #[arg(long, env = "NEWS_HAIKU_FEED_BASE", default_value = GOOGLE_NEWS_RSS)]
    pub feed_base: String,

    /// Gemini API key (falls back to GOOGLE_API_KEY).
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Gemini model used for poems.
    #[arg(long, env = "GEMINI_MODEL", default_value = GEMINI_MODEL)]
    pub model: String,

    /// Generative Language API root.
    #[arg(long, env = "GEMINI_ENDPOINT", default_value = GEMINI_ENDPOINT)]
    pub endpoint: String,

    /// Where history, favorites, preferences and the log live.
    #[arg(long, env = "NEWS_HAIKU_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Show text at once, without typing animation or ticks.
    #[arg(long, env = "NEWS_HAIKU_REDUCE_MOTION")]
    pub reduce_motion: bool,

    /// Log level for the log file (overridden by RUST_LOG).
    #[arg(long, env = "NEWS_HAIKU_LOG", default_value = "info")]
    pub log_level: String,
}

impl Cli {
    pub fn api_key(&self) -> Option<String> {
        let present = |key: &String| !key.trim().is_empty();
        self.api_key
            .clone()
            .filter(present)
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok().filter(present))
    }

    /// Explicit data directory, else the platform data dir.
    pub fn data_dir(&self) -> Option<PathBuf> {
        self.data_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join("news-haiku")))
    }
}
