//! Copy and share helpers.
//!
//! Share links are built and handed to the clipboard like any other text.
//! Only an entry's own article link is ever opened in a browser.

use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use reqwest::Url;

use crate::source::Headline;

const TWEET_INTENT: &str = "https://twitter.com/intent/tweet";
const FACEBOOK_SHARER: &str = "https://www.facebook.com/sharer/sharer.php";

/// Text placed on the clipboard for "copy": poem, blank line, title, link.
pub fn copy_text(poem: &str, headline: &Headline) -> String {
    format!("{poem}\n\n{}\n{}", headline.title, headline.url)
}

pub fn tweet_url(poem: &str, headline: &Headline) -> Result<Url> {
    let text = format!("{poem}\n\n{}", headline.title);
    Ok(Url::parse_with_params(
        TWEET_INTENT,
        &[("text", text.as_str()), ("url", headline.url.as_str())],
    )?)
}

pub fn facebook_url(headline: &Headline) -> Result<Url> {
    Ok(Url::parse_with_params(
        FACEBOOK_SHARER,
        &[("u", headline.url.as_str())],
    )?)
}

/// The article link of an entry, if it has a real one. Feeds without a
/// link give `"#"`.
pub fn article_url(url: &str) -> Option<Url> {
    let url = url.trim();
    if url.is_empty() || url == "#" {
        return None;
    }
    Url::parse(url)
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https"))
}

/// Where copied text goes.
pub trait Clipboard {
    fn copy(&mut self, text: &str) -> Result<()>;
}

/// The desktop clipboard, opened lazily on first copy.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl Clipboard for SystemClipboard {
    fn copy(&mut self, text: &str) -> Result<()> {
        if self.inner.is_none() {
            self.inner = Some(arboard::Clipboard::new()?);
        }
        if let Some(clipboard) = self.inner.as_mut() {
            clipboard.set_text(text.to_string())?;
        }
        Ok(())
    }
}

/// Something that can show a web page.
pub trait Browser {
    fn open(&mut self, url: &Url) -> Result<()>;
}

/// The platform's default browser, launched detached.
pub struct SystemBrowser;

impl Browser for SystemBrowser {
    fn open(&mut self, url: &Url) -> Result<()> {
        let mut command = if cfg!(target_os = "macos") {
            let mut c = Command::new("open");
            c.arg("--");
            c
        } else if cfg!(target_os = "windows") {
            let mut c = Command::new("cmd");
            c.args(["/C", "start", ""]);
            c
        } else {
            Command::new("xdg-open")
        };
        command
            .arg(url.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .context("launching browser")?;
        Ok(())
    }
}
