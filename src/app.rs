use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use ratatui::widgets::ListState;

use crate::indicator::format_indicator;
use crate::locale::{self, Category};
use crate::pipeline::{PipelineEvent, Request};
use crate::share::{self, Browser, Clipboard};
use crate::source::{GeneratedEntry, Headline};
use crate::store::{Library, Preferences};

/// How long a notification stays on screen.
pub const NOTIFICATION_TTL: Duration = Duration::from_millis(1500);

pub const HEADLINE_PLACEHOLDER: &str = "Tap Generate...";
pub const POEM_PLACEHOLDER: &str = "...and turn a headline\ninto a 3-line poem";

/// Which list overlay, if any, is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    History,
    Favorites,
}

/// Work the main loop has to start on the runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Generate(Request),
    Prefetch {
        category: Category,
        country: String,
        announcement: String,
    },
}

pub struct Notification {
    pub text: String,
    shown_at: Instant,
}

pub struct App {
    pub prefs: Preferences,
    library: Arc<Library>,
    /// Shared with the animator so toggling applies mid-reveal.
    sound: Arc<AtomicBool>,
    clipboard: Box<dyn Clipboard>,
    browser: Box<dyn Browser>,
    pub headline_out: String,
    pub poem_out: String,
    /// Skeleton placeholder while a cycle is running.
    pub skeleton: bool,
    pub current: Option<Headline>,
    pub current_poem: String,
    /// Whether the current poem is in favorites.
    pub fav_active: bool,
    pub notification: Option<Notification>,
    pub overlay: Overlay,
    /// Selection within the open overlay.
    pub list_state: ListState,
    /// Mirrors the animator's busy flag, refreshed every tick.
    pub revealing: bool,
    pub quit: bool,
}

impl App {
    pub fn new(
        prefs: Preferences,
        library: Arc<Library>,
        sound: Arc<AtomicBool>,
        clipboard: Box<dyn Clipboard>,
        browser: Box<dyn Browser>,
    ) -> Self {
        sound.store(*prefs.sound.get(), Ordering::Relaxed);
        Self {
            prefs,
            library,
            sound,
            clipboard,
            browser,
            headline_out: HEADLINE_PLACEHOLDER.into(),
            poem_out: POEM_PLACEHOLDER.into(),
            skeleton: false,
            current: None,
            current_poem: String::new(),
            fav_active: false,
            notification: None,
            overlay: Overlay::None,
            list_state: ListState::default(),
            revealing: false,
            quit: false,
        }
    }

    /// Apply one event from a generation or prefetch task.
    pub fn apply(&mut self, event: PipelineEvent) {
        match event {
            PipelineEvent::Busy(busy) => self.skeleton = busy,
            PipelineEvent::HeadlineText(text) => self.headline_out = text,
            PipelineEvent::PoemText(text) => self.poem_out = text,
            PipelineEvent::Current(headline) => {
                self.current = Some(headline);
                self.current_poem.clear();
                self.fav_active = false;
            }
            PipelineEvent::Recorded { entry, favorited } => {
                // Headline and poem always come from the same entry.
                self.current = Some(entry.headline());
                self.current_poem = entry.poem;
                self.fav_active = favorited;
            }
            PipelineEvent::Toast(text) => self.notify(text),
        }
    }

    /// The selections a new cycle should use.
    pub fn request(&self) -> Request {
        Request {
            category: *self.prefs.category.get(),
            country: self.prefs.country.get().clone(),
            language: self.prefs.language.get().clone(),
        }
    }

    pub fn indicator(&self) -> String {
        format_indicator(
            self.current.as_ref(),
            *self.prefs.category.get(),
            self.prefs.country.get(),
            self.prefs.language.get(),
            self.sound_enabled(),
        )
    }

    // -- notifications -------------------------------------------------------

    pub fn notify(&mut self, text: impl Into<String>) {
        self.notification = Some(Notification {
            text: text.into(),
            shown_at: Instant::now(),
        });
    }

    pub fn expire_notification(&mut self, now: Instant) {
        if self
            .notification
            .as_ref()
            .is_some_and(|n| now.duration_since(n.shown_at) >= NOTIFICATION_TTL)
        {
            self.notification = None;
        }
    }

    // -- preferences ---------------------------------------------------------

    pub fn sound_enabled(&self) -> bool {
        *self.prefs.sound.get()
    }

    pub fn toggle_sound(&mut self) {
        let on = !self.sound_enabled();
        self.prefs.sound.set(on);
        self.sound.store(on, Ordering::Relaxed);
        self.notify(if on { "Sound on" } else { "Sound off" });
    }

    pub fn toggle_theme(&mut self) {
        let theme = self.prefs.theme.get().toggled();
        self.prefs.theme.set(theme);
    }

    /// Step the category. Ignored while text is being revealed.
    pub fn step_category(&mut self, forward: bool) -> Option<Effect> {
        if self.revealing {
            return None;
        }
        let current = *self.prefs.category.get();
        let category = if forward { current.next() } else { current.previous() };
        self.prefs.category.set(category);
        Some(Effect::Prefetch {
            category,
            country: self.prefs.country.get().clone(),
            announcement: format!("Category: {}", category.label()),
        })
    }

    pub fn step_country(&mut self, step: isize) -> Option<Effect> {
        let country = locale::step_country(self.prefs.country.get(), step).to_string();
        self.prefs.country.set(country.clone());
        Some(Effect::Prefetch {
            category: *self.prefs.category.get(),
            announcement: format!("Country: {}", locale::country_name(&country)),
            country,
        })
    }

    pub fn cycle_language(&mut self) {
        let language = self.prefs.language.get().next();
        let message = match &language {
            locale::LanguageChoice::Auto => "Haiku language: Auto".to_string(),
            locale::LanguageChoice::Explicit(code) => format!(
                "Haiku language: {}",
                locale::language_name(code).unwrap_or(code.as_str())
            ),
        };
        self.prefs.language.set(language);
        self.notify(message);
    }

    // -- current poem --------------------------------------------------------

    fn copy(&mut self, text: &str, success: &str) {
        match self.clipboard.copy(text) {
            Ok(()) => self.notify(success),
            Err(e) => {
                tracing::warn!(error = %e, "clipboard unavailable");
                self.notify("Clipboard unavailable");
            }
        }
    }

    /// The current headline and poem, when both exist.
    fn current_pair(&self) -> Option<(Headline, String)> {
        let headline = self.current.clone()?;
        (!self.current_poem.is_empty()).then(|| (headline, self.current_poem.clone()))
    }

    pub fn copy_current(&mut self) {
        if let Some((headline, poem)) = self.current_pair() {
            self.copy(&share::copy_text(&poem, &headline), "Copied!");
        }
    }

    pub fn share_tweet(&mut self) {
        let Some((headline, poem)) = self.current_pair() else {
            return;
        };
        match share::tweet_url(&poem, &headline) {
            Ok(url) => self.copy(url.as_str(), "Share link copied"),
            Err(e) => tracing::warn!(error = %e, "could not build share link"),
        }
    }

    pub fn share_facebook(&mut self) {
        let Some(headline) = self.current.clone() else {
            return;
        };
        match share::facebook_url(&headline) {
            Ok(url) => self.copy(url.as_str(), "Share link copied"),
            Err(e) => tracing::warn!(error = %e, "could not build share link"),
        }
    }

    /// The current headline and poem as an entry under today's selections.
    fn current_entry(&self) -> Option<GeneratedEntry> {
        let (headline, poem) = self.current_pair()?;
        let country = self.prefs.country.get();
        Some(GeneratedEntry::new(
            &headline,
            poem,
            chrono::Utc::now(),
            country.clone(),
            *self.prefs.category.get(),
            self.prefs.language.get().resolve(country),
        ))
    }

    pub fn toggle_favorite_current(&mut self) {
        let Some(entry) = self.current_entry() else {
            return;
        };
        let now_favorited = self.library.toggle_favorite(entry);
        self.fav_active = now_favorited;
        self.notify(if now_favorited {
            "Added to favorites"
        } else {
            "Removed from favorites"
        });
    }

    // -- overlays ------------------------------------------------------------

    pub fn open_overlay(&mut self, overlay: Overlay) {
        self.overlay = overlay;
        self.list_state = ListState::default();
        self.select_first();
    }

    pub fn close_overlay(&mut self) {
        self.overlay = Overlay::None;
    }

    /// Entries of the open overlay, most recent first.
    pub fn overlay_entries(&self) -> Vec<GeneratedEntry> {
        match self.overlay {
            Overlay::None => Vec::new(),
            Overlay::History => self.library.history(),
            Overlay::Favorites => self.library.favorites(),
        }
    }

    fn overlay_len(&self) -> usize {
        match self.overlay {
            Overlay::None => 0,
            Overlay::History => self.library.history_len(),
            Overlay::Favorites => self.library.favorites_len(),
        }
    }

    fn selected_entry(&self) -> Option<GeneratedEntry> {
        let i = self.list_state.selected()?;
        self.overlay_entries().into_iter().nth(i)
    }

    pub fn copy_selected(&mut self) {
        if let Some(entry) = self.selected_entry() {
            self.copy(&share::copy_text(&entry.poem, &entry.headline()), "Copied!");
        }
    }

    /// Open the selected entry's article, or copy its link when no browser
    /// can be launched. Entries without a real link are skipped.
    pub fn open_selected(&mut self) {
        let Some(url) = self
            .selected_entry()
            .and_then(|entry| share::article_url(&entry.url))
        else {
            return;
        };
        match self.browser.open(&url) {
            Ok(()) => self.notify("Opened in browser"),
            Err(e) => {
                tracing::warn!(error = %e, "could not open browser");
                self.copy(url.as_str(), "Link copied");
            }
        }
    }

    /// History overlay: add the selected entry to favorites if missing.
    pub fn favorite_selected(&mut self) {
        if self.overlay != Overlay::History {
            return;
        }
        if let Some(entry) = self.selected_entry() {
            if self.library.add_favorite(entry) {
                self.notify("Added to favorites");
            }
        }
    }

    /// Favorites overlay: remove the selected entry.
    pub fn remove_selected(&mut self) {
        if self.overlay != Overlay::Favorites {
            return;
        }
        if let Some(entry) = self.selected_entry() {
            self.library.remove_favorite(&entry.key());
            self.fav_active = self
                .current_entry()
                .is_some_and(|current| self.library.is_favorite(&current));
            self.notify("Removed from favorites");
            let len = self.overlay_len();
            if len == 0 {
                self.list_state.select(None);
            } else if self.list_state.selected().is_some_and(|i| i >= len) {
                self.list_state.select(Some(len - 1));
            }
        }
    }

    // -- navigation ----------------------------------------------------------

    pub fn select_next(&mut self) {
        let len = self.overlay_len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(len - 1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        if self.overlay_len() == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if self.overlay_len() > 0 {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        let len = self.overlay_len();
        if len > 0 {
            self.list_state.select(Some(len - 1));
        }
    }
}
