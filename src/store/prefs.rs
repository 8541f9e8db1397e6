//! User preferences persisted one value per key.
//!
//! Each [`Preference`] starts from the stored value when it parses, else from
//! a caller-supplied default (usually derived from the environment). Every
//! `set` writes through to storage.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::Storage;
use crate::locale::{self, Category, LanguageChoice};

pub const THEME_KEY: &str = "nh.theme";
pub const SOUND_KEY: &str = "nh.sound";
pub const COUNTRY_KEY: &str = "nh.country";
pub const CATEGORY_KEY: &str = "nh.category";
pub const LANGUAGE_KEY: &str = "nh.lang";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    /// Guess from `COLORFGBG` ("fg;bg"); backgrounds 7 and 9–15 are light.
    pub fn from_colorfgbg(value: &str) -> Option<Theme> {
        let bg: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
        Some(if bg == 7 || (9..=15).contains(&bg) {
            Theme::Light
        } else {
            Theme::Dark
        })
    }

    pub fn detect() -> Option<Theme> {
        std::env::var("COLORFGBG")
            .ok()
            .and_then(|v| Theme::from_colorfgbg(&v))
    }
}

/// A single persisted value.
pub struct Preference<T> {
    key: &'static str,
    value: T,
    store: Arc<dyn Storage>,
}

impl<T: Serialize + DeserializeOwned> Preference<T> {
    pub fn load(store: Arc<dyn Storage>, key: &'static str, default: impl FnOnce() -> T) -> Self {
        let stored = store.get(key).and_then(|raw| match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "ignoring unreadable preference");
                None
            }
        });
        Self {
            key,
            value: stored.unwrap_or_else(default),
            store,
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn set(&mut self, value: T) {
        match serde_json::to_string(&value) {
            Ok(raw) => {
                if let Err(e) = self.store.set(self.key, &raw) {
                    tracing::warn!(key = self.key, error = %e, "failed to persist preference");
                }
            }
            Err(e) => tracing::warn!(key = self.key, error = %e, "failed to serialize preference"),
        }
        self.value = value;
    }
}

/// The environment's country, else [`locale::DEFAULT_COUNTRY`].
fn default_country() -> String {
    locale::detect_country()
        .unwrap_or(locale::DEFAULT_COUNTRY)
        .to_string()
}

/// All user-facing selections.
pub struct Preferences {
    pub theme: Preference<Theme>,
    pub sound: Preference<bool>,
    pub country: Preference<String>,
    pub category: Preference<Category>,
    pub language: Preference<LanguageChoice>,
}

impl Preferences {
    pub fn load(store: Arc<dyn Storage>) -> Self {
        let mut country = Preference::load(Arc::clone(&store), COUNTRY_KEY, default_country);
        if !locale::is_known_country(country.get()) {
            tracing::warn!(country = %country.get(), "unknown stored country, using default");
            country.value = default_country();
        }

        Self {
            theme: Preference::load(Arc::clone(&store), THEME_KEY, || {
                Theme::detect().unwrap_or_default()
            }),
            sound: Preference::load(Arc::clone(&store), SOUND_KEY, || true),
            country,
            category: Preference::load(Arc::clone(&store), CATEGORY_KEY, Category::default),
            language: Preference::load(store, LANGUAGE_KEY, LanguageChoice::default),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn stored_values_win_over_defaults() {
        let store = Arc::new(MemoryStore::new());
        store.set(THEME_KEY, "\"light\"").unwrap();
        store.set(SOUND_KEY, "false").unwrap();
        store.set(COUNTRY_KEY, "\"LT\"").unwrap();
        store.set(CATEGORY_KEY, "\"sports\"").unwrap();
        store.set(LANGUAGE_KEY, "\"de\"").unwrap();

        let prefs = Preferences::load(store);
        assert_eq!(*prefs.theme.get(), Theme::Light);
        assert!(!*prefs.sound.get());
        assert_eq!(prefs.country.get(), "LT");
        assert_eq!(*prefs.category.get(), Category::Sports);
        assert_eq!(*prefs.language.get(), LanguageChoice::Explicit("de".into()));
    }

    #[test]
    fn corrupt_values_fall_back_to_defaults() {
        let store = Arc::new(MemoryStore::new());
        store.set(SOUND_KEY, "maybe").unwrap();
        store.set(CATEGORY_KEY, "\"weather\"").unwrap();

        let prefs = Preferences::load(store);
        assert!(*prefs.sound.get());
        assert_eq!(*prefs.category.get(), Category::General);
        assert!(prefs.language.get().is_auto());
    }

    #[test]
    fn set_writes_through() {
        let store = Arc::new(MemoryStore::new());
        let mut sound = Preference::load(store.clone(), SOUND_KEY, || true);
        sound.set(false);

        assert_eq!(store.get(SOUND_KEY).as_deref(), Some("false"));
        let reloaded = Preference::load(store, SOUND_KEY, || true);
        assert!(!*reloaded.get());
    }

    #[test]
    fn theme_from_colorfgbg() {
        assert_eq!(Theme::from_colorfgbg("15;0"), Some(Theme::Dark));
        assert_eq!(Theme::from_colorfgbg("0;15"), Some(Theme::Light));
        assert_eq!(Theme::from_colorfgbg("0;default;7"), Some(Theme::Light));
        assert_eq!(Theme::from_colorfgbg("garbage"), None);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
    }

    #[test]
    fn unknown_stored_country_falls_back_like_a_missing_one() {
        let store = Arc::new(MemoryStore::new());
        store.set(COUNTRY_KEY, "\"XX\"").unwrap();

        let prefs = Preferences::load(store);

        assert_eq!(prefs.country.get(), &default_country());
        assert_eq!(
            prefs.country.get().as_str(),
            locale::detect_country().unwrap_or(locale::DEFAULT_COUNTRY)
        );
        assert!(locale::is_known_country(prefs.country.get()));
    }
}
