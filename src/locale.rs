//! Countries, languages and news categories.
//!
//! The tables here drive three things: which feed edition is requested for a
//! country, which language a poem is written in when the language selector is
//! on "auto", and the display names shown in the indicator line.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Country editions: (ISO code, display name, default poem language).
pub const COUNTRIES: &[(&str, &str, &str)] = &[
    ("US", "United States", "en"),
    ("GB", "United Kingdom", "en"),
    ("IE", "Ireland", "en"),
    ("CA", "Canada", "en"),
    ("AU", "Australia", "en"),
    ("NZ", "New Zealand", "en"),
    ("LT", "Lithuania", "lt"),
    ("LV", "Latvia", "lv"),
    ("EE", "Estonia", "et"),
    ("PL", "Poland", "pl"),
    ("DE", "Germany", "de"),
    ("FR", "France", "fr"),
    ("ES", "Spain", "es"),
    ("IT", "Italy", "it"),
    ("PT", "Portugal", "pt"),
    ("NL", "Netherlands", "nl"),
    ("NO", "Norway", "no"),
    ("SE", "Sweden", "sv"),
    ("DK", "Denmark", "da"),
    ("FI", "Finland", "fi"),
    ("CZ", "Czechia", "cs"),
    ("SK", "Slovakia", "sk"),
    ("HU", "Hungary", "hu"),
    ("RO", "Romania", "ro"),
    ("BG", "Bulgaria", "bg"),
    ("GR", "Greece", "el"),
    ("HR", "Croatia", "hr"),
    ("SI", "Slovenia", "sl"),
    ("RS", "Serbia", "sr"),
    ("UA", "Ukraine", "uk"),
    ("TR", "Türkiye", "tr"),
    ("BR", "Brazil", "pt"),
    ("MX", "Mexico", "es"),
    ("AR", "Argentina", "es"),
    ("CL", "Chile", "es"),
    ("CO", "Colombia", "es"),
    ("PE", "Peru", "es"),
    ("JP", "Japan", "ja"),
    ("KR", "South Korea", "ko"),
    ("CN", "China", "zh-CN"),
    ("TW", "Taiwan", "zh-TW"),
    ("HK", "Hong Kong", "zh-HK"),
    ("IN", "India", "en"),
    ("ZA", "South Africa", "en"),
];

/// Poem languages: (code, display name).
pub const LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("lt", "Lithuanian"),
    ("lv", "Latvian"),
    ("et", "Estonian"),
    ("pl", "Polish"),
    ("de", "German"),
    ("fr", "French"),
    ("es", "Spanish"),
    ("it", "Italian"),
    ("pt", "Portuguese"),
    ("nl", "Dutch"),
    ("no", "Norwegian"),
    ("sv", "Swedish"),
    ("da", "Danish"),
    ("fi", "Finnish"),
    ("cs", "Czech"),
    ("sk", "Slovak"),
    ("hu", "Hungarian"),
    ("ro", "Romanian"),
    ("bg", "Bulgarian"),
    ("el", "Greek"),
    ("hr", "Croatian"),
    ("sl", "Slovene"),
    ("sr", "Serbian"),
    ("uk", "Ukrainian"),
    ("tr", "Turkish"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("zh-CN", "Chinese (Simplified)"),
    ("zh-TW", "Chinese (Traditional)"),
    ("zh-HK", "Chinese (Hong Kong)"),
];

/// Fallback country when neither storage nor the environment provide one.
pub const DEFAULT_COUNTRY: &str = "US";

/// Fallback poem language for countries missing from [`COUNTRIES`].
pub const DEFAULT_LANGUAGE: &str = "en";

/// Offset from an ASCII capital letter to its regional indicator symbol.
const REGIONAL_INDICATOR_OFFSET: u32 = 127_397;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// News category. Stored and serialized in lowercase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    #[default]
    General,
    Business,
    Entertainment,
    Health,
    Science,
    Sports,
    Technology,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::General,
        Category::Business,
        Category::Entertainment,
        Category::Health,
        Category::Science,
        Category::Sports,
        Category::Technology,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::General => "general",
            Category::Business => "business",
            Category::Entertainment => "entertainment",
            Category::Health => "health",
            Category::Science => "science",
            Category::Sports => "sports",
            Category::Technology => "technology",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::General => "General",
            Category::Business => "Business",
            Category::Entertainment => "Entertainment",
            Category::Health => "Health",
            Category::Science => "Science",
            Category::Sports => "Sports",
            Category::Technology => "Technology",
        }
    }

    /// Strict parse; `None` for anything outside the closed set.
    pub fn parse(value: &str) -> Option<Category> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(value.trim()))
    }

    /// Parse a category, falling back to [`Category::General`] for unknown
    /// values. Stored preferences and stored entries go through here.
    pub fn parse_or_default(value: &str) -> Category {
        Category::parse(value).unwrap_or_else(|| {
            tracing::warn!(value, "unknown category, using general");
            Category::General
        })
    }

    pub fn next(self) -> Category {
        let i = Category::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Category::ALL[(i + 1) % Category::ALL.len()]
    }

    pub fn previous(self) -> Category {
        let i = Category::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Category::ALL[(i + Category::ALL.len() - 1) % Category::ALL.len()]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        Category::parse_or_default(&value)
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.as_str().to_string()
    }
}

// ---------------------------------------------------------------------------
// Language selector
// ---------------------------------------------------------------------------

/// The poem-language selector: a concrete code, or "auto" (follow the
/// selected country).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LanguageChoice {
    #[default]
    Auto,
    Explicit(String),
}

impl LanguageChoice {
    /// Resolve to a concrete language code for `country`. Never returns "auto".
    pub fn resolve(&self, country: &str) -> String {
        match self {
            LanguageChoice::Auto => default_language_for_country(country).to_string(),
            LanguageChoice::Explicit(code) => code.clone(),
        }
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, LanguageChoice::Auto)
    }

    /// Step through `auto` followed by every entry of [`LANGUAGES`].
    pub fn next(&self) -> LanguageChoice {
        match self {
            LanguageChoice::Auto => LanguageChoice::Explicit(LANGUAGES[0].0.to_string()),
            LanguageChoice::Explicit(code) => {
                match LANGUAGES.iter().position(|(c, _)| c == code) {
                    Some(i) if i + 1 < LANGUAGES.len() => {
                        LanguageChoice::Explicit(LANGUAGES[i + 1].0.to_string())
                    }
                    _ => LanguageChoice::Auto,
                }
            }
        }
    }
}

impl From<String> for LanguageChoice {
    fn from(value: String) -> Self {
        if value.is_empty() || value.eq_ignore_ascii_case("auto") {
            LanguageChoice::Auto
        } else {
            LanguageChoice::Explicit(value)
        }
    }
}

impl From<LanguageChoice> for String {
    fn from(value: LanguageChoice) -> Self {
        match value {
            LanguageChoice::Auto => "auto".to_string(),
            LanguageChoice::Explicit(code) => code,
        }
    }
}

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

pub fn country_name(code: &str) -> &str {
    COUNTRIES
        .iter()
        .find(|(c, _, _)| *c == code)
        .map(|(_, name, _)| *name)
        .unwrap_or(code)
}

pub fn default_language_for_country(code: &str) -> &'static str {
    COUNTRIES
        .iter()
        .find(|(c, _, _)| *c == code)
        .map(|(_, _, lang)| *lang)
        .unwrap_or(DEFAULT_LANGUAGE)
}

pub fn language_name(code: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

pub fn is_known_country(code: &str) -> bool {
    COUNTRIES.iter().any(|(c, _, _)| *c == code)
}

/// The country after (or before, with `step = -1`) `code` in [`COUNTRIES`].
pub fn step_country(code: &str, step: isize) -> &'static str {
    let len = COUNTRIES.len() as isize;
    let i = COUNTRIES
        .iter()
        .position(|(c, _, _)| *c == code)
        .unwrap_or(0) as isize;
    COUNTRIES[(i + step).rem_euclid(len) as usize].0
}

/// Map a two-letter country code to its flag (regional indicator pair).
pub fn flag_emoji(code: &str) -> String {
    code.chars()
        .map(|ch| {
            if ch.is_ascii_alphabetic() {
                char::from_u32(ch.to_ascii_uppercase() as u32 + REGIONAL_INDICATOR_OFFSET)
                    .unwrap_or(ch)
            } else {
                ch
            }
        })
        .collect()
}

/// Derive a country from a POSIX locale string such as `lt_LT.UTF-8` or
/// `en-GB`. Only countries present in [`COUNTRIES`] are accepted.
pub fn country_from_locale(locale: &str) -> Option<&'static str> {
    let tag = locale.split(['.', '@']).next()?;
    let region = tag.split(['_', '-']).nth(1)?.to_ascii_uppercase();
    COUNTRIES
        .iter()
        .find(|(c, _, _)| *c == region)
        .map(|(c, _, _)| *c)
}

/// Country detected from `LC_ALL`, `LC_MESSAGES` or `LANG`, in that order.
pub fn detect_country() -> Option<&'static str> {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find_map(|value| country_from_locale(&value))
}
