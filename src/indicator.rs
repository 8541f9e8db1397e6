//! The one-line summary of what the next poem will be made from.

use crate::locale::{country_name, flag_emoji, Category, LanguageChoice};
use crate::source::Headline;

/// Render the indicator line, e.g.
/// `Source: LRT • Country: Lithuania 🇱🇹 • Category: General • Haiku: lt (auto) • 🔊`.
pub fn format_indicator(
    current: Option<&Headline>,
    category: Category,
    country: &str,
    language: &LanguageChoice,
    sound: bool,
) -> String {
    let source = current
        .map(|h| h.source.as_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("—");
    let mut language_text = language.resolve(country);
    if language.is_auto() {
        language_text.push_str(" (auto)");
    }
    let speaker = if sound { "🔊" } else { "🔇" };

    format!(
        "Source: {source} • Country: {} {} • Category: {} • Haiku: {language_text} • {speaker}",
        country_name(country),
        flag_emoji(country),
        category.label(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn auto_language_with_sound() {
        let headline = Headline::new("Storm", "Example News", "https://example.com");
        assert_eq!(
            format_indicator(Some(&headline), Category::General, "LT", &LanguageChoice::Auto, true),
            "Source: Example News • Country: Lithuania 🇱🇹 • Category: General • Haiku: lt (auto) • 🔊"
        );
    }

    #[test]
    fn explicit_language_muted_without_headline() {
        assert_eq!(
            format_indicator(
                None,
                Category::Technology,
                "DE",
                &LanguageChoice::Explicit("en".into()),
                false
            ),
            "Source: — • Country: Germany 🇩🇪 • Category: Technology • Haiku: en • 🔇"
        );
    }

    #[test]
    fn unknown_country_uses_code() {
        let line = format_indicator(None, Category::General, "XX", &LanguageChoice::Auto, true);
        assert!(line.contains("Country: XX 🇽🇽"));
        assert!(line.contains("Haiku: en (auto)"));
    }
}
