//! Gemini-backed poem source.
//!
//! Sends a single `generateContent` request per poem and tidies the reply
//! down to at most three plain lines.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{PoemError, PoemSource};
use crate::locale::language_name;

/// Default REST root for the Generative Language API.
pub const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model.
pub const GEMINI_MODEL: &str = "gemini-2.5-flash";

const POEM_LINES: usize = 3;

pub struct GeminiPoet {
    endpoint: String,
    model: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl GeminiPoet {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            client,
        }
    }

    fn generate_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

/// The instruction sent with every headline.
pub fn build_prompt(headline: &str, language: &str) -> String {
    let language = language_name(language).unwrap_or("English");
    format!(
        "You are a haiku generator.\n\
         Write exactly one haiku based on the news headline below.\n\
         Constraints:\n\
         - Write in {language}.\n\
         - Exactly 3 lines (no title).\n\
         - Aim for the 5-7-5 spirit (do not explain).\n\
         - No extra text, no quotes, no hashtags, no code fences.\n\
         - Calm, evocative tone.\n\
         \n\
         Headline: {headline}"
    )
}

/// Reduce a model reply to at most three trimmed, non-empty lines, dropping
/// code-fence markers.
pub fn tidy_poem(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("```"))
        .take(POEM_LINES)
        .collect::<Vec<_>>()
        .join("\n")
}

// -- wire types ------------------------------------------------------------

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.iter().map(|p| p.text.as_str()).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl PoemSource for GeminiPoet {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn compose(&self, headline: &str, language: &str) -> Result<String, PoemError> {
        let key = self.api_key.as_deref().ok_or(PoemError::MissingApiKey)?;
        let prompt = build_prompt(headline, language);
        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: &prompt }],
            }],
        };

        tracing::debug!(model = %self.model, language, "requesting poem");
        let response: GenerateResponse = self
            .client
            .post(self.generate_url())
            .query(&[("key", key)])
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let poem = tidy_poem(&response.text());
        if poem.is_empty() {
            return Err(PoemError::Empty);
        }
        Ok(poem)
    }
}
