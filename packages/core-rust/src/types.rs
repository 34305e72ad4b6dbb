//! Typed operation payloads and analysis result shapes.
//!
//! The worker context is trusted to produce these shapes; the broker facade
//! deserializes its generic JSON result into them without further
//! transformation. All wire forms are camelCase.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Operation payloads
// ---------------------------------------------------------------------------

/// Payload for the extract-article operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractArticleRequest {
    /// Raw page HTML to extract from.
    pub html: String,
    /// Canonical URL of the page, used for resolving relative links.
    pub url: String,
    /// Extraction tuning options.
    #[serde(default)]
    pub options: ExtractOptions,
}

/// Tuning options for article extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractOptions {
    /// Include the raw HTML of the extracted region in the result.
    pub include_raw_content: bool,
    /// Truncate the extracted text to at most this many characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_text_length: Option<usize>,
}

/// Payload for the text-analysis operations (sentiment, clickbait, complexity).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRequest {
    /// Text to analyze.
    pub text: String,
}

// ---------------------------------------------------------------------------
// Result shapes
// ---------------------------------------------------------------------------

/// Extracted article content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Article headline, when one could be identified.
    pub title: Option<String>,
    /// Author byline, when present.
    pub byline: Option<String>,
    /// Plain-text article body.
    pub text: String,
    /// Canonical URL the article was extracted from.
    pub url: String,
    /// Site or publication name.
    pub site_name: Option<String>,
    /// Word count of the extracted body.
    pub word_count: usize,
    /// Raw HTML of the extracted region; only present when requested via
    /// [`ExtractOptions::include_raw_content`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_content: Option<String>,
}

/// Coarse sentiment classification of a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Negative,
    Neutral,
    Positive,
}

/// Sentiment analysis result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentResult {
    /// Polarity in `[-1.0, 1.0]`; negative values mean negative sentiment.
    pub score: f64,
    /// Coarse label derived from `score`.
    pub label: SentimentLabel,
    /// Number of words the analysis considered.
    pub word_count: usize,
}

/// Clickbait detection result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickbaitResult {
    /// Clickbait likelihood in `[0.0, 1.0]`.
    pub score: f64,
    /// Whether `score` crosses the provider's clickbait threshold.
    pub is_clickbait: bool,
    /// Human-readable descriptions of the signals that contributed.
    #[serde(default)]
    pub signals: Vec<String>,
}

/// Reading-complexity analysis result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexityResult {
    /// Normalized complexity score in `[0.0, 1.0]`.
    pub score: f64,
    /// Approximate reading grade level (e.g. `"college"`, `"grade 8"`).
    pub grade_level: String,
    /// Average sentence length in words.
    pub avg_sentence_length: f64,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn extract_request_defaults_options_when_absent() {
        let req: ExtractArticleRequest = serde_json::from_value(json!({
            "html": "<p>hi</p>",
            "url": "https://example.com",
        }))
        .expect("deserialize");
        assert_eq!(req.options, ExtractOptions::default());
        assert!(!req.options.include_raw_content);
    }

    #[test]
    fn article_wire_form_is_camel_case() {
        let article = Article {
            title: Some("T".into()),
            byline: None,
            text: "body".into(),
            url: "https://example.com".into(),
            site_name: None,
            word_count: 1,
            raw_content: None,
        };
        let wire = serde_json::to_value(&article).expect("serialize");
        assert_eq!(wire["wordCount"], json!(1));
        assert!(wire.get("rawContent").is_none());
    }

    #[test]
    fn sentiment_label_uses_lowercase_tags() {
        assert_eq!(
            serde_json::to_value(SentimentLabel::Negative).expect("serialize"),
            json!("negative")
        );
    }
}
