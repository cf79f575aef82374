//! Language-model assistant for recommendations and bio drafts.
//!
//! The assistant never fails loudly. Without an API key it does not build a
//! request at all and callers use the fallback text straight away; any reply
//! that is not a usable 2xx answer also degrades to the fallback.
//!
//! ```
//! use hirafi::assistant::{Assistant, AssistantConfig, RECOMMENDATION_FALLBACK};
//!
//! let assistant = Assistant::new(AssistantConfig::default());
//! assert!(assistant.recommendation_request("leaking tap", &[]).is_none());
//! assert_eq!(assistant.recommendation_text(None), RECOMMENDATION_FALLBACK);
//! ```

mod dto;
mod prompt;

use url::Url;

use crate::domain::{HirafiError, Result, Worker};
use crate::remote::http::{is_success, HttpRequest};

use dto::{GenerateRequestDto, GenerateResponseDto};

/// Shown when no recommendation could be generated.
pub const RECOMMENDATION_FALLBACK: &str =
    "عذراً، لا يمكن تقديم توصية في الوقت الحالي. يرجى تصفح قائمة الحرفيين المتاحين.";

/// Bio drafts fall back to nothing; the user keeps writing their own.
pub const BIO_FALLBACK: &str = "";

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// The key travels as a header so it never appears in a logged URL.
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantConfig {
    /// API key; `None` or blank disables every network call.
    pub key: Option<String>,
    pub model: String,
    pub endpoint: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assistant {
    config: AssistantConfig,
}

impl Assistant {
    #[must_use]
    pub const fn new(config: AssistantConfig) -> Self {
        Self { config }
    }

    /// True when a key is configured.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.key().is_some()
    }

    fn key(&self) -> Option<&str> {
        self.config
            .key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    /// Builds the request asking which candidate suits `need`.
    ///
    /// Returns `None` when the assistant is disabled or the request cannot be
    /// built; the caller then shows [`RECOMMENDATION_FALLBACK`].
    #[must_use]
    pub fn recommendation_request(&self, need: &str, candidates: &[Worker]) -> Option<HttpRequest> {
        self.generate(prompt::recommendation(need, candidates))
    }

    /// Builds the request drafting a bio for a worker of `category`.
    #[must_use]
    pub fn bio_request(&self, category: &str, skills: &[String]) -> Option<HttpRequest> {
        self.generate(prompt::bio(category, skills))
    }

    fn generate(&self, prompt: String) -> Option<HttpRequest> {
        let key = self.key()?;
        match self.build(key, prompt) {
            Ok(request) => Some(request),
            Err(e) => {
                tracing::warn!(error = %e, "could not build assistant request");
                None
            }
        }
    }

    fn build(&self, key: &str, prompt: String) -> Result<HttpRequest> {
        let raw = format!(
            "{}/models/{}:generateContent",
            self.config.endpoint.trim().trim_end_matches('/'),
            self.config.model.trim()
        );
        let url = Url::parse(&raw)
            .map_err(|e| HirafiError::Config(format!("invalid assistant_endpoint {raw:?}: {e}")))?;

        let body = serde_json::to_value(GenerateRequestDto::from_prompt(prompt))?;
        Ok(HttpRequest::post_json(url.as_str(), &body)?.header(API_KEY_HEADER, key))
    }

    /// Final recommendation text for a reply, falling back when absent.
    #[must_use]
    pub fn recommendation_text(&self, reply: Option<String>) -> String {
        reply.unwrap_or_else(|| RECOMMENDATION_FALLBACK.to_string())
    }

    /// Final bio text for a reply, falling back when absent.
    #[must_use]
    pub fn bio_text(&self, reply: Option<String>) -> String {
        reply.unwrap_or_else(|| BIO_FALLBACK.to_string())
    }
}

/// Extracts the generated text from a reply.
///
/// Any failure (status, body, empty candidates) yields `None` and is logged.
#[must_use]
pub fn parse_reply(status: u16, body: &[u8]) -> Option<String> {
    if !is_success(status) {
        tracing::warn!(
            status,
            body = %crate::remote::http::body_preview(body),
            "assistant call failed"
        );
        return None;
    }
    match serde_json::from_slice::<GenerateResponseDto>(body) {
        Ok(dto) => {
            let text = dto.into_text();
            if text.is_none() {
                tracing::warn!("assistant reply had no text");
            }
            text
        }
        Err(e) => {
            tracing::warn!(error = %e, "undecodable assistant reply");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::http::HttpMethod;
    use serde_json::{json, Value};

    fn enabled() -> Assistant {
        Assistant::new(AssistantConfig {
            key: Some("secret".to_string()),
            ..AssistantConfig::default()
        })
    }

    #[test]
    fn blank_key_disables_requests() {
        let assistant = Assistant::new(AssistantConfig {
            key: Some("  ".to_string()),
            ..AssistantConfig::default()
        });
        assert!(!assistant.is_enabled());
        assert!(assistant.bio_request("plumbing", &[]).is_none());
        assert_eq!(assistant.bio_text(None), "");
    }

    #[test]
    fn request_targets_model_endpoint_with_key() {
        let request = enabled().recommendation_request("paint a flat", &[]).unwrap();
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(
            request.url,
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
        assert_eq!(request.headers[API_KEY_HEADER], "secret");
        assert!(!format!("{request:?}").contains("secret"));
        let body: Value = serde_json::from_slice(&request.body).unwrap();
        let text = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(text.contains("paint a flat"));
    }

    #[test]
    fn reply_text_is_extracted() {
        let body = json!({
            "candidates": [{"content": {"parts": [{"text": "  Karim  "}]}}]
        });
        let text = parse_reply(200, body.to_string().as_bytes());
        assert_eq!(text.as_deref(), Some("Karim"));
    }

    #[test]
    fn failures_degrade_to_fallback() {
        let assistant = enabled();
        for (status, body) in [
            (500, br#"{"error":{"message":"boom"}}"#.as_slice()),
            (200, b"not json".as_slice()),
            (200, br#"{"candidates":[]}"#.as_slice()),
        ] {
            let reply = parse_reply(status, body);
            assert_eq!(assistant.recommendation_text(reply), RECOMMENDATION_FALLBACK);
        }
    }
}
