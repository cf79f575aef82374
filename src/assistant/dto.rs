//! Wire types for the `generateContent` endpoint.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(super) struct GenerateRequestDto {
    pub(super) contents: Vec<ContentDto>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct ContentDto {
    #[serde(default)]
    pub(super) parts: Vec<PartDto>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct PartDto {
    #[serde(default)]
    pub(super) text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct GenerateResponseDto {
    #[serde(default)]
    pub(super) candidates: Vec<CandidateDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CandidateDto {
    pub(super) content: Option<ContentDto>,
}

impl GenerateRequestDto {
    pub(super) fn from_prompt(prompt: String) -> Self {
        Self {
            contents: vec![ContentDto {
                parts: vec![PartDto { text: Some(prompt) }],
            }],
        }
    }
}

impl GenerateResponseDto {
    /// Joined text of the first candidate, if it has any non-blank text.
    pub(super) fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text = content
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect::<String>();
        let trimmed = text.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}
