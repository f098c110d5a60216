use serde::{Deserialize, Serialize};

use crate::types::{Candidate, Content, FinishReason, UsageMetadata};

/// A response (or, when streaming, one response fragment) from the model.
///
/// Streaming returns a sequence of these; each carries the text generated
/// since the previous fragment, and the final fragment carries the finish
/// reason and usage totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// The generated candidates. This client requests a single candidate.
    #[serde(default)]
    pub candidates: Vec<Candidate>,

    /// Token accounting, present on complete responses and on the final
    /// stream fragment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<UsageMetadata>,
}

impl GenerateContentResponse {
    /// Create a response fragment carrying a single model-authored text.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            candidates: vec![Candidate::new(Content::model(text))],
            usage_metadata: None,
        }
    }

    /// Concatenate the text of the first candidate.
    ///
    /// Fragments that carry no candidate (or no content) yield an empty
    /// string.
    pub fn text(&self) -> String {
        self.candidates
            .first()
            .map(Candidate::text)
            .unwrap_or_default()
    }

    /// The finish reason of the first candidate, if reported.
    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.candidates.first().and_then(|c| c.finish_reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn response_text_concatenates_first_candidate() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{"text": "Concrete "}, {"text": "cures."}]
                },
                "index": 0
            }]
        }))
        .unwrap();
        assert_eq!(response.text(), "Concrete cures.");
        assert_eq!(response.finish_reason(), None);
    }

    #[test]
    fn final_fragment_carries_usage_and_finish() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "."}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {
                "promptTokenCount": 10,
                "candidatesTokenCount": 20,
                "totalTokenCount": 30
            }
        }))
        .unwrap();
        assert_eq!(response.finish_reason(), Some(FinishReason::Stop));
        assert_eq!(response.usage_metadata, Some(UsageMetadata::new(10, 20)));
    }

    #[test]
    fn empty_response_yields_empty_text() {
        let response: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(response.text(), "");
    }
}
