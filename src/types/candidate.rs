use serde::{Deserialize, Serialize};

use crate::types::{Content, FinishReason};

/// One generated completion within a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// The generated content.
    ///
    /// Absent on some terminal stream fragments (e.g. a bare finish
    /// reason).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,

    /// Why generation stopped, present on the final fragment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,

    /// Index of this candidate within the response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
}

impl Candidate {
    /// Create a new `Candidate` wrapping the given content.
    pub fn new(content: Content) -> Self {
        Self {
            content: Some(content),
            finish_reason: None,
            index: None,
        }
    }

    /// Sets the finish reason.
    pub fn with_finish_reason(mut self, finish_reason: FinishReason) -> Self {
        self.finish_reason = Some(finish_reason);
        self
    }

    /// Concatenate the text of the candidate's content, if any.
    pub fn text(&self) -> String {
        self.content
            .as_ref()
            .map(Content::text)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_without_content() {
        let candidate: Candidate =
            serde_json::from_str(r#"{"finishReason": "STOP", "index": 0}"#).unwrap();
        assert!(candidate.content.is_none());
        assert_eq!(candidate.finish_reason, Some(FinishReason::Stop));
        assert_eq!(candidate.text(), "");
    }
}
