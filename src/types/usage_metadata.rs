use std::ops::Add;

use serde::{Deserialize, Serialize};

/// Token accounting attached to a response.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    /// Tokens consumed by the prompt, including history and system
    /// instruction.
    #[serde(default)]
    pub prompt_token_count: u64,

    /// Tokens generated across all candidates.
    #[serde(default)]
    pub candidates_token_count: u64,

    /// Total tokens for the request.
    #[serde(default)]
    pub total_token_count: u64,
}

impl UsageMetadata {
    /// Create a new `UsageMetadata` from prompt and candidate counts.
    pub fn new(prompt_token_count: u64, candidates_token_count: u64) -> Self {
        Self {
            prompt_token_count,
            candidates_token_count,
            total_token_count: prompt_token_count + candidates_token_count,
        }
    }
}

impl Add for UsageMetadata {
    type Output = UsageMetadata;

    fn add(self, rhs: UsageMetadata) -> UsageMetadata {
        UsageMetadata {
            prompt_token_count: self.prompt_token_count + rhs.prompt_token_count,
            candidates_token_count: self.candidates_token_count + rhs.candidates_token_count,
            total_token_count: self.total_token_count + rhs.total_token_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_camel_case() {
        let usage: UsageMetadata = serde_json::from_value(json!({
            "promptTokenCount": 12,
            "candidatesTokenCount": 34,
            "totalTokenCount": 46
        }))
        .unwrap();
        assert_eq!(usage, UsageMetadata::new(12, 34));
    }

    #[test]
    fn missing_fields_default_to_zero() {
        let usage: UsageMetadata = serde_json::from_value(json!({})).unwrap();
        assert_eq!(usage, UsageMetadata::default());
    }
}
