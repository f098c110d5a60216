use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a candidate stopped generating.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinishReason {
    /// Default value, unused in practice.
    FinishReasonUnspecified,

    /// The model reached a natural stopping point or a stop sequence.
    Stop,

    /// The response hit the configured token ceiling.
    MaxTokens,

    /// The response was flagged by safety filters.
    Safety,

    /// The response was flagged for reciting training data.
    Recitation,

    /// Any other reason.
    Other,
}

impl FinishReason {
    /// True when the candidate ended for a reason other than normal
    /// completion.
    pub fn is_truncation(&self) -> bool {
        !matches!(self, FinishReason::Stop)
    }
}

impl fmt::Display for FinishReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FinishReason::FinishReasonUnspecified => write!(f, "unspecified"),
            FinishReason::Stop => write!(f, "stop"),
            FinishReason::MaxTokens => write!(f, "max tokens"),
            FinishReason::Safety => write!(f, "safety"),
            FinishReason::Recitation => write!(f, "recitation"),
            FinishReason::Other => write!(f, "other"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_format_is_screaming_snake() {
        let reason: FinishReason = serde_json::from_str(r#""MAX_TOKENS""#).unwrap();
        assert_eq!(reason, FinishReason::MaxTokens);
        assert_eq!(serde_json::to_string(&FinishReason::Stop).unwrap(), r#""STOP""#);
    }

    #[test]
    fn truncation() {
        assert!(!FinishReason::Stop.is_truncation());
        assert!(FinishReason::MaxTokens.is_truncation());
        assert!(FinishReason::Safety.is_truncation());
    }
}
