use serde::{Deserialize, Serialize};

use crate::types::Part;

/// A system instruction: roleless content that steers the model for the
/// whole session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemInstruction {
    /// The instruction text, as content parts.
    pub parts: Vec<Part>,
}

impl SystemInstruction {
    /// Create a new `SystemInstruction` from a single text string.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            parts: vec![Part::new(text)],
        }
    }

    /// Concatenate the text of every part.
    pub fn text(&self) -> String {
        self.parts.iter().map(|part| part.text.as_str()).collect()
    }
}

impl From<String> for SystemInstruction {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl From<&str> for SystemInstruction {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn system_instruction_shape() {
        let instruction = SystemInstruction::from("You are a concrete expert.");
        assert_eq!(
            to_value(&instruction).unwrap(),
            json!({"parts": [{"text": "You are a concrete expert."}]})
        );
    }
}
