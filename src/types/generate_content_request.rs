use serde::{Deserialize, Serialize};

use crate::types::{Content, GenerationConfig, SystemInstruction};

/// The request body for `generateContent` and `streamGenerateContent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// The conversation so far, oldest turn first, ending with the turn
    /// awaiting a reply.
    pub contents: Vec<Content>,

    /// Session-wide steering text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<SystemInstruction>,

    /// Sampling parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    /// Create a new request from the given turns.
    pub fn new(contents: Vec<Content>) -> Self {
        Self {
            contents,
            system_instruction: None,
            generation_config: None,
        }
    }

    /// Sets the system instruction.
    pub fn with_system_instruction(
        mut self,
        system_instruction: impl Into<SystemInstruction>,
    ) -> Self {
        self.system_instruction = Some(system_instruction.into());
        self
    }

    /// Sets the generation config.
    pub fn with_generation_config(mut self, generation_config: GenerationConfig) -> Self {
        self.generation_config = Some(generation_config);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;
    use serde_json::{json, to_value};

    #[test]
    fn full_request_shape() {
        let request = GenerateContentRequest::new(vec![
            Content::user("What is w/c ratio?"),
            Content::model("Water to cement, by mass."),
            Content::user("Ideal value?"),
        ])
        .with_system_instruction("You are a concrete expert.")
        .with_generation_config(GenerationConfig::new().with_temperature(0.7));

        let json = to_value(&request).unwrap();
        assert_eq!(
            json,
            json!({
                "contents": [
                    {"role": "user", "parts": [{"text": "What is w/c ratio?"}]},
                    {"role": "model", "parts": [{"text": "Water to cement, by mass."}]},
                    {"role": "user", "parts": [{"text": "Ideal value?"}]}
                ],
                "systemInstruction": {"parts": [{"text": "You are a concrete expert."}]},
                "generationConfig": {"temperature": 0.7}
            })
        );
    }

    #[test]
    fn turns_preserve_order() {
        let request = GenerateContentRequest::new(vec![
            Content::user("first"),
            Content::model("second"),
        ]);
        assert_eq!(request.contents[0].role, Some(Role::User));
        assert_eq!(request.contents[1].role, Some(Role::Model));
    }
}
