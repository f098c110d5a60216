use serde::{Deserialize, Serialize};

/// A single piece of content within a turn.
///
/// The Generative Language API models richer part kinds (inline data,
/// function calls); this client only exchanges text parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    /// The text content of this part.
    pub text: String,
}

impl Part {
    /// Create a new `Part` with the given text.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl From<&str> for Part {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Part {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

/// The author of a turn in the conversation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A turn authored by the user.
    User,

    /// A turn authored by the model.
    Model,
}

/// A complete turn: a role plus the parts that make up its content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    /// The author of this turn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    /// The content parts, in order.
    pub parts: Vec<Part>,
}

impl Content {
    /// Create a new `Content` with the given role and parts.
    pub fn new(role: Role, parts: Vec<Part>) -> Self {
        Self {
            role: Some(role),
            parts,
        }
    }

    /// Create a user turn from a single text string.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, vec![Part::new(text)])
    }

    /// Create a model turn from a single text string.
    pub fn model(text: impl Into<String>) -> Self {
        Self::new(Role::Model, vec![Part::new(text)])
    }

    /// Concatenate the text of every part in this turn.
    pub fn text(&self) -> String {
        self.parts.iter().map(|part| part.text.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn user_content_serialization() {
        let content = Content::user("How long should I cure a slab?");
        let json = to_value(&content).unwrap();

        assert_eq!(
            json,
            json!({
                "role": "user",
                "parts": [{"text": "How long should I cure a slab?"}]
            })
        );
    }

    #[test]
    fn model_content_deserialization() {
        let json = json!({
            "role": "model",
            "parts": [{"text": "At least "}, {"text": "seven days."}]
        });

        let content: Content = serde_json::from_value(json).unwrap();
        assert_eq!(content.role, Some(Role::Model));
        assert_eq!(content.text(), "At least seven days.");
    }

    #[test]
    fn roleless_content_accepted() {
        // Streaming responses occasionally omit the role field.
        let json = json!({"parts": [{"text": "hi"}]});
        let content: Content = serde_json::from_value(json).unwrap();
        assert_eq!(content.role, None);
        assert_eq!(content.text(), "hi");
    }
}
