//! The remote chat session handle and the transport seam behind it.
//!
//! A [`ChatSession`] is the adapter-side view of the remote conversation:
//! the model identifier, system instruction, and sampling parameters fixed
//! at creation, plus the turns the remote model has already seen. The
//! conversation controller owns at most one session at a time and replaces
//! it wholesale; there is no hidden module-level handle.

use async_trait::async_trait;

use crate::chat::config::ChatConfig;
use crate::client::{Gemini, GenerateContentStream};
use crate::error::Result;
use crate::types::{
    Content, GenerateContentRequest, GenerationConfig, Model, SystemInstruction,
};

/// How a chat session reaches the remote model.
///
/// The single production implementation is [`Gemini`]; tests script their
/// own fragments. One call is one attempt: implementations do not retry.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open a streaming generation request.
    async fn stream_generate(
        &self,
        model: &Model,
        request: GenerateContentRequest,
    ) -> Result<GenerateContentStream>;
}

#[async_trait]
impl Transport for Gemini {
    async fn stream_generate(
        &self,
        model: &Model,
        request: GenerateContentRequest,
    ) -> Result<GenerateContentStream> {
        Gemini::stream_generate(self, model, request).await
    }
}

/// A stateful handle to one remote conversation.
///
/// Configuration is captured once at creation and never changes for the
/// life of the handle; reconfiguring means replacing the session.
#[derive(Debug, Clone)]
pub struct ChatSession {
    model: Model,
    system_instruction: SystemInstruction,
    generation_config: GenerationConfig,
    history: Vec<Content>,
}

impl ChatSession {
    /// Creates a new, empty session from the chat configuration.
    pub fn new(config: &ChatConfig) -> Self {
        Self {
            model: config.model.clone(),
            system_instruction: SystemInstruction::new(&config.system_prompt),
            generation_config: config.generation_config(),
            history: Vec::new(),
        }
    }

    /// The model this session is pinned to.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// The turns the remote model has seen, oldest first.
    pub fn history(&self) -> &[Content] {
        &self.history
    }

    /// Build the request for the next turn: every settled turn so far
    /// plus the pending user message.
    pub fn request_for(&self, text: &str) -> GenerateContentRequest {
        let mut contents = self.history.clone();
        contents.push(Content::user(text));
        GenerateContentRequest::new(contents)
            .with_system_instruction(self.system_instruction.clone())
            .with_generation_config(self.generation_config.clone())
    }

    /// Record a settled exchange.
    ///
    /// Only successful turns are recorded; a failed turn is never
    /// replayed to the remote model.
    pub fn record_exchange(&mut self, user_text: &str, reply_text: &str) {
        self.history.push(Content::user(user_text));
        self.history.push(Content::model(reply_text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_empty() {
        let session = ChatSession::new(&ChatConfig::default());
        assert!(session.history().is_empty());
        assert_eq!(session.model().to_string(), "gemini-2.5-flash");
    }

    #[test]
    fn request_carries_fixed_configuration() {
        let session = ChatSession::new(&ChatConfig::default());
        let request = session.request_for("Why does concrete crack?");

        let instruction = request.system_instruction.expect("system instruction");
        assert!(instruction.text().contains("concrete"));
        let generation = request.generation_config.expect("generation config");
        assert_eq!(generation.temperature, Some(0.7));
    }

    #[test]
    fn request_ends_with_pending_user_turn() {
        let mut session = ChatSession::new(&ChatConfig::default());
        session.record_exchange("What is slump?", "A workability measure.");

        let request = session.request_for("And a good value?");
        assert_eq!(request.contents.len(), 3);
        assert_eq!(request.contents[0].text(), "What is slump?");
        assert_eq!(request.contents[1].text(), "A workability measure.");
        assert_eq!(request.contents[2].text(), "And a good value?");
    }

    #[test]
    fn history_preserves_causal_order() {
        let mut session = ChatSession::new(&ChatConfig::default());
        session.record_exchange("first question", "first answer");
        session.record_exchange("second question", "second answer");

        let texts: Vec<String> = session.history().iter().map(Content::text).collect();
        assert_eq!(
            texts,
            vec![
                "first question",
                "first answer",
                "second question",
                "second answer"
            ]
        );
    }
}
