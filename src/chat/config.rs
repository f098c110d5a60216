//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling chat behavior.

use arrrg_derive::CommandLine;

use crate::types::{GenerationConfig, KnownModel, Model};

/// Default sampling temperature.
const DEFAULT_TEMPERATURE: f64 = 0.7;

/// The fixed expert persona for the default chat experience.
pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are a world-class civil engineer specializing in concrete technology, \
answering questions for a live audience.

Guidelines:
1. Keep answers brief: two or three short paragraphs at most.
2. Use markdown: **bold** for key concepts, bullet lists where they help.
3. Stay professional: accurate and technical, but accessible.
4. Safety first: for suspected structural damage, recommend consulting a \
licensed engineer rather than diagnosing remotely.

You are fluent in mix design and ratios, curing and hydration, durability \
and cracking, sustainable concrete, and testing standards.";

/// Command-line arguments for the concretebot-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Model to use for chat.
    #[arrrg(optional, "Model to use (default: gemini-2.5-flash)", "MODEL")]
    pub model: Option<String>,

    /// System instruction overriding the concrete-expert persona.
    #[arrrg(optional, "System instruction for the conversation", "PROMPT")]
    pub system: Option<String>,

    /// Maximum tokens per response.
    #[arrrg(optional, "Max tokens per response (default: model limit)", "TOKENS")]
    pub max_tokens: Option<u32>,

    /// External dictation command for voice input.
    #[arrrg(optional, "Speech-to-text command for /mic", "COMMAND")]
    pub dictate: Option<String>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// The model to use for generating responses.
    pub model: Model,

    /// System instruction fixed for the lifetime of a session.
    pub system_prompt: String,

    /// Sampling temperature.
    pub temperature: Option<f64>,

    /// Maximum tokens per response. `None` uses the model's limit.
    pub max_output_tokens: Option<u32>,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,

    /// External dictation command, when voice input is wanted.
    pub dictate_command: Option<String>,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Model: gemini-2.5-flash
    /// - System prompt: the concrete-expert persona
    /// - Temperature: 0.7
    /// - Color: enabled
    /// - Dictation: disabled
    pub fn new() -> Self {
        Self {
            model: Model::Known(KnownModel::Gemini25Flash),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            temperature: Some(DEFAULT_TEMPERATURE),
            max_output_tokens: None,
            use_color: true,
            dictate_command: None,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    /// Sets the system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: Option<f64>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the maximum tokens per response.
    pub fn with_max_output_tokens(mut self, max_output_tokens: Option<u32>) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Sets the dictation command.
    pub fn with_dictate_command(mut self, command: Option<String>) -> Self {
        self.dictate_command = command;
        self
    }

    /// The generation config sent with every request in a session.
    pub fn generation_config(&self) -> GenerationConfig {
        let mut config = GenerationConfig::new();
        if let Some(temperature) = self.temperature {
            config = config.with_temperature(temperature);
        }
        if let Some(max_output_tokens) = self.max_output_tokens {
            config = config.with_max_output_tokens(max_output_tokens);
        }
        config
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        let mut config = ChatConfig::new();
        if let Some(model) = args.model {
            config.model = Model::from(model);
        }
        if let Some(system) = args.system {
            config.system_prompt = system;
        }
        config.max_output_tokens = args.max_tokens;
        config.dictate_command = args.dictate;
        config.use_color = !args.no_color;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ChatConfig::new();
        assert_eq!(config.model, Model::Known(KnownModel::Gemini25Flash));
        assert_eq!(config.temperature, Some(0.7));
        assert_eq!(config.system_prompt, DEFAULT_SYSTEM_PROMPT);
        assert!(config.max_output_tokens.is_none());
        assert!(config.use_color);
        assert!(config.dictate_command.is_none());
    }

    #[test]
    fn config_from_args_defaults() {
        let args = ChatArgs::default();
        let config = ChatConfig::from(args);
        assert_eq!(config.model, Model::Known(KnownModel::Gemini25Flash));
        assert_eq!(config.temperature, Some(0.7));
        assert!(config.use_color);
    }

    #[test]
    fn config_from_args_custom() {
        let args = ChatArgs {
            model: Some("gemini-2.5-pro".to_string()),
            system: Some("You are terse.".to_string()),
            max_tokens: Some(512),
            dictate: Some("hear -d".to_string()),
            no_color: true,
        };
        let config = ChatConfig::from(args);
        assert_eq!(config.model, Model::Known(KnownModel::Gemini25Pro));
        assert_eq!(config.system_prompt, "You are terse.");
        assert_eq!(config.max_output_tokens, Some(512));
        assert_eq!(config.dictate_command, Some("hear -d".to_string()));
        assert!(!config.use_color);
    }

    #[test]
    fn generation_config_reflects_settings() {
        let config = ChatConfig::new().with_max_output_tokens(Some(256));
        let generation = config.generation_config();
        assert_eq!(generation.temperature, Some(0.7));
        assert_eq!(generation.max_output_tokens, Some(256));

        let config = ChatConfig::new().with_temperature(None);
        assert_eq!(config.generation_config(), GenerationConfig::new());
    }
}
