//! Chat application module for interactive conversations with the
//! concrete expert.
//!
//! This module provides a streaming REPL chat interface built on top of
//! the Gemini client. It supports:
//!
//! - Streaming responses with real-time token display
//! - Markdown-styled terminal output
//! - Slash commands for session control
//! - Optional voice input via an external dictation command
//!
//! # Architecture
//!
//! The module is organized into several components:
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`session`]: The remote session handle and transport seam
//! - [`conversation`]: Message list ownership and the turn state machine
//! - [`commands`]: Slash command parsing and handling

mod commands;
mod config;
mod conversation;
mod session;

pub use crate::render::{MarkdownRenderer, PlainTextRenderer, Renderer};
pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig, DEFAULT_SYSTEM_PROMPT};
pub use conversation::{
    APOLOGY, Conversation, ConversationStats, Message, MessageId, TurnOutcome, TurnPhase, WELCOME,
};
pub use session::{ChatSession, Transport};
