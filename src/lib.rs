// Public modules
pub mod chat;
pub mod client;
pub mod client_logger;
pub mod dictation;
pub mod error;
pub mod observability;
pub mod render;
pub mod sse;
pub mod types;

// Re-exports
pub use client::{Gemini, GenerateContentStream};
pub use client_logger::ClientLogger;
pub use error::{Error, Result};
pub use render::{MarkdownRenderer, PlainTextRenderer, Renderer};
pub use types::*;
