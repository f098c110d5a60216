// Public modules
pub mod candidate;
pub mod content;
pub mod finish_reason;
pub mod generate_content_request;
pub mod generate_content_response;
pub mod generation_config;
pub mod model;
pub mod system_instruction;
pub mod usage_metadata;

// Re-exports
pub use candidate::Candidate;
pub use content::{Content, Part, Role};
pub use finish_reason::FinishReason;
pub use generate_content_request::GenerateContentRequest;
pub use generate_content_response::GenerateContentResponse;
pub use generation_config::GenerationConfig;
pub use model::{KnownModel, Model};
pub use system_instruction::SystemInstruction;
pub use usage_metadata::UsageMetadata;
