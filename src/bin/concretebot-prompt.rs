//! Command-line tool for one-shot questions to the concrete expert.
//!
//! This binary sends a single question to the Gemini API, configured with
//! the same expert persona as the chat application, and streams the
//! answer to stdout.
//!
//! # Usage
//!
//! ```bash
//! # Ask a question directly
//! concretebot-prompt "What is a good water-cement ratio?"
//!
//! # Pipe a question in on stdin
//! echo "Why does concrete crack?" | concretebot-prompt
//!
//! # Get the complete answer in one round trip
//! concretebot-prompt --no-stream "Define slump"
//! ```

use std::io::Read;

use arrrg::CommandLine;
use arrrg_derive::CommandLine;
use futures::StreamExt;

use concretebot::chat::{ChatConfig, ChatSession};
use concretebot::render::{PlainTextRenderer, Renderer};
use concretebot::{Error, Gemini};

/// Command-line arguments for the concretebot-prompt tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
struct PromptArgs {
    /// Model to use.
    #[arrrg(optional, "Model to use (default: gemini-2.5-flash)", "MODEL")]
    model: Option<String>,

    /// System instruction overriding the concrete-expert persona.
    #[arrrg(optional, "System instruction for the request", "PROMPT")]
    system: Option<String>,

    /// Maximum tokens for the response.
    #[arrrg(optional, "Max tokens for the response", "TOKENS")]
    max_tokens: Option<u32>,

    /// Fetch the complete response instead of streaming it.
    #[arrrg(flag, "Wait for the complete response instead of streaming")]
    no_stream: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, free) =
        PromptArgs::from_command_line_relaxed("concretebot-prompt [OPTIONS] [QUESTION]");

    let question = if free.is_empty() {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer.trim().to_string()
    } else {
        free.join(" ")
    };
    if question.is_empty() {
        return Err(Box::new(Error::validation("no question provided")) as Box<dyn std::error::Error>);
    }

    let no_stream = args.no_stream;
    let mut config = ChatConfig::new();
    if let Some(model) = args.model {
        config.model = model.as_str().into();
    }
    if let Some(system) = args.system {
        config.system_prompt = system;
    }
    config.max_output_tokens = args.max_tokens;

    let client = Gemini::new(None)?;
    let session = ChatSession::new(&config);
    let request = session.request_for(&question);
    let mut renderer = PlainTextRenderer::new();

    if no_stream {
        let response = client.generate(session.model(), request).await?;
        renderer.print_text(&response.text());
        renderer.finish_response();
        return Ok(());
    }

    let mut stream = client.stream_generate(session.model(), request).await?;
    while let Some(item) = stream.next().await {
        let fragment = item?;
        let piece = fragment.text();
        if !piece.is_empty() {
            renderer.print_text(&piece);
        }
    }
    renderer.finish_response();

    Ok(())
}
