//! Interactive chat application for conversing with the concrete expert.
//!
//! This binary provides a streaming REPL interface for asking a
//! Gemini-backed civil-engineering expert about cement, mix ratios, and
//! structural durability.
//!
//! # Usage
//!
//! ```bash
//! # Basic usage with default settings
//! concretebot-chat
//!
//! # Specify a model
//! concretebot-chat --model gemini-2.5-pro
//!
//! # Override the expert persona
//! concretebot-chat --system "You are a soils engineer"
//!
//! # Enable voice input via an external speech-to-text command
//! concretebot-chat --dictate "hear -d"
//!
//! # Disable colors (useful for piping output)
//! concretebot-chat --no-color
//! ```
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/clear` - Clear the conversation
//! - `/model <name>` - Change the model
//! - `/system [prompt]` - Override or restore the system prompt
//! - `/mic` - Dictate a question (when configured)
//! - `/stats` - Show session statistics
//! - `/quit` - Exit the application

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use concretebot::chat::{
    ChatArgs, ChatCommand, ChatConfig, Conversation, MarkdownRenderer, Renderer, help_text,
    parse_command,
};
use concretebot::dictation::{Dictation, DictationEvent, append_transcript};
use concretebot::{Gemini, Model};

/// Main entry point for the concretebot-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("concretebot-chat [OPTIONS]");
    let config = ChatConfig::from(args);
    let use_color = config.use_color;
    let dictation = Dictation::detect(config.dictate_command.as_deref());

    let client = Gemini::new(None)?;
    let mut conversation = Conversation::new(client, config);
    let mut renderer = MarkdownRenderer::with_color(use_color);
    let mut rl = DefaultEditor::new()?;

    // Flag for stopping dictation mid-capture
    let interrupted = Arc::new(AtomicBool::new(false));

    // Set up Ctrl+C handler
    let interrupted_clone = interrupted.clone();
    ctrlc::set_handler(move || {
        interrupted_clone.store(true, Ordering::Relaxed);
    })?;

    println!("Concrete Expert (model: {})", conversation.model());
    if dictation.is_some() {
        println!("Type /help for commands, /mic to dictate, /quit to exit\n");
    } else {
        println!("Type /help for commands, /quit to exit\n");
    }

    // Shown first so the conversation opens the way it renders.
    renderer.print_info(conversation.messages()[0].content.as_str());
    println!();

    // Text carried into the next prompt (e.g. a dictated transcript).
    let mut pending = String::new();

    loop {
        // Reset interrupt flag before each input
        interrupted.store(false, Ordering::Relaxed);

        let readline = if pending.is_empty() {
            rl.readline("You: ")
        } else {
            let initial = std::mem::take(&mut pending);
            rl.readline_with_initial("You: ", (&initial, ""))
        };

        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                // Check for slash commands
                if let Some(cmd) = parse_command(line) {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Goodbye!");
                            break;
                        }
                        ChatCommand::Clear => {
                            conversation.clear();
                            renderer.print_info("Conversation cleared.");
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::Model(model_name) => {
                            conversation.set_model(Model::from(model_name.as_str()));
                            renderer.print_info(&format!("Model changed to: {}", model_name));
                        }
                        ChatCommand::System(prompt) => {
                            let restored = prompt.is_none();
                            conversation.set_system_prompt(prompt);
                            if restored {
                                renderer.print_info("System prompt restored to the expert persona.");
                            } else {
                                renderer.print_info("System prompt set.");
                            }
                        }
                        ChatCommand::Temperature(value) => {
                            conversation.set_temperature(Some(value));
                            renderer.print_info(&format!("temperature set to {:.2}", value));
                        }
                        ChatCommand::ClearTemperature => {
                            conversation.set_temperature(None);
                            renderer.print_info("temperature reset to model default");
                        }
                        ChatCommand::Mic => match &dictation {
                            Some(dictation) => {
                                let transcript =
                                    capture_dictation(dictation, &interrupted, &mut renderer)
                                        .await;
                                if transcript.is_empty() {
                                    renderer.print_info("Nothing captured.");
                                } else {
                                    pending = append_transcript(&pending, &transcript);
                                }
                            }
                            None => {
                                renderer.print_info(
                                    "Dictation is not configured (set --dictate or CONCRETEBOT_DICTATE).",
                                );
                            }
                        },
                        ChatCommand::Stats => {
                            print_stats(&conversation);
                        }
                        ChatCommand::ShowConfig => {
                            print_config(&conversation);
                        }
                        ChatCommand::Invalid(message) => {
                            renderer.print_error(&message);
                        }
                    }
                    continue;
                }

                // Regular message - send to API
                println!("Expert:");
                conversation.run_turn(line, &mut renderer).await;
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - soft interrupt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    Ok(())
}

/// Run one dictation capture to completion.
///
/// Listening ends on the command exiting, a capture error, or Ctrl-C;
/// whichever comes first. Returns the accumulated transcript.
async fn capture_dictation(
    dictation: &Dictation,
    interrupted: &Arc<AtomicBool>,
    renderer: &mut dyn Renderer,
) -> String {
    let mut transcript = String::new();
    let mut session = match dictation.start() {
        Ok(session) => session,
        Err(err) => {
            renderer.print_error(&err.to_string());
            return transcript;
        }
    };

    renderer.print_info("Listening... (finish speaking, or Ctrl-C to stop)");
    while session.is_listening() {
        tokio::select! {
            event = session.next_event() => match event {
                Ok(DictationEvent::Transcript(text)) => {
                    transcript = append_transcript(&transcript, &text);
                }
                Ok(DictationEvent::End) => break,
                Err(err) => {
                    renderer.print_error(&err.to_string());
                    break;
                }
            },
            _ = tokio::time::sleep(Duration::from_millis(100)) => {
                if interrupted.load(Ordering::Relaxed) {
                    session.stop().await;
                    break;
                }
            }
        }
    }
    transcript
}

fn print_stats(conversation: &Conversation<Gemini>) {
    let stats = conversation.stats();
    println!("    Session Statistics:");
    println!("      Model: {}", stats.model);
    println!("      Messages: {}", stats.message_count);
    match stats.session_turns {
        Some(turns) => println!("      Session: active ({} recorded turns)", turns),
        None => println!("      Session: (not yet created)"),
    }
    println!(
        "      Total tokens: {} in / {} out ({} requests)",
        stats.usage_totals.prompt_token_count,
        stats.usage_totals.candidates_token_count,
        stats.request_count
    );
    if let Some(usage) = stats.last_turn_usage {
        println!(
            "      Last turn tokens: {} in / {} out",
            usage.prompt_token_count, usage.candidates_token_count
        );
    }
}

fn print_config(conversation: &Conversation<Gemini>) {
    let stats = conversation.stats();
    println!("    Current Configuration:");
    println!("      Model: {}", stats.model);
    println!("      Temperature: {}", describe_float(stats.temperature));
    match stats.max_output_tokens {
        Some(tokens) => println!("      Max output tokens: {}", tokens),
        None => println!("      Max output tokens: (model limit)"),
    }
    let mut lines = stats.system_prompt.lines();
    if let Some(first) = lines.next() {
        println!("      System prompt: {}", first);
        for line in lines {
            println!("        {}", line);
        }
    }
}

fn describe_float(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.2}"))
        .unwrap_or_else(|| "default".to_string())
}
