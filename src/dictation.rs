//! Speech-to-text capture via an external dictation command.
//!
//! There is no portable microphone API to bind against, so dictation is
//! delegated to a user-supplied command (for example a whisper.cpp
//! wrapper) that writes recognized utterances to stdout, one per line.
//! The affordance is feature-detected: when no command is configured the
//! microphone is silently unavailable.
//!
//! A capture terminates three ways: an explicit [`DictationSession::stop`],
//! a capture error, or the command exiting on its own at the end of the
//! utterance. All three leave the session not listening.

use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStdout, Command};

use crate::error::{Error, Result};
use crate::observability;

/// Environment variable naming the dictation command.
pub const DICTATE_ENV: &str = "CONCRETEBOT_DICTATE";

/// One notification from an in-progress capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictationEvent {
    /// A recognized utterance.
    Transcript(String),

    /// The command exited; the utterance is over.
    End,
}

/// A configured (but not yet started) dictation capability.
#[derive(Debug, Clone)]
pub struct Dictation {
    program: String,
    args: Vec<String>,
}

impl Dictation {
    /// Feature-detect dictation support.
    ///
    /// The command comes from the explicit configuration when present,
    /// falling back to the `CONCRETEBOT_DICTATE` environment variable.
    /// Returns `None` when neither names a program.
    pub fn detect(configured: Option<&str>) -> Option<Self> {
        let command = match configured {
            Some(command) => command.to_string(),
            None => std::env::var(DICTATE_ENV).ok()?,
        };
        let mut words = command.split_whitespace().map(str::to_string);
        let program = words.next()?;
        Some(Self {
            program,
            args: words.collect(),
        })
    }

    /// The configured command line, for display.
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    /// Spawn the dictation command and begin listening.
    pub fn start(&self) -> Result<DictationSession> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                observability::DICTATION_ERRORS.click();
                Error::capture(format!(
                    "failed to start dictation command {:?}: {e}",
                    self.program
                ))
            })?;

        let stdout = child.stdout.take().ok_or_else(|| {
            observability::DICTATION_ERRORS.click();
            Error::capture("dictation command has no stdout")
        })?;

        observability::DICTATION_SESSIONS.click();
        Ok(DictationSession {
            child,
            lines: BufReader::new(stdout).lines(),
            listening: true,
        })
    }
}

/// A running capture: a spawned dictation command being read line by
/// line.
#[derive(Debug)]
pub struct DictationSession {
    child: Child,
    lines: Lines<BufReader<ChildStdout>>,
    listening: bool,
}

impl DictationSession {
    /// True while the command is still running and being read.
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Wait for the next capture notification.
    ///
    /// Blank lines are skipped. A read failure stops the session and
    /// surfaces as a capture error.
    pub async fn next_event(&mut self) -> Result<DictationEvent> {
        if !self.listening {
            return Ok(DictationEvent::End);
        }
        loop {
            match self.lines.next_line().await {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    return Ok(DictationEvent::Transcript(line.to_string()));
                }
                Ok(None) => {
                    self.listening = false;
                    let _ = self.child.wait().await;
                    return Ok(DictationEvent::End);
                }
                Err(e) => {
                    observability::DICTATION_ERRORS.click();
                    self.listening = false;
                    let _ = self.child.start_kill();
                    return Err(Error::capture(format!("dictation read failed: {e}")));
                }
            }
        }
    }

    /// Explicitly stop listening, killing the command if it is still
    /// running.
    pub async fn stop(&mut self) {
        if !self.listening {
            return;
        }
        self.listening = false;
        let _ = self.child.start_kill();
        let _ = self.child.wait().await;
    }
}

/// Merge a recognized transcript into already-typed input.
///
/// Dictated text is appended to, not replacing, whatever was typed,
/// separated by a single space.
pub fn append_transcript(existing: &str, transcript: &str) -> String {
    if existing.is_empty() {
        transcript.to_string()
    } else {
        format!("{existing} {transcript}")
    }
}
