//! Output rendering for the chat application.
//!
//! This module provides a trait-based rendering abstraction over how
//! streamed model output reaches the terminal. Model output is markdown
//! and is styled for display only; nothing downstream attaches meaning to
//! the formatting.

use std::io::{self, Stdout, Write};

/// ANSI escape code for bold text.
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code for dim text (used for informational messages).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for cyan text (used for inline code).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// Trait for rendering chat output.
///
/// This abstraction allows for different rendering strategies:
/// - Markdown-styled ANSI output for interactive terminals
/// - Plain passthrough (for piping/redirecting)
/// - Silent collection in tests
pub trait Renderer: Send {
    /// Print a chunk of response text.
    ///
    /// This is called incrementally as fragments are streamed from the
    /// API.
    fn print_text(&mut self, text: &str);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Called when a response is complete.
    ///
    /// Used to flush buffered output and ensure proper newlines after
    /// streaming.
    fn finish_response(&mut self);
}

/// Plain text renderer that writes chunks through unstyled.
pub struct PlainTextRenderer {
    stdout: Stdout,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer.
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
        }
    }

    /// Flushes stdout to ensure immediate display of streamed content.
    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn print_text(&mut self, text: &str) {
        print!("{text}");
        self.flush();
    }

    fn print_error(&mut self, error: &str) {
        eprintln!("\nError: {error}");
    }

    fn print_info(&mut self, info: &str) {
        println!("{info}");
    }

    fn finish_response(&mut self) {
        println!();
        self.flush();
    }
}

/// Markdown-styled renderer.
///
/// Buffers streamed chunks until a full line is available, then prints
/// the line with lightweight ANSI styling: headers and `**bold**` spans
/// in bold, bullet markers normalized, inline code in cyan. Styling is
/// line-at-a-time; no state crosses line boundaries.
pub struct MarkdownRenderer {
    stdout: Stdout,
    use_color: bool,
    pending: String,
}

impl MarkdownRenderer {
    /// Creates a new MarkdownRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new MarkdownRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
            pending: String::new(),
        }
    }

    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }

    fn emit_complete_lines(&mut self) {
        while let Some(newline) = self.pending.find('\n') {
            let line: String = self.pending.drain(..=newline).collect();
            let line = line.trim_end_matches(['\n', '\r']);
            println!("{}", style_line(line, self.use_color));
        }
        self.flush();
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for MarkdownRenderer {
    fn print_text(&mut self, text: &str) {
        self.pending.push_str(text);
        self.emit_complete_lines();
    }

    fn print_error(&mut self, error: &str) {
        eprintln!("\nError: {error}");
    }

    fn print_info(&mut self, info: &str) {
        if self.use_color {
            println!("{ANSI_DIM}{info}{ANSI_RESET}");
        } else {
            println!("{info}");
        }
    }

    fn finish_response(&mut self) {
        if !self.pending.is_empty() {
            let line = std::mem::take(&mut self.pending);
            println!("{}", style_line(line.trim_end_matches('\r'), self.use_color));
        }
        println!();
        self.flush();
    }
}

/// Style a single markdown line for terminal display.
///
/// Recognizes `#` headers, `-`/`*` bullets, `**bold**` spans, and
/// backtick inline code. Unterminated spans are left as written.
fn style_line(line: &str, use_color: bool) -> String {
    let (prefix, rest) = split_block_marker(line);
    if !use_color {
        return format!("{prefix}{rest}");
    }

    if line.trim_start().starts_with('#') {
        let text = rest.trim_start_matches('#').trim_start();
        return format!("{ANSI_BOLD}{text}{ANSI_RESET}");
    }

    format!("{prefix}{}", style_spans(rest))
}

/// Normalize a leading bullet marker, returning the replacement prefix
/// and the remainder of the line.
fn split_block_marker(line: &str) -> (String, &str) {
    let indent_len = line.len() - line.trim_start().len();
    let (indent, trimmed) = line.split_at(indent_len);
    for marker in ["- ", "* "] {
        if let Some(rest) = trimmed.strip_prefix(marker) {
            return (format!("{indent}• "), rest);
        }
    }
    (indent.to_string(), trimmed)
}

/// Apply `**bold**` and backtick code styling within a line.
fn style_spans(text: &str) -> String {
    let mut styled = String::with_capacity(text.len());
    let mut rest = text;
    loop {
        let bold = rest.find("**");
        let code = rest.find('`');
        match (bold, code) {
            (Some(b), c) if c.is_none() || b < c.unwrap() => {
                let Some(close) = rest[b + 2..].find("**") else {
                    styled.push_str(rest);
                    return styled;
                };
                styled.push_str(&rest[..b]);
                styled.push_str(ANSI_BOLD);
                styled.push_str(&rest[b + 2..b + 2 + close]);
                styled.push_str(ANSI_RESET);
                rest = &rest[b + 2 + close + 2..];
            }
            (_, Some(c)) => {
                let Some(close) = rest[c + 1..].find('`') else {
                    styled.push_str(rest);
                    return styled;
                };
                styled.push_str(&rest[..c]);
                styled.push_str(ANSI_CYAN);
                styled.push_str(&rest[c + 1..c + 1 + close]);
                styled.push_str(ANSI_RESET);
                rest = &rest[c + 1 + close + 1..];
            }
            (None, None) => {
                styled.push_str(rest);
                return styled;
            }
            // When `code` is `None`, the first arm's guard (`c.is_none()`)
            // always matches first, so this case is never reached.
            (Some(_), None) => unreachable!(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_line_unchanged() {
        assert_eq!(style_line("just text", true), "just text");
        assert_eq!(style_line("just text", false), "just text");
    }

    #[test]
    fn header_becomes_bold() {
        assert_eq!(
            style_line("## Mix Ratios", true),
            format!("{ANSI_BOLD}Mix Ratios{ANSI_RESET}")
        );
        assert_eq!(style_line("## Mix Ratios", false), "## Mix Ratios");
    }

    #[test]
    fn bullets_normalized() {
        assert_eq!(style_line("- water", true), "• water");
        assert_eq!(style_line("* cement", true), "• cement");
        assert_eq!(style_line("  - nested", true), "  • nested");
        assert_eq!(style_line("- water", false), "• water");
    }

    #[test]
    fn bold_spans_styled() {
        assert_eq!(
            style_line("use **less** water", true),
            format!("use {ANSI_BOLD}less{ANSI_RESET} water")
        );
    }

    #[test]
    fn unterminated_bold_left_alone() {
        assert_eq!(style_line("a ** b", true), "a ** b");
    }

    #[test]
    fn inline_code_styled() {
        assert_eq!(
            style_line("run `slump test` first", true),
            format!("run {ANSI_CYAN}slump test{ANSI_RESET} first")
        );
    }
}
