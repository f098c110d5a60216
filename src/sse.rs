//! Server-Sent Events (SSE) processing for streaming responses.
//!
//! This module handles parsing of `alt=sse` streams from the Generative
//! Language API, converting raw byte streams into structured
//! `GenerateContentResponse` fragments. The wire format is a sequence of
//! `data: {json}` events delimited by blank lines; the stream simply ends
//! when the response is complete.

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};

use crate::error::{Error, Result};
use crate::observability;
use crate::types::GenerateContentResponse;

/// Process a stream of bytes into a stream of response fragments.
///
/// This function takes a byte stream from an HTTP response and converts it
/// into a stream of parsed `GenerateContentResponse` fragments, handling
/// SSE framing, buffering across chunk boundaries, and error conditions.
pub fn process_sse<S>(byte_stream: S) -> impl Stream<Item = Result<GenerateContentResponse>>
where
    S: Stream<Item = std::result::Result<Bytes, reqwest::Error>> + Unpin + 'static,
{
    // Convert reqwest errors to our error type
    let stream = byte_stream.map(|result| {
        result
            .map_err(|e| Error::streaming(format!("Error in HTTP stream: {e}"), Some(Box::new(e))))
    });

    // Use a state machine to process the SSE stream
    let buffer = String::new();

    stream::unfold(
        (stream, buffer),
        move |(mut stream, mut buffer)| async move {
            loop {
                // First check if we have a complete event in the buffer
                if let Some((event, remaining)) = extract_event(&buffer) {
                    buffer = remaining;
                    let Some(event) = event else {
                        // Comment/keep-alive frame; keep draining.
                        continue;
                    };
                    match &event {
                        Ok(_) => observability::STREAM_EVENTS.click(),
                        Err(_) => observability::STREAM_ERRORS.click(),
                    }
                    return Some((event, (stream, buffer)));
                }

                // Read more data
                match stream.next().await {
                    Some(Ok(bytes)) => {
                        observability::STREAM_BYTES.count(bytes.len() as u64);
                        match String::from_utf8(bytes.to_vec()) {
                            Ok(text) => buffer.push_str(&text),
                            Err(e) => {
                                observability::STREAM_ERRORS.click();
                                return Some((
                                    Err(Error::encoding(
                                        format!("Invalid UTF-8 in stream: {e}"),
                                        Some(Box::new(e)),
                                    )),
                                    (stream, buffer),
                                ));
                            }
                        }
                    }
                    Some(Err(e)) => {
                        observability::STREAM_ERRORS.click();
                        return Some((Err(e), (stream, buffer)));
                    }
                    None => {
                        // End of stream; a trailing event may lack its
                        // blank-line terminator.
                        if !buffer.trim().is_empty() {
                            let leftover = std::mem::take(&mut buffer);
                            if let Some(event) = parse_event(&leftover) {
                                return Some((event, (stream, buffer)));
                            }
                        }
                        return None;
                    }
                }
            }
        },
    )
}

/// Extract a complete SSE event from the front of the buffer.
///
/// Returns the parsed event (or `None` for comment/keep-alive frames) plus
/// whatever follows the event's blank-line delimiter. Returns `None`
/// outright when the buffer does not yet hold a complete event.
#[allow(clippy::type_complexity)]
fn extract_event(buffer: &str) -> Option<(Option<Result<GenerateContentResponse>>, String)> {
    let (event_text, rest) = split_once_frame(buffer)?;
    Some((parse_event(event_text), rest.to_string()))
}

/// Split the buffer at the first blank-line frame delimiter, tolerating
/// both `\n\n` and `\r\n\r\n` framing.
fn split_once_frame(buffer: &str) -> Option<(&str, &str)> {
    let lf = buffer.find("\n\n");
    let crlf = buffer.find("\r\n\r\n");
    match (lf, crlf) {
        (Some(a), Some(b)) if b < a => Some((&buffer[..b], &buffer[b + 4..])),
        (Some(a), _) => Some((&buffer[..a], &buffer[a + 2..])),
        (None, Some(b)) => Some((&buffer[..b], &buffer[b + 4..])),
        (None, None) => None,
    }
}

/// Parse a single SSE event's lines into a response fragment.
///
/// Returns `None` for events with no data payload (comments, blank
/// frames).
fn parse_event(event_text: &str) -> Option<Result<GenerateContentResponse>> {
    let mut data = String::new();
    for line in event_text.lines() {
        if line.starts_with(':') {
            continue;
        }
        if let Some(payload) = line.strip_prefix("data:") {
            if !data.is_empty() {
                data.push('\n');
            }
            data.push_str(payload.trim_start());
        }
    }

    if data.is_empty() {
        return None;
    }

    match serde_json::from_str::<GenerateContentResponse>(&data) {
        Ok(response) => Some(Ok(response)),
        Err(e) => Some(Err(Error::serialization(
            format!("Failed to parse stream fragment: {e}"),
            Some(Box::new(e)),
        ))),
    }
}
