//! Logging trait for Gemini client operations.
//!
//! This module provides the [`ClientLogger`] trait that allows users to
//! capture and log all API interactions passing through the [`Gemini`]
//! client.
//!
//! [`Gemini`]: crate::Gemini

use crate::types::{GenerateContentRequest, GenerateContentResponse};

/// A trait for logging Gemini client operations.
///
/// Implement this trait to capture and record all API interactions,
/// including outgoing requests, complete responses, and individual
/// streaming fragments.
pub trait ClientLogger: Send + Sync {
    /// Log an outgoing request.
    ///
    /// This method is called once per `generate` or `stream_generate`
    /// call, before the request is sent.
    fn log_request(&self, request: &GenerateContentRequest);

    /// Log a complete response from a non-streaming `generate` call.
    fn log_response(&self, response: &GenerateContentResponse);

    /// Log an individual streaming fragment.
    ///
    /// This method is called for each fragment received during a
    /// streaming request, in arrival order.
    fn log_stream_event(&self, fragment: &GenerateContentResponse);
}
