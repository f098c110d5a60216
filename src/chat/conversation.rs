//! The conversation controller.
//!
//! This module owns the ordered, append-only message list and the
//! streaming-update contract: one submitted line becomes one user message
//! and one model placeholder, the placeholder is filled in place as
//! fragments arrive, and every turn settles exactly once, success or
//! failure, releasing the single-flight lock.

use futures::StreamExt;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::chat::config::ChatConfig;
use crate::chat::session::{ChatSession, Transport};
use crate::error::Error;
use crate::observability;
use crate::render::Renderer;
use crate::types::{Model, Role, UsageMetadata};

/// Greeting shown before the first exchange.
pub const WELCOME: &str = "Hello! I'm your concrete expert. Ask me anything about \
cement, mix ratios, curing, or structural durability.";

/// Fixed text shown in place of a transport failure.
///
/// The underlying error is reported separately as a diagnostic; the
/// conversation itself only ever carries this generic text.
pub const APOLOGY: &str = "I apologize, but I encountered an error processing your \
request. Please verify your API key or try again later.";

/// Opaque identifier for a message within one conversation.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MessageId(u64);

/// One entry in the conversation.
///
/// Content is mutable while `is_streaming` is set; once a turn settles
/// the message never changes again. Messages are never removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Identifier, unique within the conversation.
    pub id: MessageId,

    /// Who authored the message.
    pub role: Role,

    /// The message text. For a streaming placeholder this is the full
    /// accumulated buffer, replaced on every fragment.
    pub content: String,

    /// When the message was appended.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,

    /// True while fragments are still being merged into this message.
    pub is_streaming: bool,
}

/// How a settled turn ended.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The stream completed and the reply was recorded.
    Success,

    /// The transport failed; the apology was appended and any partial
    /// text kept.
    Error,
}

/// Lifecycle of the current turn.
///
/// Transitions run strictly forward: `Idle -> UserAppended ->
/// PlaceholderAppended -> Streaming -> Settled`. A new turn may begin
/// from `Idle` or any `Settled` state; everything in between holds the
/// single-flight lock.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TurnPhase {
    /// No turn has been submitted yet.
    Idle,

    /// The user message has been appended.
    UserAppended,

    /// The empty streaming placeholder has been appended.
    PlaceholderAppended,

    /// At least one fragment has been merged.
    Streaming,

    /// The turn finished and the lock is released.
    Settled(TurnOutcome),
}

/// Aggregated stats for a conversation.
#[derive(Debug, Clone)]
pub struct ConversationStats {
    /// The configured model.
    pub model: Model,
    /// The number of messages in the visible list.
    pub message_count: usize,
    /// Turns recorded in the active session, if one exists.
    pub session_turns: Option<usize>,
    /// The system instruction.
    pub system_prompt: String,
    /// The sampling temperature, if set.
    pub temperature: Option<f64>,
    /// The maximum tokens per response, if set.
    pub max_output_tokens: Option<u32>,
    /// Token totals across all successful turns.
    pub usage_totals: UsageMetadata,
    /// Token usage for the last successful turn, if any.
    pub last_turn_usage: Option<UsageMetadata>,
    /// Total number of requests issued.
    pub request_count: u64,
}

/// The conversation controller.
///
/// Owns the message list, the current turn's state machine, and the one
/// chat session handle (created lazily, replaced explicitly).
pub struct Conversation<T: Transport> {
    transport: T,
    config: ChatConfig,
    session: Option<ChatSession>,
    messages: Vec<Message>,
    phase: TurnPhase,
    placeholder: Option<MessageId>,
    buffer: String,
    next_id: u64,
    usage_totals: UsageMetadata,
    last_turn_usage: Option<UsageMetadata>,
    request_count: u64,
}

impl<T: Transport> Conversation<T> {
    /// Creates a new conversation over the given transport.
    pub fn new(transport: T, config: ChatConfig) -> Self {
        let mut conversation = Self {
            transport,
            config,
            session: None,
            messages: Vec::new(),
            phase: TurnPhase::Idle,
            placeholder: None,
            buffer: String::new(),
            next_id: 0,
            usage_totals: UsageMetadata::default(),
            last_turn_usage: None,
            request_count: 0,
        };
        conversation.push_message(Role::Model, WELCOME.to_string(), false);
        conversation
    }

    /// The visible message list, in conversation order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The number of messages in the visible list.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// The current turn phase.
    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// True while a turn holds the single-flight lock.
    pub fn is_in_flight(&self) -> bool {
        !matches!(self.phase, TurnPhase::Idle | TurnPhase::Settled(_))
    }

    /// The active session, if one has been created.
    pub fn session(&self) -> Option<&ChatSession> {
        self.session.as_ref()
    }

    /// Create a fresh session, silently discarding any previous one.
    ///
    /// There is never more than one active session; the latest wins.
    pub fn initialize_session(&mut self) {
        self.session = Some(ChatSession::new(&self.config));
    }

    fn ensure_session(&mut self) -> &ChatSession {
        let config = &self.config;
        self.session
            .get_or_insert_with(|| ChatSession::new(config))
    }

    /// The configured model.
    pub fn model(&self) -> &Model {
        &self.config.model
    }

    /// Changes the model. Takes effect through a fresh session.
    pub fn set_model(&mut self, model: Model) {
        self.config.model = model;
        self.session = None;
    }

    /// The configured system prompt.
    pub fn system_prompt(&self) -> &str {
        &self.config.system_prompt
    }

    /// Sets or restores the system prompt. `None` restores the default
    /// persona. Takes effect through a fresh session.
    pub fn set_system_prompt(&mut self, prompt: Option<String>) {
        self.config.system_prompt =
            prompt.unwrap_or_else(|| crate::chat::config::DEFAULT_SYSTEM_PROMPT.to_string());
        self.session = None;
    }

    /// Sets the sampling temperature. Takes effect through a fresh
    /// session.
    pub fn set_temperature(&mut self, temperature: Option<f64>) {
        self.config.temperature = temperature;
        self.session = None;
    }

    /// Clears the conversation back to the greeting and drops the
    /// session; the next turn creates a fresh one lazily.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.session = None;
        self.phase = TurnPhase::Idle;
        self.placeholder = None;
        self.buffer.clear();
        self.push_message(Role::Model, WELCOME.to_string(), false);
    }

    /// Returns the current statistics snapshot.
    pub fn stats(&self) -> ConversationStats {
        ConversationStats {
            model: self.config.model.clone(),
            message_count: self.message_count(),
            session_turns: self.session.as_ref().map(|s| s.history().len()),
            system_prompt: self.config.system_prompt.clone(),
            temperature: self.config.temperature,
            max_output_tokens: self.config.max_output_tokens,
            usage_totals: self.usage_totals,
            last_turn_usage: self.last_turn_usage,
            request_count: self.request_count,
        }
    }

    fn push_message(&mut self, role: Role, content: String, is_streaming: bool) -> MessageId {
        let id = MessageId(self.next_id);
        self.next_id += 1;
        self.messages.push(Message {
            id,
            role,
            content,
            timestamp: OffsetDateTime::now_utc(),
            is_streaming,
        });
        id
    }

    fn message_mut(&mut self, id: MessageId) -> Option<&mut Message> {
        self.messages.iter_mut().find(|m| m.id == id)
    }

    /// Begin a turn: append the user message and an empty streaming
    /// placeholder.
    ///
    /// Returns `None`, leaving the list untouched, for empty or
    /// whitespace-only input and while another turn is in flight.
    pub fn begin_turn(&mut self, text: &str) -> Option<MessageId> {
        let text = text.trim();
        if text.is_empty() || self.is_in_flight() {
            observability::CONVERSATION_REJECTED_SUBMITS.click();
            return None;
        }

        self.push_message(Role::User, text.to_string(), false);
        self.phase = TurnPhase::UserAppended;

        let placeholder = self.push_message(Role::Model, String::new(), true);
        self.phase = TurnPhase::PlaceholderAppended;
        self.placeholder = Some(placeholder);
        self.buffer.clear();
        Some(placeholder)
    }

    /// Merge one streamed fragment.
    ///
    /// The fragment is concatenated onto the turn buffer and the
    /// placeholder content is replaced with the full buffer, so a
    /// re-render after any fragment reflects exactly the text streamed so
    /// far.
    pub fn apply_chunk(&mut self, fragment: &str) {
        self.buffer.push_str(fragment);
        let full = self.buffer.clone();
        if let Some(id) = self.placeholder {
            if let Some(message) = self.message_mut(id) {
                message.content = full;
            }
        }
        self.phase = TurnPhase::Streaming;
    }

    /// Settle the current turn.
    ///
    /// Runs on every exit path: the placeholder's streaming flag is
    /// cleared and the single-flight lock released. On failure a
    /// separate apology message is appended; the placeholder keeps
    /// whatever partial content it accumulated.
    pub fn settle(&mut self, outcome: TurnOutcome) {
        if let Some(id) = self.placeholder.take() {
            if let Some(message) = self.message_mut(id) {
                message.is_streaming = false;
            }
        }
        if outcome == TurnOutcome::Error {
            observability::CONVERSATION_TURN_ERRORS.click();
            self.push_message(Role::Model, APOLOGY.to_string(), false);
        }
        self.phase = TurnPhase::Settled(outcome);
    }

    /// Run one full turn: submit `text`, stream the reply into the
    /// placeholder, and settle.
    ///
    /// Returns `None` when the submission was rejected (empty input or a
    /// turn already in flight). Transport failures are recovered into the
    /// conversation and reported as `Some(TurnOutcome::Error)`; the
    /// underlying error goes to the renderer as a diagnostic.
    pub async fn run_turn(
        &mut self,
        text: &str,
        renderer: &mut dyn Renderer,
    ) -> Option<TurnOutcome> {
        let text = text.trim().to_string();
        self.begin_turn(&text)?;
        observability::CONVERSATION_TURNS.click();

        let (model, request) = {
            let session = self.ensure_session();
            (session.model().clone(), session.request_for(&text))
        };

        let mut stream = match self.transport.stream_generate(&model, request).await {
            Ok(stream) => stream,
            Err(err) => {
                self.request_count += 1;
                return Some(self.fail(err, renderer));
            }
        };
        self.request_count += 1;

        let mut turn_usage = None;
        while let Some(item) = stream.next().await {
            match item {
                Ok(fragment) => {
                    let piece = fragment.text();
                    if !piece.is_empty() {
                        self.apply_chunk(&piece);
                        renderer.print_text(&piece);
                    }
                    if let Some(usage) = fragment.usage_metadata {
                        turn_usage = Some(usage);
                    }
                }
                Err(err) => {
                    return Some(self.fail(err, renderer));
                }
            }
        }

        let reply = self.buffer.clone();
        if let Some(session) = self.session.as_mut() {
            session.record_exchange(&text, &reply);
        }
        if let Some(usage) = turn_usage {
            self.usage_totals = self.usage_totals + usage;
            self.last_turn_usage = Some(usage);
        }
        self.settle(TurnOutcome::Success);
        renderer.finish_response();
        Some(TurnOutcome::Success)
    }

    fn fail(&mut self, err: Error, renderer: &mut dyn Renderer) -> TurnOutcome {
        renderer.finish_response();
        renderer.print_error(&err.to_string());
        self.settle(TurnOutcome::Error);
        renderer.print_text(APOLOGY);
        renderer.finish_response();
        TurnOutcome::Error
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use futures::stream;

    use super::*;
    use crate::client::GenerateContentStream;
    use crate::error::Result;
    use crate::types::{GenerateContentRequest, GenerateContentResponse};

    /// A transport that replays one scripted fragment list per call.
    struct ScriptedTransport {
        scripts: Mutex<Vec<Vec<Result<GenerateContentResponse>>>>,
        requests: Mutex<Vec<GenerateContentRequest>>,
    }

    impl ScriptedTransport {
        fn new(scripts: Vec<Vec<Result<GenerateContentResponse>>>) -> Self {
            Self {
                scripts: Mutex::new(scripts),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn ok_chunks(chunks: &[&str]) -> Vec<Result<GenerateContentResponse>> {
            chunks
                .iter()
                .map(|c| Ok(GenerateContentResponse::from_text(*c)))
                .collect()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn stream_generate(
            &self,
            _model: &Model,
            request: GenerateContentRequest,
        ) -> Result<GenerateContentStream> {
            self.requests.lock().unwrap().push(request);
            let mut scripts = self.scripts.lock().unwrap();
            if scripts.is_empty() {
                return Err(Error::connection("no script left", None));
            }
            let script = scripts.remove(0);
            Ok(Box::pin(stream::iter(script)))
        }
    }

    /// A renderer that collects streamed text for assertions.
    #[derive(Default)]
    struct CollectingRenderer {
        text: String,
        errors: Vec<String>,
    }

    impl Renderer for CollectingRenderer {
        fn print_text(&mut self, text: &str) {
            self.text.push_str(text);
        }

        fn print_error(&mut self, error: &str) {
            self.errors.push(error.to_string());
        }

        fn print_info(&mut self, _info: &str) {}

        fn finish_response(&mut self) {}
    }

    fn conversation(
        scripts: Vec<Vec<Result<GenerateContentResponse>>>,
    ) -> Conversation<ScriptedTransport> {
        Conversation::new(ScriptedTransport::new(scripts), ChatConfig::default())
    }

    #[test]
    fn opens_with_welcome_message() {
        let conversation = conversation(vec![]);
        assert_eq!(conversation.message_count(), 1);
        assert_eq!(conversation.messages()[0].role, Role::Model);
        assert_eq!(conversation.messages()[0].content, WELCOME);
        assert!(!conversation.is_in_flight());
    }

    #[test]
    fn begin_turn_appends_user_and_placeholder() {
        let mut conversation = conversation(vec![]);
        let placeholder = conversation.begin_turn("How strong is M25?").unwrap();

        assert_eq!(conversation.message_count(), 3);
        let user = &conversation.messages()[1];
        assert_eq!(user.role, Role::User);
        assert_eq!(user.content, "How strong is M25?");
        assert!(!user.is_streaming);

        let model = &conversation.messages()[2];
        assert_eq!(model.id, placeholder);
        assert_eq!(model.role, Role::Model);
        assert_eq!(model.content, "");
        assert!(model.is_streaming);

        assert_eq!(conversation.phase(), TurnPhase::PlaceholderAppended);
        assert!(conversation.is_in_flight());
    }

    #[test]
    fn empty_input_is_a_no_op() {
        let mut conversation = conversation(vec![]);
        assert!(conversation.begin_turn("").is_none());
        assert!(conversation.begin_turn("   \t ").is_none());
        assert_eq!(conversation.message_count(), 1);
        assert_eq!(conversation.phase(), TurnPhase::Idle);
    }

    #[test]
    fn in_flight_submission_is_rejected() {
        let mut conversation = conversation(vec![]);
        conversation.begin_turn("first").unwrap();
        let count = conversation.message_count();

        assert!(conversation.begin_turn("second").is_none());
        assert_eq!(conversation.message_count(), count);
    }

    #[test]
    fn chunks_replace_placeholder_with_full_buffer() {
        let mut conversation = conversation(vec![]);
        let placeholder = conversation.begin_turn("tell me about concrete").unwrap();
        let content = |c: &Conversation<ScriptedTransport>| {
            c.messages()
                .iter()
                .find(|m| m.id == placeholder)
                .unwrap()
                .content
                .clone()
        };

        conversation.apply_chunk("Con");
        assert_eq!(content(&conversation), "Con");
        conversation.apply_chunk("crete ");
        assert_eq!(content(&conversation), "Concrete ");
        conversation.apply_chunk("is strong.");
        assert_eq!(content(&conversation), "Concrete is strong.");
        assert_eq!(conversation.phase(), TurnPhase::Streaming);
    }

    #[tokio::test]
    async fn successful_turn_streams_and_settles() {
        let mut conversation = conversation(vec![ScriptedTransport::ok_chunks(&[
            "Con", "crete ", "is strong.",
        ])]);
        let mut renderer = CollectingRenderer::default();

        let outcome = conversation.run_turn("how strong?", &mut renderer).await;
        assert_eq!(outcome, Some(TurnOutcome::Success));
        assert_eq!(renderer.text, "Concrete is strong.");

        // One user message and one settled model message for the turn.
        assert_eq!(conversation.message_count(), 3);
        let reply = &conversation.messages()[2];
        assert_eq!(reply.content, "Concrete is strong.");
        assert!(!reply.is_streaming);
        assert_eq!(conversation.phase(), TurnPhase::Settled(TurnOutcome::Success));
        assert!(!conversation.is_in_flight());

        // The session recorded the exchange in causal order.
        let session = conversation.session().unwrap();
        assert_eq!(session.history().len(), 2);
        assert_eq!(session.history()[0].text(), "how strong?");
        assert_eq!(session.history()[1].text(), "Concrete is strong.");
    }

    #[tokio::test]
    async fn failure_before_any_chunk_appends_apology() {
        let mut conversation =
            conversation(vec![vec![Err(Error::connection("refused", None))]]);
        let mut renderer = CollectingRenderer::default();

        let outcome = conversation.run_turn("hello?", &mut renderer).await;
        assert_eq!(outcome, Some(TurnOutcome::Error));

        // welcome, user, placeholder, apology
        assert_eq!(conversation.message_count(), 4);
        let placeholder = &conversation.messages()[2];
        assert_eq!(placeholder.role, Role::Model);
        assert_eq!(placeholder.content, "");
        assert!(!placeholder.is_streaming);

        let apology = &conversation.messages()[3];
        assert_eq!(apology.role, Role::Model);
        assert_eq!(apology.content, APOLOGY);
        assert!(!apology.is_streaming);

        assert!(!renderer.errors.is_empty());
        assert!(!conversation.is_in_flight());
    }

    #[tokio::test]
    async fn failure_mid_stream_keeps_partial_content() {
        let mut conversation = conversation(vec![vec![
            Ok(GenerateContentResponse::from_text("Partial ")),
            Err(Error::streaming("connection reset", None)),
        ]]);
        let mut renderer = CollectingRenderer::default();

        let outcome = conversation.run_turn("go on", &mut renderer).await;
        assert_eq!(outcome, Some(TurnOutcome::Error));

        let placeholder = &conversation.messages()[2];
        assert_eq!(placeholder.content, "Partial ");
        assert!(!placeholder.is_streaming);

        // The failed turn is not replayed to the remote model.
        assert_eq!(conversation.session().unwrap().history().len(), 0);
    }

    #[tokio::test]
    async fn settling_releases_the_lock_for_the_next_turn() {
        let mut conversation = conversation(vec![
            vec![Err(Error::timeout("too slow"))],
            ScriptedTransport::ok_chunks(&["recovered"]),
        ]);
        let mut renderer = CollectingRenderer::default();

        assert_eq!(
            conversation.run_turn("first", &mut renderer).await,
            Some(TurnOutcome::Error)
        );
        assert!(!conversation.is_in_flight());

        assert_eq!(
            conversation.run_turn("second", &mut renderer).await,
            Some(TurnOutcome::Success)
        );
    }

    #[tokio::test]
    async fn rejected_submission_issues_no_request() {
        let mut conversation = conversation(vec![]);
        let mut renderer = CollectingRenderer::default();

        assert_eq!(conversation.run_turn("  ", &mut renderer).await, None);
        assert_eq!(conversation.message_count(), 1);
        assert!(
            conversation
                .transport
                .requests
                .lock()
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn reinitializing_leaves_one_fresh_session() {
        let mut conversation = conversation(vec![]);
        conversation.initialize_session();
        conversation
            .session
            .as_mut()
            .unwrap()
            .record_exchange("q", "a");

        conversation.initialize_session();
        let session = conversation.session().unwrap();
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn usage_metadata_accumulates_across_turns() {
        let scripts = vec![
            vec![Ok(GenerateContentResponse {
                candidates: vec![crate::types::Candidate::new(
                    crate::types::Content::model("hi"),
                )],
                usage_metadata: Some(UsageMetadata::new(10, 5)),
            })],
            vec![Ok(GenerateContentResponse {
                candidates: vec![crate::types::Candidate::new(
                    crate::types::Content::model("again"),
                )],
                usage_metadata: Some(UsageMetadata::new(20, 7)),
            })],
        ];
        let mut conversation = conversation(scripts);
        let mut renderer = CollectingRenderer::default();

        conversation.run_turn("one", &mut renderer).await;
        conversation.run_turn("two", &mut renderer).await;

        let stats = conversation.stats();
        assert_eq!(stats.usage_totals, UsageMetadata::new(30, 12));
        assert_eq!(stats.last_turn_usage, Some(UsageMetadata::new(20, 7)));
        assert_eq!(stats.request_count, 2);
    }

    #[test]
    fn clear_resets_to_greeting_and_drops_session() {
        let mut conversation = conversation(vec![]);
        conversation.initialize_session();
        conversation.begin_turn("hello").unwrap();
        conversation.settle(TurnOutcome::Success);

        conversation.clear();
        assert_eq!(conversation.message_count(), 1);
        assert_eq!(conversation.messages()[0].content, WELCOME);
        assert!(conversation.session().is_none());
        assert!(!conversation.is_in_flight());
    }

    #[test]
    fn reconfiguring_discards_the_session() {
        let mut conversation = conversation(vec![]);
        conversation.initialize_session();
        conversation.set_model("gemini-2.5-pro".parse().unwrap());
        assert!(conversation.session().is_none());

        conversation.initialize_session();
        conversation.set_temperature(Some(0.2));
        assert!(conversation.session().is_none());
    }
}
