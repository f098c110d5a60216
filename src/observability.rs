use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("concretebot.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("concretebot.client.request_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("concretebot.client.request_duration_seconds");

pub(crate) static STREAM_EVENTS: Counter = Counter::new("concretebot.stream.events");
pub(crate) static STREAM_ERRORS: Counter = Counter::new("concretebot.stream.errors");
pub(crate) static STREAM_BYTES: Counter = Counter::new("concretebot.stream.bytes");

pub(crate) static CONVERSATION_TURNS: Counter = Counter::new("concretebot.conversation.turns");
pub(crate) static CONVERSATION_TURN_ERRORS: Counter =
    Counter::new("concretebot.conversation.turn_errors");
pub(crate) static CONVERSATION_REJECTED_SUBMITS: Counter =
    Counter::new("concretebot.conversation.rejected_submits");

pub(crate) static DICTATION_SESSIONS: Counter = Counter::new("concretebot.dictation.sessions");
pub(crate) static DICTATION_ERRORS: Counter = Counter::new("concretebot.dictation.errors");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&STREAM_EVENTS);
    collector.register_counter(&STREAM_ERRORS);
    collector.register_counter(&STREAM_BYTES);

    collector.register_counter(&CONVERSATION_TURNS);
    collector.register_counter(&CONVERSATION_TURN_ERRORS);
    collector.register_counter(&CONVERSATION_REJECTED_SUBMITS);

    collector.register_counter(&DICTATION_SESSIONS);
    collector.register_counter(&DICTATION_ERRORS);
}
