//! Events that can occur in a conversation

use crate::gateway::{GatewayError, QueryResponse, QueryScope};
use chrono::{DateTime, Utc};

/// Events that trigger state transitions.
///
/// Timestamps travel with the event so the transition stays pure.
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    UserMessage {
        text: String,
        scope: QueryScope,
        request_id: u64,
        at: DateTime<Utc>,
    },
    Clear,

    // Gateway events
    AnswerReceived {
        request_id: u64,
        response: QueryResponse,
        at: DateTime<Utc>,
    },
    RequestFailed {
        request_id: u64,
        error: GatewayError,
        at: DateTime<Utc>,
    },
}
