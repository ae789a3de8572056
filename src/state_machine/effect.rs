//! Effects produced by state transitions

use crate::gateway::QueryScope;
use crate::transcript::Message;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Append a turn and set the pending flag in one store mutation
    RecordTurn { message: Message, pending: bool },

    /// Empty the transcript
    ClearTranscript,

    /// Ask the gateway; the outcome comes back as an event
    QueryGateway {
        request_id: u64,
        scope: QueryScope,
        question: String,
    },
}

impl Effect {
    pub fn record_request(message: Message) -> Self {
        Effect::RecordTurn {
            message,
            pending: true,
        }
    }

    pub fn record_reply(message: Message) -> Self {
        Effect::RecordTurn {
            message,
            pending: false,
        }
    }

    /// Whether executing this effect suspends on I/O
    pub fn is_async(&self) -> bool {
        matches!(self, Effect::QueryGateway { .. })
    }
}
