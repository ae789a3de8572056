//! Conversation lifecycle state

use crate::config::Messages;

/// Request lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConvState {
    /// Ready for user input, no request outstanding
    #[default]
    Idle,

    /// Waiting for the answer to request `request_id`
    Requesting { request_id: u64 },
}

impl ConvState {
    /// Check if a request is outstanding
    pub fn is_pending(&self) -> bool {
        matches!(self, ConvState::Requesting { .. })
    }
}

/// Context for a conversation (immutable configuration)
#[derive(Debug, Clone, Default)]
pub struct ConvContext {
    pub messages: Messages,
}

impl ConvContext {
    pub fn new(messages: Messages) -> Self {
        Self { messages }
    }
}
