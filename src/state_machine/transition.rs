//! Pure state transition function
//!
//! Given the same state, context and event this always produces the same
//! new state and effects. All I/O happens in the controller that executes
//! the effects.

use super::{ConvContext, ConvState, Effect, Event};
use crate::transcript::Message;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ConvState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ConvState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Events the current state refuses. None of them change anything.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Empty message ignored")]
    EmptyUtterance,
    #[error("A request is already in flight")]
    Busy,
    #[error("Discarding reply to request {request_id}, no longer outstanding")]
    StaleResponse { request_id: u64 },
}

pub fn transition(
    state: &ConvState,
    context: &ConvContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // User messages
        // ============================================================
        (_, Event::UserMessage { text, .. }) if text.trim().is_empty() => {
            Err(TransitionError::EmptyUtterance)
        }

        // Idle + UserMessage -> Requesting
        (
            ConvState::Idle,
            Event::UserMessage {
                text,
                scope,
                request_id,
                at,
            },
        ) => Ok(TransitionResult::new(ConvState::Requesting { request_id })
            .with_effect(Effect::record_request(Message::user(text.clone(), at)))
            .with_effect(Effect::QueryGateway {
                request_id,
                scope,
                question: text,
            })),

        // At most one request in flight
        (ConvState::Requesting { .. }, Event::UserMessage { .. }) => Err(TransitionError::Busy),

        // ============================================================
        // Gateway outcomes
        // ============================================================

        // Requesting + AnswerReceived -> Idle
        (
            ConvState::Requesting { request_id: current },
            Event::AnswerReceived {
                request_id,
                response,
                at,
            },
        ) if *current == request_id => {
            let message = response.into_message(&context.messages.no_answer, at);
            Ok(TransitionResult::new(ConvState::Idle).with_effect(Effect::record_reply(message)))
        }

        // Requesting + RequestFailed -> Idle, failure becomes a transcript turn
        (
            ConvState::Requesting { request_id: current },
            Event::RequestFailed {
                request_id,
                error,
                at,
            },
        ) if *current == request_id => {
            let message = Message::error(context.messages.failure_text(&error), at);
            Ok(TransitionResult::new(ConvState::Idle).with_effect(Effect::record_reply(message)))
        }

        // Replies for a request that was cleared away
        (_, Event::AnswerReceived { request_id, .. } | Event::RequestFailed { request_id, .. }) => {
            Err(TransitionError::StaleResponse { request_id })
        }

        // ============================================================
        // Clear
        // ============================================================
        (_, Event::Clear) => {
            Ok(TransitionResult::new(ConvState::Idle).with_effect(Effect::ClearTranscript))
        }
    }
}
