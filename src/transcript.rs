//! Conversation transcript
//!
//! Message value types and the observable store that renderers read from.

pub mod message;
pub mod store;

#[cfg(test)]
mod proptests;

pub use message::{derive_title, Author, Message, MessageStatus, RecordError, Source};
pub use store::{Subscription, TranscriptChange, TranscriptSnapshot, TranscriptStore};
