//! Observable transcript store
//!
//! Holds the ordered list of turns and the single in-flight flag. Every
//! mutation notifies subscribers synchronously once the store's own lock
//! has been released, so a listener may take a snapshot from inside its
//! callback.

use super::message::Message;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

/// What changed in the transcript
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptChange {
    /// A turn was appended; `pending` is the flag value after the mutation
    Appended { message: Message, pending: bool },
    PendingChanged(bool),
    Cleared,
}

/// Read-only view of the transcript
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranscriptSnapshot {
    pub messages: Vec<Message>,
    pub pending: bool,
}

impl TranscriptSnapshot {
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}

type Listener = dyn Fn(&TranscriptChange) + Send + Sync;

#[derive(Default)]
struct ListenerRegistry {
    next_id: AtomicU64,
    entries: Mutex<Vec<(u64, Arc<Listener>)>>,
}

impl ListenerRegistry {
    fn insert(&self, listener: Arc<Listener>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));
        id
    }

    fn remove(&self, id: u64) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(entry_id, _)| *entry_id != id);
    }

    fn notify(&self, change: &TranscriptChange) {
        // Copy out so listeners run unlocked and may (un)subscribe.
        let listeners: Vec<Arc<Listener>> = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(change);
        }
    }

    fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Handle returned by [`TranscriptStore::subscribe`].
///
/// The listener stays attached until the handle is dropped or
/// [`Subscription::unsubscribe`] is called.
#[must_use = "dropping a Subscription detaches the listener"]
pub struct Subscription {
    registry: Weak<ListenerRegistry>,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

/// Append-only conversation transcript plus the pending flag
#[derive(Default)]
pub struct TranscriptStore {
    state: Mutex<TranscriptSnapshot>,
    listeners: Arc<ListenerRegistry>,
}

impl TranscriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener called after every mutation
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&TranscriptChange) + Send + Sync + 'static,
    {
        let id = self.listeners.insert(Arc::new(listener));
        Subscription {
            registry: Arc::downgrade(&self.listeners),
            id,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn append(&self, message: Message) {
        let pending = {
            let mut state = self.lock();
            state.messages.push(message.clone());
            state.pending
        };
        self.listeners
            .notify(&TranscriptChange::Appended { message, pending });
    }

    pub fn set_pending(&self, pending: bool) {
        self.lock().pending = pending;
        self.listeners
            .notify(&TranscriptChange::PendingChanged(pending));
    }

    /// Append a turn and set the pending flag as a single mutation
    pub fn record(&self, message: Message, pending: bool) {
        {
            let mut state = self.lock();
            state.messages.push(message.clone());
            state.pending = pending;
        }
        self.listeners
            .notify(&TranscriptChange::Appended { message, pending });
    }

    /// Drop every turn and reset the pending flag
    pub fn clear(&self) {
        {
            let mut state = self.lock();
            state.messages.clear();
            state.pending = false;
        }
        self.listeners.notify(&TranscriptChange::Cleared);
    }

    pub fn snapshot(&self) -> TranscriptSnapshot {
        self.lock().clone()
    }

    pub fn is_pending(&self) -> bool {
        self.lock().pending
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TranscriptSnapshot> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
