//! Request lifecycle controller
//!
//! Drives the conversation state machine. Store effects are applied while
//! the lifecycle lock is held, so the outstanding-request check and the
//! transcript mutation it guards are a single step. The gateway call runs
//! after the lock is released and its outcome is fed back as an event.

#[cfg(test)]
pub(crate) mod testing;

use crate::config::ClientConfig;
use crate::gateway::{
    AnswerGateway, GatewayError, QueryRequest, QueryScope, RemoteHistory, RetrievalStrategy,
    ServiceConfig, StatsReport,
};
use crate::state_machine::{transition, ConvContext, ConvState, Effect, Event, TransitionError};
use crate::transcript::{TranscriptSnapshot, TranscriptStore};
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Per-request parameters taken from the client configuration
#[derive(Debug, Clone)]
struct RequestSettings {
    retrieval_strategy: RetrievalStrategy,
    use_conversation: bool,
    language: String,
    query_timeout: Duration,
    health_timeout: Duration,
}

/// Owns the request lifecycle for one transcript.
///
/// Store listeners are invoked while the lifecycle lock is held and must
/// not call back into the controller synchronously.
pub struct ConversationController<G: AnswerGateway> {
    context: ConvContext,
    settings: RequestSettings,
    state: Mutex<ConvState>,
    store: Arc<TranscriptStore>,
    gateway: G,
    next_request_id: AtomicU64,
}

impl<G: AnswerGateway> ConversationController<G> {
    pub fn new(config: &ClientConfig, store: Arc<TranscriptStore>, gateway: G) -> Self {
        Self {
            context: ConvContext::new(config.messages.clone()),
            settings: RequestSettings {
                retrieval_strategy: config.retrieval_strategy,
                use_conversation: config.use_conversation,
                language: config.language.clone(),
                query_timeout: config.query_timeout,
                health_timeout: config.health_timeout,
            },
            state: Mutex::new(ConvState::Idle),
            store,
            gateway,
            next_request_id: AtomicU64::new(1),
        }
    }

    /// Ask a general question. Completion is observed through the store.
    pub async fn send(&self, utterance: &str) {
        self.send_scoped(utterance, QueryScope::General).await;
    }

    /// Ask a question on a topic-specific endpoint.
    ///
    /// Blank utterances and sends while a request is outstanding are
    /// ignored. Gateway failures end up in the transcript as error turns.
    pub async fn send_scoped(&self, utterance: &str, scope: QueryScope) {
        let request_id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        let mut events = vec![Event::UserMessage {
            text: utterance.to_string(),
            scope,
            request_id,
            at: Utc::now(),
        }];

        while let Some(event) = events.pop() {
            for effect in self.dispatch(event) {
                if let Some(next) = self.execute(effect).await {
                    events.push(next);
                }
            }
        }
    }

    /// Empty the transcript. A reply still in flight is discarded on arrival.
    pub fn clear(&self) {
        let deferred = self.dispatch(Event::Clear);
        debug_assert!(deferred.is_empty());
    }

    /// Ask the service whether it is up; false on any failure or after the health timeout
    pub async fn check_health(&self) -> bool {
        match tokio::time::timeout(self.settings.health_timeout, self.gateway.health()).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                tracing::debug!(error = %e, kind = e.kind.label(), "Service unhealthy");
                false
            }
            Err(_) => {
                tracing::debug!(
                    timeout_secs = self.settings.health_timeout.as_secs(),
                    "Health check timed out"
                );
                false
            }
        }
    }

    /// Service statistics, or `None` when they cannot be fetched
    pub async fn fetch_stats(&self) -> Option<StatsReport> {
        self.advisory("stats", self.gateway.stats()).await
    }

    /// Ask the service to drop its conversation memory. The local
    /// transcript is left alone.
    pub async fn forget_remote_history(&self) -> bool {
        self.advisory("clear history", self.gateway.clear_history())
            .await
            .is_some()
    }

    /// The service's own record of the conversation
    pub async fn remote_history(&self) -> Option<RemoteHistory> {
        self.advisory("history", self.gateway.history()).await
    }

    /// Public service settings such as the supported languages
    pub async fn service_config(&self) -> Option<ServiceConfig> {
        self.advisory("config", self.gateway.service_config()).await
    }

    /// Ask the service to index its document corpus. Returns once the
    /// service has accepted the job; indexing continues in the background.
    pub async fn process_documents(&self, force_reprocess: bool) -> bool {
        self.advisory("process documents", self.gateway.process_documents(force_reprocess))
            .await
            .is_some()
    }

    /// Whether the service accepts the configured answer language.
    /// `None` when the service settings cannot be fetched.
    pub async fn language_supported(&self) -> Option<bool> {
        let config = self.service_config().await?;
        Some(config.supports_language(&self.settings.language))
    }

    pub fn is_pending(&self) -> bool {
        self.store.is_pending()
    }

    pub fn snapshot(&self) -> TranscriptSnapshot {
        self.store.snapshot()
    }

    pub fn store(&self) -> &Arc<TranscriptStore> {
        &self.store
    }

    /// Run one event through the state machine and apply its store effects.
    /// Returns the effects that still need to be executed asynchronously.
    fn dispatch(&self, event: Event) -> Vec<Effect> {
        let mut state = self.lock_state();
        let current = *state;

        let result = match transition(&current, &self.context, event) {
            Ok(result) => result,
            Err(TransitionError::StaleResponse { request_id }) => {
                tracing::info!(request_id, "Discarding reply to cleared request");
                return Vec::new();
            }
            Err(e) => {
                tracing::debug!(error = %e, state = ?current, "Event ignored");
                return Vec::new();
            }
        };

        if current != result.new_state {
            tracing::debug!(from = ?current, to = ?result.new_state, "State transition");
        }
        *state = result.new_state;

        result
            .effects
            .into_iter()
            .filter_map(|effect| self.apply(effect))
            .collect()
    }

    /// Apply a store effect in place; effects that suspend are handed back
    fn apply(&self, effect: Effect) -> Option<Effect> {
        match effect {
            Effect::RecordTurn { message, pending } => {
                self.store.record(message, pending);
                None
            }
            Effect::ClearTranscript => {
                self.store.clear();
                None
            }
            Effect::QueryGateway { .. } => Some(effect),
        }
    }

    async fn execute(&self, effect: Effect) -> Option<Event> {
        let Effect::QueryGateway {
            request_id,
            scope,
            question,
        } = effect
        else {
            return None;
        };

        let request = QueryRequest {
            question,
            retrieval_strategy: self.settings.retrieval_strategy,
            use_conversation: self.settings.use_conversation,
            language: self.settings.language.clone(),
        };

        tracing::info!(request_id, endpoint = scope.path(), "Sending query");

        let timeout = self.settings.query_timeout;
        let outcome = match tokio::time::timeout(timeout, self.gateway.query(scope, &request)).await
        {
            Ok(outcome) => outcome,
            Err(_) => Err(GatewayError::timeout(format!(
                "No answer within {}s",
                timeout.as_secs()
            ))),
        };

        let at = Utc::now();
        Some(match outcome {
            Ok(response) => Event::AnswerReceived {
                request_id,
                response,
                at,
            },
            Err(error) => {
                tracing::warn!(
                    request_id,
                    error = %error,
                    kind = error.kind.label(),
                    "Query failed"
                );
                Event::RequestFailed {
                    request_id,
                    error,
                    at,
                }
            }
        })
    }

    /// Run an auxiliary gateway call bounded by the query timeout.
    /// Failures are logged and become `None`.
    async fn advisory<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, GatewayError>>,
    ) -> Option<T> {
        match tokio::time::timeout(self.settings.query_timeout, call).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                tracing::warn!(operation, error = %e, kind = e.kind.label(), "Request failed");
                None
            }
            Err(_) => {
                tracing::warn!(
                    operation,
                    timeout_secs = self.settings.query_timeout.as_secs(),
                    "Request timed out"
                );
                None
            }
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, ConvState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
