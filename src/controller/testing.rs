//! Mock implementations for testing
//!
//! These mocks enable controller tests without real I/O.

use crate::gateway::{
    AnswerGateway, GatewayError, QueryRequest, QueryResponse, QueryScope, RemoteHistory,
    ServiceConfig, StatsReport,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

// ============================================================================
// Mock Gateway
// ============================================================================

/// Mock gateway that returns queued query results
pub struct MockGateway {
    responses: Mutex<VecDeque<Result<QueryResponse, GatewayError>>>,
    /// Record of all queries made
    pub requests: Mutex<Vec<(QueryScope, QueryRequest)>>,
    health: Mutex<Result<(), GatewayError>>,
    stats: Mutex<Result<StatsReport, GatewayError>>,
    clear_history: Mutex<Result<(), GatewayError>>,
    history_clears: AtomicUsize,
    history: Mutex<Result<RemoteHistory, GatewayError>>,
    service_config: Mutex<Result<ServiceConfig, GatewayError>>,
    process_documents: Mutex<Result<(), GatewayError>>,
    /// `force_reprocess` flag of every processing request
    processing: Mutex<Vec<bool>>,
}

#[allow(dead_code)]
impl MockGateway {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            health: Mutex::new(Ok(())),
            stats: Mutex::new(Ok(StatsReport::new())),
            clear_history: Mutex::new(Ok(())),
            history_clears: AtomicUsize::new(0),
            history: Mutex::new(Ok(RemoteHistory::default())),
            service_config: Mutex::new(Ok(ServiceConfig::default())),
            process_documents: Mutex::new(Ok(())),
            processing: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response
    pub fn queue_response(&self, response: QueryResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: GatewayError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn set_health(&self, outcome: Result<(), GatewayError>) {
        *self.health.lock().unwrap() = outcome;
    }

    pub fn set_stats(&self, outcome: Result<StatsReport, GatewayError>) {
        *self.stats.lock().unwrap() = outcome;
    }

    pub fn set_clear_history(&self, outcome: Result<(), GatewayError>) {
        *self.clear_history.lock().unwrap() = outcome;
    }

    pub fn set_history(&self, outcome: Result<RemoteHistory, GatewayError>) {
        *self.history.lock().unwrap() = outcome;
    }

    pub fn set_service_config(&self, outcome: Result<ServiceConfig, GatewayError>) {
        *self.service_config.lock().unwrap() = outcome;
    }

    pub fn set_process_documents(&self, outcome: Result<(), GatewayError>) {
        *self.process_documents.lock().unwrap() = outcome;
    }

    /// `force_reprocess` flags of the processing requests made so far
    pub fn processing_requests(&self) -> Vec<bool> {
        self.processing.lock().unwrap().clone()
    }

    /// Get recorded queries
    pub fn recorded_requests(&self) -> Vec<(QueryScope, QueryRequest)> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of successful remote history clears
    pub fn history_clears(&self) -> usize {
        self.history_clears.load(Ordering::SeqCst)
    }

    fn next_response(&self) -> Result<QueryResponse, GatewayError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::transport("No mock response queued")))
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnswerGateway for MockGateway {
    async fn query(
        &self,
        scope: QueryScope,
        request: &QueryRequest,
    ) -> Result<QueryResponse, GatewayError> {
        self.requests.lock().unwrap().push((scope, request.clone()));
        self.next_response()
    }

    async fn health(&self) -> Result<(), GatewayError> {
        self.health.lock().unwrap().clone()
    }

    async fn stats(&self) -> Result<StatsReport, GatewayError> {
        self.stats.lock().unwrap().clone()
    }

    async fn clear_history(&self) -> Result<(), GatewayError> {
        let outcome = self.clear_history.lock().unwrap().clone();
        if outcome.is_ok() {
            self.history_clears.fetch_add(1, Ordering::SeqCst);
        }
        outcome
    }

    async fn history(&self) -> Result<RemoteHistory, GatewayError> {
        self.history.lock().unwrap().clone()
    }

    async fn service_config(&self) -> Result<ServiceConfig, GatewayError> {
        self.service_config.lock().unwrap().clone()
    }

    async fn process_documents(&self, force_reprocess: bool) -> Result<(), GatewayError> {
        self.processing.lock().unwrap().push(force_reprocess);
        self.process_documents.lock().unwrap().clone()
    }

    fn base_url(&self) -> &str {
        "mock://gateway"
    }
}

// ============================================================================
// Delayed Mock Gateway (for timeout and overlap testing)
// ============================================================================

/// Mock gateway that sleeps before answering every call
pub struct DelayedMockGateway {
    inner: MockGateway,
    delay: Duration,
}

impl DelayedMockGateway {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MockGateway::new(),
            delay,
        }
    }

    pub fn queue_response(&self, response: QueryResponse) {
        self.inner.queue_response(response);
    }

    pub fn recorded_requests(&self) -> Vec<(QueryScope, QueryRequest)> {
        self.inner.recorded_requests()
    }
}

#[async_trait]
impl AnswerGateway for DelayedMockGateway {
    async fn query(
        &self,
        scope: QueryScope,
        request: &QueryRequest,
    ) -> Result<QueryResponse, GatewayError> {
        self.inner
            .requests
            .lock()
            .unwrap()
            .push((scope, request.clone()));
        tokio::time::sleep(self.delay).await;
        self.inner.next_response()
    }

    async fn health(&self) -> Result<(), GatewayError> {
        tokio::time::sleep(self.delay).await;
        self.inner.health().await
    }

    async fn stats(&self) -> Result<StatsReport, GatewayError> {
        tokio::time::sleep(self.delay).await;
        self.inner.stats().await
    }

    async fn clear_history(&self) -> Result<(), GatewayError> {
        tokio::time::sleep(self.delay).await;
        self.inner.clear_history().await
    }

    async fn history(&self) -> Result<RemoteHistory, GatewayError> {
        tokio::time::sleep(self.delay).await;
        self.inner.history().await
    }

    async fn service_config(&self) -> Result<ServiceConfig, GatewayError> {
        tokio::time::sleep(self.delay).await;
        self.inner.service_config().await
    }

    async fn process_documents(&self, force_reprocess: bool) -> Result<(), GatewayError> {
        tokio::time::sleep(self.delay).await;
        self.inner.process_documents(force_reprocess).await
    }

    fn base_url(&self) -> &str {
        self.inner.base_url()
    }
}

// ============================================================================
// Stub HTTP server
// ============================================================================

/// Serve `router` on an ephemeral localhost port and return its base URL
pub async fn serve(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> QueryRequest {
        QueryRequest {
            question: "q".to_string(),
            retrieval_strategy: crate::gateway::RetrievalStrategy::Hybrid,
            use_conversation: true,
            language: "auto".to_string(),
        }
    }

    #[tokio::test]
    async fn test_mock_returns_queued_in_order() {
        let mock = MockGateway::new();
        mock.queue_response(QueryResponse::with_answer("one"));
        mock.queue_error(GatewayError::remote(500, "two"));

        let first = mock.query(QueryScope::General, &request()).await.unwrap();
        assert_eq!(first.answer.as_deref(), Some("one"));
        let second = mock.query(QueryScope::Constitutional, &request()).await;
        assert_eq!(second.unwrap_err().message, "two");

        // Exhausted queue reports a transport failure
        let third = mock.query(QueryScope::General, &request()).await;
        assert!(third.unwrap_err().kind.is_transport());

        let scopes: Vec<_> = mock.recorded_requests().into_iter().map(|(s, _)| s).collect();
        assert_eq!(
            scopes,
            vec![QueryScope::General, QueryScope::Constitutional, QueryScope::General]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_delayed_mock_waits() {
        let mock = DelayedMockGateway::new(Duration::from_secs(5));
        mock.queue_response(QueryResponse::with_answer("late"));

        let start = tokio::time::Instant::now();
        let response = mock.query(QueryScope::General, &request()).await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(5));
        assert_eq!(response.answer.as_deref(), Some("late"));
        assert_eq!(mock.recorded_requests().len(), 1);
    }
}
