//! Remote answer gateway
//!
//! The network boundary to the RAG service: one query call plus the
//! advisory health, stats, history, config and ingestion endpoints.

mod error;
mod http;
mod types;

pub use error::{GatewayError, GatewayErrorKind};
pub use http::HttpGateway;
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for RAG service clients
#[async_trait]
pub trait AnswerGateway: Send + Sync {
    /// Ask a question on the endpoint selected by `scope`
    async fn query(
        &self,
        scope: QueryScope,
        request: &QueryRequest,
    ) -> Result<QueryResponse, GatewayError>;

    /// Succeeds when the service reports itself reachable
    async fn health(&self) -> Result<(), GatewayError>;

    /// Service statistics as reported by the service
    async fn stats(&self) -> Result<StatsReport, GatewayError>;

    /// Drop the service-side conversation memory
    async fn clear_history(&self) -> Result<(), GatewayError>;

    /// The service-side conversation memory
    async fn history(&self) -> Result<RemoteHistory, GatewayError>;

    /// Public service settings such as the supported languages
    async fn service_config(&self) -> Result<ServiceConfig, GatewayError>;

    /// Start (re)indexing the document corpus in the background
    async fn process_documents(&self, force_reprocess: bool) -> Result<(), GatewayError>;

    /// Origin the gateway talks to
    fn base_url(&self) -> &str;
}

#[async_trait]
impl<T: AnswerGateway + ?Sized> AnswerGateway for Arc<T> {
    async fn query(
        &self,
        scope: QueryScope,
        request: &QueryRequest,
    ) -> Result<QueryResponse, GatewayError> {
        (**self).query(scope, request).await
    }

    async fn health(&self) -> Result<(), GatewayError> {
        (**self).health().await
    }

    async fn stats(&self) -> Result<StatsReport, GatewayError> {
        (**self).stats().await
    }

    async fn clear_history(&self) -> Result<(), GatewayError> {
        (**self).clear_history().await
    }

    async fn history(&self) -> Result<RemoteHistory, GatewayError> {
        (**self).history().await
    }

    async fn service_config(&self) -> Result<ServiceConfig, GatewayError> {
        (**self).service_config().await
    }

    async fn process_documents(&self, force_reprocess: bool) -> Result<(), GatewayError> {
        (**self).process_documents(force_reprocess).await
    }

    fn base_url(&self) -> &str {
        (**self).base_url()
    }
}

/// Logging wrapper for gateways
pub struct LoggingGateway {
    inner: Arc<dyn AnswerGateway>,
}

impl LoggingGateway {
    pub fn new(inner: Arc<dyn AnswerGateway>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl AnswerGateway for LoggingGateway {
    async fn query(
        &self,
        scope: QueryScope,
        request: &QueryRequest,
    ) -> Result<QueryResponse, GatewayError> {
        let start = std::time::Instant::now();
        let result = self.inner.query(scope, request).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::info!(
                    endpoint = scope.path(),
                    strategy = %request.retrieval_strategy,
                    duration_ms = %duration.as_millis(),
                    sources = response.source_documents.as_ref().map_or(0, Vec::len),
                    "Query completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    endpoint = scope.path(),
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    kind = e.kind.label(),
                    "Query failed"
                );
            }
        }

        result
    }

    async fn health(&self) -> Result<(), GatewayError> {
        let result = self.inner.health().await;
        if let Err(e) = &result {
            tracing::debug!(url = %self.inner.base_url(), error = %e, "Health check failed");
        }
        result
    }

    async fn stats(&self) -> Result<StatsReport, GatewayError> {
        let result = self.inner.stats().await;
        if let Err(e) = &result {
            tracing::warn!(url = %self.inner.base_url(), error = %e, "Stats request failed");
        }
        result
    }

    async fn clear_history(&self) -> Result<(), GatewayError> {
        let result = self.inner.clear_history().await;
        match &result {
            Ok(()) => tracing::info!("Remote conversation history cleared"),
            Err(e) => tracing::warn!(error = %e, "Failed to clear remote conversation history"),
        }
        result
    }

    async fn history(&self) -> Result<RemoteHistory, GatewayError> {
        let result = self.inner.history().await;
        match &result {
            Ok(history) => tracing::debug!(
                turns = history.total_conversations,
                "Fetched remote conversation history"
            ),
            Err(e) => tracing::warn!(error = %e, "Failed to fetch remote conversation history"),
        }
        result
    }

    async fn service_config(&self) -> Result<ServiceConfig, GatewayError> {
        let result = self.inner.service_config().await;
        if let Err(e) = &result {
            tracing::warn!(url = %self.inner.base_url(), error = %e, "Config request failed");
        }
        result
    }

    async fn process_documents(&self, force_reprocess: bool) -> Result<(), GatewayError> {
        let result = self.inner.process_documents(force_reprocess).await;
        match &result {
            Ok(()) => tracing::info!(force_reprocess, "Document processing started"),
            Err(e) => tracing::error!(
                force_reprocess,
                error = %e,
                kind = e.kind.label(),
                "Failed to start document processing"
            ),
        }
        result
    }

    fn base_url(&self) -> &str {
        self.inner.base_url()
    }
}
