//! HTTP gateway to the RAG service

use super::types::{
    ProcessDocumentsRequest, QueryRequest, QueryResponse, QueryScope, RemoteHistory,
    ServiceConfig, StatsReport,
};
use super::{AnswerGateway, GatewayError};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Talks JSON over HTTP to a single configured origin
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: &str, connect_timeout: Duration) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| GatewayError::transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn a non-2xx response into a classified error
    async fn check_status(response: Response) -> Result<Response, GatewayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(GatewayError::remote(
            status.as_u16(),
            format!("HTTP {}: {}", status, error_detail(&body)),
        ))
    }

    /// GET `path` and decode the JSON body; `what` names it in errors
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        what: &str,
    ) -> Result<T, GatewayError> {
        let response = self.client.get(self.url(path)).send().await?;
        let response = Self::check_status(response).await?;
        let body = response.text().await?;

        serde_json::from_str(&body)
            .map_err(|e| GatewayError::decode(format!("Failed to parse {what}: {e}")))
    }
}

/// Prefer the `detail` field of a JSON error body, else the raw body
fn error_detail(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl AnswerGateway for HttpGateway {
    async fn query(
        &self,
        scope: QueryScope,
        request: &QueryRequest,
    ) -> Result<QueryResponse, GatewayError> {
        let response = self
            .client
            .post(self.url(scope.path()))
            .json(request)
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        let body = response.text().await?;

        serde_json::from_str(&body)
            .map_err(|e| GatewayError::decode(format!("Failed to parse answer: {e}")))
    }

    async fn health(&self) -> Result<(), GatewayError> {
        let response = self.client.get(self.url("/health")).send().await?;
        Self::check_status(response).await.map(|_| ())
    }

    async fn stats(&self) -> Result<StatsReport, GatewayError> {
        self.get_json("/stats", "stats").await
    }

    async fn clear_history(&self) -> Result<(), GatewayError> {
        let response = self
            .client
            .delete(self.url("/conversation/history"))
            .send()
            .await?;
        Self::check_status(response).await.map(|_| ())
    }

    async fn history(&self) -> Result<RemoteHistory, GatewayError> {
        self.get_json("/conversation/history", "history").await
    }

    async fn service_config(&self) -> Result<ServiceConfig, GatewayError> {
        self.get_json("/config", "config").await
    }

    async fn process_documents(&self, force_reprocess: bool) -> Result<(), GatewayError> {
        let response = self
            .client
            .post(self.url("/process-documents"))
            .json(&ProcessDocumentsRequest { force_reprocess })
            .send()
            .await?;
        Self::check_status(response).await.map(|_| ())
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
