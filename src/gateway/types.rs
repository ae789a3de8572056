//! Wire types for the RAG service

use crate::transcript::{Message, Source};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Language value asking the service to detect the question's language
pub const AUTO_LANGUAGE: &str = "auto";

/// How the service picks supporting passages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalStrategy {
    Semantic,
    Keyword,
    #[default]
    Hybrid,
    /// Maximal marginal relevance
    Mmr,
}

impl RetrievalStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Semantic => "semantic",
            Self::Keyword => "keyword",
            Self::Hybrid => "hybrid",
            Self::Mmr => "mmr",
        }
    }
}

impl fmt::Display for RetrievalStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RetrievalStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "semantic" => Ok(Self::Semantic),
            "keyword" => Ok(Self::Keyword),
            "hybrid" => Ok(Self::Hybrid),
            "mmr" => Ok(Self::Mmr),
            other => Err(format!("unknown retrieval strategy: {other}")),
        }
    }
}

/// Which query endpoint a question is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryScope {
    #[default]
    General,
    Constitutional,
    FundamentalRights,
    GovernmentStructure,
}

impl QueryScope {
    pub fn path(self) -> &'static str {
        match self {
            Self::General => "/query",
            Self::Constitutional => "/constitutional/query",
            Self::FundamentalRights => "/rights/query",
            Self::GovernmentStructure => "/government/query",
        }
    }
}

/// Body of `POST /query`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    pub retrieval_strategy: RetrievalStrategy,
    pub use_conversation: bool,
    pub language: String,
}

/// A retrieved passage as the service reports it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceDocument {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl SourceDocument {
    pub fn into_source(self) -> Source {
        Source::new(
            self.source.unwrap_or_default(),
            self.content.unwrap_or_default(),
            self.category.unwrap_or_default(),
        )
    }
}

/// Body of a successful query response.
///
/// Every field is optional on the wire; defaults are applied when the
/// answer is turned into a transcript message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub source_documents: Option<Vec<SourceDocument>>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

impl QueryResponse {
    /// Convenience constructor for a plain answer without citations
    pub fn with_answer(text: impl Into<String>) -> Self {
        Self {
            answer: Some(text.into()),
            source_documents: Some(Vec::new()),
            metadata: None,
        }
    }

    /// Build the assistant turn for this response.
    ///
    /// A missing answer is replaced with `no_answer`. Metadata is kept only
    /// when it is a JSON object.
    pub fn into_message(self, no_answer: &str, at: DateTime<Utc>) -> Message {
        let text = self.answer.unwrap_or_else(|| no_answer.to_string());
        let sources = self
            .source_documents
            .unwrap_or_default()
            .into_iter()
            .map(SourceDocument::into_source)
            .collect();
        let metadata = match self.metadata {
            Some(Value::Object(map)) => Some(map),
            _ => None,
        };
        Message::assistant(text, sources, metadata, at)
    }
}

/// Body of `GET /stats`
pub type StatsReport = Map<String, Value>;

/// Body of `POST /process-documents`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessDocumentsRequest {
    pub force_reprocess: bool,
}

/// Body of `GET /conversation/history`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteHistory {
    #[serde(default)]
    pub conversation_history: Vec<Value>,
    #[serde(default)]
    pub total_conversations: usize,
}

/// Body of `GET /config`, the service's public settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub supported_languages: Vec<String>,
    #[serde(default)]
    pub default_language: Option<String>,
    /// Everything else the service reports, kept verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ServiceConfig {
    /// Whether the service answers in `language`.
    ///
    /// `auto` leaves detection to the service and is always accepted, as is
    /// any language when the service lists none.
    pub fn supports_language(&self, language: &str) -> bool {
        language.eq_ignore_ascii_case(AUTO_LANGUAGE)
            || self.supported_languages.is_empty()
            || self
                .supported_languages
                .iter()
                .any(|supported| supported.eq_ignore_ascii_case(language))
    }
}
