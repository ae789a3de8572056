//! Transcript message types
//!
//! A `Message` is one turn in the conversation. Messages are plain values:
//! once built they are never mutated, only appended to the transcript or
//! converted to and from a JSON record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Author {
    User,
    Assistant,
}

/// Whether a turn is a real answer or a failure explanation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    #[default]
    Normal,
    Error,
}

/// A citation backing an assistant answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// File path or document id the passage came from
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub category: String,
}

impl Source {
    /// Build a source, deriving the display title from `origin`.
    pub fn new(
        origin: impl Into<String>,
        content: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        let origin = origin.into();
        Self {
            title: derive_title(&origin),
            content: content.into(),
            origin,
            category: category.into(),
        }
    }
}

/// Derive a human-readable title from a document path or id.
///
/// `acts/Penal_Code.txt` becomes `Penal Code`. Both `/` and `\` count as
/// path separators; only the final extension is stripped. Any `.`, `_` or
/// `-` left in the stem separates words, so applying this to its own
/// output returns the same string.
pub fn derive_title(origin: &str) -> String {
    let name = origin
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();

    let stem = match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    };

    stem.split(|c: char| c.is_whitespace() || matches!(c, '.' | '_' | '-'))
        .filter(|word| !word.is_empty())
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Upper-case the first character and lower-case the rest. A first
/// character whose upper case expands (`ß` to `SS`) is kept as is, so
/// title-casing a title changes nothing.
fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let mut upper = first.to_uppercase();
    let head = match (upper.next(), upper.next()) {
        (Some(single), None) => single,
        _ => first,
    };
    std::iter::once(head)
        .chain(chars.flat_map(char::to_lowercase))
        .collect()
}

/// Errors raised when reading a stored message record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("malformed message record: `{field}` {reason}")]
    MalformedRecord { field: &'static str, reason: String },
}

impl RecordError {
    fn malformed(field: &'static str, reason: impl Into<String>) -> Self {
        RecordError::MalformedRecord {
            field,
            reason: reason.into(),
        }
    }
}

/// One turn of the conversation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub id: String,
    pub text: String,
    pub author: Author,
    pub timestamp: DateTime<Utc>,
    pub sources: Vec<Source>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    pub status: MessageStatus,
}

impl Message {
    fn new(text: impl Into<String>, author: Author, at: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            author,
            timestamp: at,
            sources: Vec::new(),
            metadata: None,
            status: MessageStatus::Normal,
        }
    }

    pub fn user(text: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self::new(text, Author::User, at)
    }

    pub fn assistant(
        text: impl Into<String>,
        sources: Vec<Source>,
        metadata: Option<Map<String, Value>>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            sources,
            metadata,
            ..Self::new(text, Author::Assistant, at)
        }
    }

    /// An assistant turn explaining a failed request
    pub fn error(text: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            status: MessageStatus::Error,
            ..Self::new(text, Author::Assistant, at)
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == MessageStatus::Error
    }

    /// Serialize to a JSON record
    pub fn to_record(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Rebuild a message from a JSON record.
    ///
    /// `text`, `author` and `timestamp` are required. Missing `sources`,
    /// `status` and `metadata` fall back to empty, `Normal` and `None`; a
    /// missing `id` is replaced with a fresh one.
    pub fn from_record(record: &Value) -> Result<Self, RecordError> {
        let obj = record
            .as_object()
            .ok_or_else(|| RecordError::malformed("record", "is not a JSON object"))?;

        let text = required_str(obj, "text")?.to_string();

        let author: Author = serde_json::from_value(required(obj, "author")?.clone())
            .map_err(|e| RecordError::malformed("author", e.to_string()))?;

        let timestamp = DateTime::parse_from_rfc3339(required_str(obj, "timestamp")?)
            .map_err(|e| RecordError::malformed("timestamp", e.to_string()))?
            .with_timezone(&Utc);

        let id = match obj.get("id") {
            Some(Value::String(id)) => id.clone(),
            None | Some(Value::Null) => uuid::Uuid::new_v4().to_string(),
            Some(_) => return Err(RecordError::malformed("id", "is not a string")),
        };

        let sources = match obj.get("sources") {
            None | Some(Value::Null) => Vec::new(),
            Some(v) => serde_json::from_value(v.clone())
                .map_err(|e| RecordError::malformed("sources", e.to_string()))?,
        };

        let metadata = match obj.get("metadata") {
            None | Some(Value::Null) => None,
            Some(Value::Object(map)) => Some(map.clone()),
            Some(_) => return Err(RecordError::malformed("metadata", "is not an object")),
        };

        let status = match obj.get("status") {
            None | Some(Value::Null) => MessageStatus::Normal,
            Some(v) => serde_json::from_value(v.clone())
                .map_err(|e| RecordError::malformed("status", e.to_string()))?,
        };

        Ok(Self {
            id,
            text,
            author,
            timestamp,
            sources,
            metadata,
            status,
        })
    }
}

fn required<'a>(
    obj: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a Value, RecordError> {
    match obj.get(field) {
        None | Some(Value::Null) => Err(RecordError::malformed(field, "is missing")),
        Some(v) => Ok(v),
    }
}

fn required_str<'a>(
    obj: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a str, RecordError> {
    required(obj, field)?
        .as_str()
        .ok_or_else(|| RecordError::malformed(field, "is not a string"))
}
