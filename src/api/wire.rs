use serde::{Deserialize, Serialize};
use time::format_description::FormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::types::{ChatMessage, Role};

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ConversationRow {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CreatedConversation {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct MessageRow {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub conversation_id: i64,
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl From<MessageRow> for ChatMessage {
    fn from(row: MessageRow) -> Self {
        ChatMessage {
            role: row.role,
            content: row.content,
            created_at: row.created_at.as_deref().and_then(parse_timestamp),
        }
    }
}

#[derive(Serialize)]
pub(crate) struct CreateConversationRequest<'a> {
    pub ia_msg_in: &'a str,
}

#[derive(Serialize)]
pub(crate) struct SendMessageRequest<'a> {
    pub conversation_id: i64,
    pub content: &'a str,
    pub role: Role,
}

#[derive(Deserialize)]
pub(crate) struct ContentOnly {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

/// Pulls `detail` out of an error body. Validation errors carry a structured
/// detail; those are passed through as compact JSON.
pub(crate) fn error_detail(body: &str) -> Option<String> {
    let parsed = serde_json::from_str::<ErrorBody>(body).ok()?;
    match parsed.detail? {
        serde_json::Value::String(text) if !text.trim().is_empty() => Some(text),
        serde_json::Value::String(_) | serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

const NAIVE_TIMESTAMP: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]");

/// Accepts RFC 3339 and the offset-less ISO form the backend emits, which is
/// taken as UTC.
pub(crate) fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if let Ok(parsed) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(parsed);
    }
    PrimitiveDateTime::parse(raw, NAIVE_TIMESTAMP)
        .ok()
        .map(PrimitiveDateTime::assume_utc)
}
