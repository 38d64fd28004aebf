use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;

use crate::locale;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    /// The backend only distinguishes "user" from everything else.
    #[serde(other)]
    Assistant,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub created_at: Option<OffsetDateTime>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            created_at: Some(OffsetDateTime::now_utc()),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            created_at: None,
        }
    }

    /// Locally synthesised entry shown in place of a reply that never came.
    pub fn notice(content: impl Into<String>) -> Self {
        Self::assistant(content)
    }

    pub fn is_user(&self) -> bool {
        matches!(self.role, Role::User)
    }
}

/// Identity of a conversation: either a local draft awaiting its server id,
/// or one the backend already knows about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConversationId {
    Draft,
    Persisted(i64),
}

impl ConversationId {
    pub fn is_draft(&self) -> bool {
        matches!(self, ConversationId::Draft)
    }

    pub fn persisted(&self) -> Option<i64> {
        match self {
            ConversationId::Draft => None,
            ConversationId::Persisted(id) => Some(*id),
        }
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversationId::Draft => write!(f, "draft"),
            ConversationId::Persisted(id) => write!(f, "{}", id),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConversationSummary {
    pub id: ConversationId,
    pub title: String,
}

impl ConversationSummary {
    pub fn draft() -> Self {
        Self {
            id: ConversationId::Draft,
            title: locale::DEFAULT_TITLE.to_string(),
        }
    }
}

/// Key identifying one message bubble, used as the playback token.
pub fn message_key(conversation: ConversationId, index: usize) -> String {
    format!("{}-{}", conversation, index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_decodes_wire_names() {
        let user: Role = serde_json::from_str(r#""user""#).unwrap();
        let assistant: Role = serde_json::from_str(r#""assistant""#).unwrap();
        let other: Role = serde_json::from_str(r#""system""#).unwrap();
        assert_eq!(user, Role::User);
        assert_eq!(assistant, Role::Assistant);
        assert_eq!(other, Role::Assistant);
    }

    #[test]
    fn test_message_key_format() {
        assert_eq!(message_key(ConversationId::Persisted(7), 2), "7-2");
        assert_eq!(message_key(ConversationId::Draft, 0), "draft-0");
    }

    #[test]
    fn test_draft_has_no_persisted_id() {
        assert!(ConversationId::Draft.is_draft());
        assert_eq!(ConversationId::Draft.persisted(), None);
        assert_eq!(ConversationId::Persisted(3).persisted(), Some(3));
    }
}
