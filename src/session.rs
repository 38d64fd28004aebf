use crate::store::ConversationStore;
use crate::types::{ChatMessage, ConversationId, ConversationSummary};

/// Everything the chat screen shows, owned by the caller and lent to each
/// controller operation.
#[derive(Debug, Default)]
pub struct SessionState {
    pub store: ConversationStore,
    pub current: Option<ConversationId>,
    /// Text in the compose field.
    pub compose: String,
    /// Content of the last opening message, used to seed a draft on create.
    pub opening_message: Option<String>,
    /// Set while a draft exists and has not been created on the backend.
    pub draft_busy: bool,
    /// A reply or opening message is on its way.
    pub typing: bool,
    pub auto_speak: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_auto_speak(auto_speak: bool) -> Self {
        Self {
            auto_speak,
            ..Self::default()
        }
    }

    pub fn current_summary(&self) -> Option<&ConversationSummary> {
        self.store.summary(self.current?)
    }

    pub fn current_log(&self) -> &[ChatMessage] {
        self.current
            .and_then(|id| self.store.log(id))
            .unwrap_or(&[])
    }

    pub fn can_start_draft(&self) -> bool {
        !self.draft_busy && !self.store.has_draft()
    }
}
