use std::collections::HashMap;

use crate::types::{ChatMessage, ConversationId, ConversationSummary};

/// Conversation summaries in display order plus one message log per
/// conversation.
#[derive(Debug, Default)]
pub struct ConversationStore {
    summaries: Vec<ConversationSummary>,
    logs: HashMap<ConversationId, Vec<ChatMessage>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summaries(&self) -> &[ConversationSummary] {
        &self.summaries
    }

    pub fn summary(&self, id: ConversationId) -> Option<&ConversationSummary> {
        self.summaries.iter().find(|summary| summary.id == id)
    }

    pub fn log(&self, id: ConversationId) -> Option<&[ChatMessage]> {
        self.logs.get(&id).map(Vec::as_slice)
    }

    pub fn has_log(&self, id: ConversationId) -> bool {
        self.logs.contains_key(&id)
    }

    pub fn has_draft(&self) -> bool {
        self.summary(ConversationId::Draft).is_some()
    }

    /// Replaces the summary list and forgets every cached log.
    pub fn replace_summaries(&mut self, summaries: Vec<ConversationSummary>) {
        self.summaries = summaries;
        self.logs.clear();
    }

    /// Puts a draft at the head of the list with an empty log. Returns false
    /// when a draft already exists.
    pub fn insert_draft(&mut self) -> bool {
        if self.has_draft() {
            return false;
        }
        self.summaries.insert(0, ConversationSummary::draft());
        self.logs.insert(ConversationId::Draft, Vec::new());
        true
    }

    /// Full snapshot replacement; never merges.
    pub fn set_log(&mut self, id: ConversationId, messages: Vec<ChatMessage>) {
        self.logs.insert(id, messages);
    }

    pub fn append(&mut self, id: ConversationId, message: ChatMessage) {
        self.logs.entry(id).or_default().push(message);
    }

    /// Rewrites the draft to its server identity in both the summary list
    /// and the log map.
    pub fn promote_draft(&mut self, real_id: i64, title: &str) {
        let persisted = ConversationId::Persisted(real_id);
        for summary in self.summaries.iter_mut() {
            if summary.id == ConversationId::Draft {
                summary.id = persisted;
                summary.title = title.to_string();
            }
        }
        let log = self.logs.remove(&ConversationId::Draft).unwrap_or_default();
        self.logs.insert(persisted, log);
    }

    pub fn patch_title(&mut self, id: ConversationId, title: &str) -> bool {
        match self.summaries.iter_mut().find(|summary| summary.id == id) {
            Some(summary) => {
                summary.title = title.to_string();
                true
            }
            None => false,
        }
    }
}
