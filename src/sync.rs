//! Conversation list, draft identity and message send/fetch against the
//! backend.
//!
//! The local view is optimistic: a user message shows up before the backend
//! has acknowledged it, and a freshly opened chat lives as a draft until the
//! first send creates it remotely. Every fetch replaces the whole log for its
//! conversation, so the server snapshot always wins eventually.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::api::{ApiError, ChatBackend, ConversationRow};
use crate::locale;
use crate::notify::NotificationController;
use crate::session::SessionState;
use crate::speech::{SpeechPlaybackArbiter, last_assistant};
use crate::types::{ChatMessage, ConversationId, ConversationSummary, message_key};

pub struct ConversationSyncController {
    api: Arc<dyn ChatBackend>,
    notifier: NotificationController,
    playback: Option<SpeechPlaybackArbiter>,
}

impl ConversationSyncController {
    pub fn new(api: Arc<dyn ChatBackend>, notifier: NotificationController) -> Self {
        Self {
            api,
            notifier,
            playback: None,
        }
    }

    /// Enables reading replies aloud when the session asks for it.
    pub fn with_playback(mut self, playback: SpeechPlaybackArbiter) -> Self {
        self.playback = Some(playback);
        self
    }

    pub fn notifier(&self) -> &NotificationController {
        &self.notifier
    }

    /// Fetches the conversation list. Always leaves at least one usable
    /// conversation selected, falling back to a fresh draft.
    pub async fn load_conversations(&self, session: &mut SessionState) {
        match self.api.list_conversations().await {
            Ok(rows) if !rows.is_empty() => {
                let summaries: Vec<ConversationSummary> =
                    rows.into_iter().map(summary_from).collect();
                let first = summaries[0].id;
                debug!(count = summaries.len(), "conversations loaded");
                session.store.replace_summaries(summaries);
                session.draft_busy = false;
                session.current = Some(first);
                if let Some(id) = first.persisted() {
                    self.fetch_messages(session, id).await;
                }
            }
            Ok(_) => {
                debug!("no conversations yet, seeding a draft");
                self.seed_draft(session).await;
            }
            Err(err) => {
                warn!(%err, "could not list conversations, using a draft");
                self.seed_draft(session).await;
            }
        }
    }

    pub async fn select_conversation(&self, session: &mut SessionState, id: ConversationId) {
        session.current = Some(id);
        if let Some(persisted) = id.persisted()
            && !session.store.has_log(id)
        {
            self.fetch_messages(session, persisted).await;
        }
    }

    /// Replaces the log of `id` with the backend's full history and returns it.
    /// On failure the log shows a single error entry and nothing is returned.
    pub async fn fetch_messages(&self, session: &mut SessionState, id: i64) -> Vec<ChatMessage> {
        let key = ConversationId::Persisted(id);
        match self.api.fetch_messages(id).await {
            Ok(messages) => {
                debug!(conversation = id, count = messages.len(), "messages fetched");
                session.store.set_log(key, messages.clone());
                messages
            }
            Err(err) => {
                warn!(conversation = id, %err, "could not fetch messages");
                session
                    .store
                    .set_log(key, vec![ChatMessage::notice(locale::LOG_FETCH_FAILED)]);
                Vec::new()
            }
        }
    }

    /// Log for any conversation; drafts never reach the backend.
    pub async fn fetch_log(
        &self,
        session: &mut SessionState,
        id: ConversationId,
    ) -> Vec<ChatMessage> {
        match id {
            ConversationId::Persisted(persisted) => self.fetch_messages(session, persisted).await,
            ConversationId::Draft => session
                .store
                .log(id)
                .map(<[_]>::to_vec)
                .unwrap_or_default(),
        }
    }

    /// Opens a new draft at the head of the list. Returns false when a draft
    /// is already pending.
    pub async fn start_draft_conversation(&self, session: &mut SessionState) -> bool {
        if !session.can_start_draft() {
            debug!("draft already pending");
            return false;
        }
        session.draft_busy = true;
        session.store.insert_draft();
        session.current = Some(ConversationId::Draft);
        self.request_opening(session).await;
        true
    }

    pub async fn send_message(&self, session: &mut SessionState, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let Some(current) = session.current else {
            return;
        };

        let id = match current {
            ConversationId::Persisted(id) => id,
            ConversationId::Draft => match self.create_from_draft(session).await {
                Ok(id) => id,
                Err(err) => {
                    warn!(%err, "could not create conversation");
                    self.notifier.show(locale::CREATE_FAILED);
                    return;
                }
            },
        };
        let key = ConversationId::Persisted(id);

        session.store.append(key, ChatMessage::user(text));
        session.compose.clear();
        session.typing = true;

        match self.api.send_message(id, text).await {
            Ok(()) => {
                // The backend fills in the reply and the title after the ack;
                // only the second snapshot is trusted.
                self.fetch_messages(session, id).await;
                let latest = self.fetch_messages(session, id).await;
                self.refresh_title(session, id).await;
                if session.auto_speak {
                    self.speak_latest_reply(key, &latest);
                }
            }
            Err(err) => {
                warn!(conversation = id, %err, "could not send message");
                session
                    .store
                    .append(key, ChatMessage::notice(locale::SEND_FAILED));
            }
        }
        session.typing = false;
    }

    /// Re-reads the list and patches the title of `id` only.
    pub async fn refresh_title(&self, session: &mut SessionState, id: i64) {
        let rows = match self.api.list_conversations().await {
            Ok(rows) => rows,
            Err(err) => {
                warn!(conversation = id, %err, "could not refresh title");
                return;
            }
        };
        if let Some(title) = rows
            .into_iter()
            .find(|row| row.id == id)
            .and_then(|row| row.title)
        {
            session
                .store
                .patch_title(ConversationId::Persisted(id), &title);
        }
    }

    async fn create_from_draft(&self, session: &mut SessionState) -> Result<i64, ApiError> {
        let opening = session
            .opening_message
            .as_deref()
            .unwrap_or(locale::DEFAULT_OPENING);
        let created = self.api.create_conversation(opening).await?;
        let title = created
            .title
            .unwrap_or_else(|| locale::DEFAULT_TITLE.to_string());

        session.store.promote_draft(created.id, &title);
        session.current = Some(ConversationId::Persisted(created.id));
        session.draft_busy = false;
        info!(conversation = created.id, "draft promoted");
        Ok(created.id)
    }

    async fn seed_draft(&self, session: &mut SessionState) {
        session.store.replace_summaries(Vec::new());
        session.store.insert_draft();
        session.current = Some(ConversationId::Draft);
        session.draft_busy = true;
        self.request_opening(session).await;
    }

    async fn request_opening(&self, session: &mut SessionState) {
        session.typing = true;
        let (entry, arrived) = match self.api.opening_message().await {
            Ok(content) => {
                session.opening_message = Some(content.clone());
                (ChatMessage::assistant(content), true)
            }
            Err(err) => {
                warn!(%err, "could not fetch opening message");
                (ChatMessage::notice(locale::OPENING_FAILED), false)
            }
        };
        let log = vec![entry];
        if arrived && session.auto_speak {
            self.speak_latest_reply(ConversationId::Draft, &log);
        }
        session.store.set_log(ConversationId::Draft, log);
        session.typing = false;
    }

    fn speak_latest_reply(&self, conversation: ConversationId, log: &[ChatMessage]) {
        let Some(playback) = &self.playback else {
            return;
        };
        if let Some((index, message)) = last_assistant(log) {
            playback.play(&message_key(conversation, index), &message.content);
        }
    }
}

fn summary_from(row: ConversationRow) -> ConversationSummary {
    ConversationSummary {
        id: ConversationId::Persisted(row.id),
        title: row
            .title
            .unwrap_or_else(|| locale::DEFAULT_TITLE.to_string()),
    }
}
