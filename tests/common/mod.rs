//! In-memory stand-ins for the backend and the platform devices.
#![allow(dead_code)]

use async_trait::async_trait;
use memo_client::api::{ApiError, ApiResult, ChatBackend, ConversationRow, CreatedConversation};
use memo_client::capture::{AudioBlob, CaptureBackend, CaptureError, CaptureKind};
use memo_client::speech::{PlaybackCallback, PlaybackEnd, SpeechEngine, VoiceProfile};
use memo_client::types::{ChatMessage, Role};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    List,
    Create(String),
    Fetch(i64),
    Send(i64, String),
    Opening,
    Transcribe(String),
}

#[derive(Default)]
pub struct BackendState {
    pub conversations: Vec<ConversationRow>,
    pub messages: HashMap<i64, Vec<ChatMessage>>,
    pub opening: Option<String>,
    pub next_id: i64,
    pub created_title: Option<String>,
    pub fail_list: bool,
    pub fail_create: bool,
    pub fail_fetch: bool,
    pub fail_send: bool,
    /// Reply appended by the "server" after each accepted user message.
    pub reply: Option<String>,
    pub transcription: Option<ApiResult<String>>,
    pub calls: Vec<Call>,
}

#[derive(Default)]
pub struct FakeBackend {
    pub state: Mutex<BackendState>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        let backend = Self::default();
        {
            let mut state = backend.state.lock().unwrap();
            state.next_id = 100;
            state.opening = Some("¡Hola! Soy Memo.".to_string());
        }
        Arc::new(backend)
    }

    pub fn with<F: FnOnce(&mut BackendState)>(self: &Arc<Self>, f: F) -> Arc<Self> {
        f(&mut self.state.lock().unwrap());
        Arc::clone(self)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }
}

pub fn row(id: i64, title: &str) -> ConversationRow {
    ConversationRow {
        id,
        title: Some(title.to_string()),
        updated_at: Some("2024-01-01".to_string()),
    }
}

fn unavailable() -> ApiError {
    ApiError::Network("connection refused".to_string())
}

#[async_trait]
impl ChatBackend for FakeBackend {
    async fn list_conversations(&self) -> ApiResult<Vec<ConversationRow>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::List);
        if state.fail_list {
            return Err(unavailable());
        }
        Ok(state.conversations.clone())
    }

    async fn create_conversation(&self, opening: &str) -> ApiResult<CreatedConversation> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Create(opening.to_string()));
        if state.fail_create {
            return Err(unavailable());
        }
        let id = state.next_id;
        state.next_id += 1;
        let title = state.created_title.clone();
        state.conversations.insert(
            0,
            ConversationRow {
                id,
                title: title.clone(),
                updated_at: None,
            },
        );
        state
            .messages
            .insert(id, vec![ChatMessage::assistant(opening)]);
        Ok(CreatedConversation { id, title })
    }

    async fn fetch_messages(&self, conversation_id: i64) -> ApiResult<Vec<ChatMessage>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Fetch(conversation_id));
        if state.fail_fetch {
            return Err(unavailable());
        }
        Ok(state
            .messages
            .get(&conversation_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn send_message(&self, conversation_id: i64, content: &str) -> ApiResult<()> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(Call::Send(conversation_id, content.to_string()));
        if state.fail_send {
            return Err(ApiError::ServerRejected {
                status: 500,
                detail: None,
            });
        }
        let reply = state.reply.clone();
        let log = state.messages.entry(conversation_id).or_default();
        log.push(ChatMessage {
            role: Role::User,
            content: content.to_string(),
            created_at: None,
        });
        if let Some(reply) = reply {
            log.push(ChatMessage::assistant(reply));
        }
        Ok(())
    }

    async fn opening_message(&self) -> ApiResult<String> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Opening);
        state.opening.clone().ok_or_else(unavailable)
    }

    async fn transcribe(&self, audio: AudioBlob) -> ApiResult<String> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Transcribe(audio.file_name.clone()));
        state
            .transcription
            .clone()
            .unwrap_or_else(|| Ok("texto transcrito".to_string()))
    }
}

/// Speech engine that holds on to callbacks so tests decide when an
/// utterance ends.
#[derive(Default)]
pub struct FakeSpeech {
    pub spoken: Mutex<Vec<String>>,
    pub stops: Mutex<usize>,
    pending: Mutex<Vec<PlaybackCallback>>,
    /// Fire every pending callback with `Stopped` from inside `stop`.
    interrupt_on_stop: bool,
}

impl FakeSpeech {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn interrupting() -> Arc<Self> {
        Arc::new(Self {
            interrupt_on_stop: true,
            ..Self::default()
        })
    }

    pub fn pending(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }

    /// Ends the oldest still-running utterance.
    pub fn finish_oldest(&self, end: PlaybackEnd) {
        let callback = {
            let mut pending = self.pending.lock().unwrap();
            if pending.is_empty() {
                return;
            }
            pending.remove(0)
        };
        callback(end);
    }

    pub fn finish_latest(&self, end: PlaybackEnd) {
        let callback = self.pending.lock().unwrap().pop();
        if let Some(callback) = callback {
            callback(end);
        }
    }
}

impl SpeechEngine for FakeSpeech {
    fn speak(&self, text: &str, _profile: &VoiceProfile, on_end: PlaybackCallback) {
        self.spoken.lock().unwrap().push(text.to_string());
        self.pending.lock().unwrap().push(on_end);
    }

    fn stop(&self) {
        *self.stops.lock().unwrap() += 1;
        if self.interrupt_on_stop {
            let interrupted = std::mem::take(&mut *self.pending.lock().unwrap());
            for callback in interrupted {
                callback(PlaybackEnd::Stopped);
            }
        }
    }
}

/// Capture backend with scripted outcomes.
pub struct FakeCapture {
    pub kind: CaptureKind,
    pub start_result: Result<(), CaptureError>,
    pub stop_result: Result<AudioBlob, CaptureError>,
    pub starts: Arc<Mutex<usize>>,
}

impl FakeCapture {
    pub fn ok(kind: CaptureKind) -> Self {
        Self {
            kind,
            start_result: Ok(()),
            stop_result: Ok(AudioBlob {
                file_name: "grabacion.webm".to_string(),
                mime: "audio/webm".to_string(),
                bytes: vec![0, 1, 2],
            }),
            starts: Arc::new(Mutex::new(0)),
        }
    }

    pub fn failing_start(kind: CaptureKind, err: CaptureError) -> Self {
        Self {
            start_result: Err(err),
            ..Self::ok(kind)
        }
    }
}

#[async_trait]
impl CaptureBackend for FakeCapture {
    fn kind(&self) -> CaptureKind {
        self.kind
    }

    async fn start(&mut self) -> Result<(), CaptureError> {
        *self.starts.lock().unwrap() += 1;
        self.start_result.clone()
    }

    async fn stop(&mut self) -> Result<AudioBlob, CaptureError> {
        self.stop_result.clone()
    }
}
