/// Voice capture and transcription
///
/// Two recording paths feed the same upload:
///
/// - `native` - on-device recorder behind a microphone permission prompt
/// - `stream` - media-stream recorder that flushes encoded chunks periodically
///
/// [`AudioCaptureController`] owns the single recording slot, turns the
/// finished recording into an [`AudioBlob`], sends it for transcription and
/// drops the text into the compose field.
mod native;
mod stream;

use async_trait::async_trait;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::api::{ApiError, ChatBackend};
use crate::locale;
use crate::notify::NotificationController;
use crate::session::SessionState;
use crate::sync::ConversationSyncController;

pub use native::{NativeCapture, NativeRecorder, NativeRecording};
pub use stream::{
    DEFAULT_STREAM_MIME, FLUSH_INTERVAL, MediaRecorder, MediaStreamApi, STREAM_MIME_PREFERENCE,
    StreamCapture, pick_stream_mime,
};

const RECORDING_TOAST: std::time::Duration = std::time::Duration::from_millis(1500);

/// A finished recording, named the way the transcription endpoint expects.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioBlob {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureKind {
    NativeDevice,
    BrowserStream,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CaptureError {
    #[error("audio capture is not supported here")]
    Unsupported,

    #[error("microphone permission denied")]
    PermissionDenied,

    #[error("recording device failed: {0}")]
    Device(String),
}

#[async_trait]
pub trait CaptureBackend: Send {
    fn kind(&self) -> CaptureKind;

    async fn start(&mut self) -> Result<(), CaptureError>;

    async fn stop(&mut self) -> Result<AudioBlob, CaptureError>;
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecordingSession {
    pub backend: CaptureKind,
    pub started_at: Instant,
}

pub struct AudioCaptureController {
    backend: Box<dyn CaptureBackend>,
    transcriber: Transcriber,
    notifier: NotificationController,
    recording: Option<RecordingSession>,
}

impl AudioCaptureController {
    pub fn new(
        backend: Box<dyn CaptureBackend>,
        api: Arc<dyn ChatBackend>,
        notifier: NotificationController,
    ) -> Self {
        Self {
            backend,
            transcriber: Transcriber::new(api, notifier.clone()),
            notifier,
            recording: None,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    pub fn recording(&self) -> Option<&RecordingSession> {
        self.recording.as_ref()
    }

    /// The microphone button: starts when idle, otherwise stops and uploads.
    pub async fn toggle(&mut self, state: &mut SessionState, sync: &ConversationSyncController) {
        if self.is_recording() {
            self.stop(state, sync).await;
        } else {
            self.start().await;
        }
    }

    /// Returns whether a recording is now running. Failures leave the slot
    /// empty and surface as a toast.
    pub async fn start(&mut self) -> bool {
        if self.is_recording() {
            return true;
        }
        let kind = self.backend.kind();
        match self.backend.start().await {
            Ok(()) => {
                info!(?kind, "recording started");
                self.recording = Some(RecordingSession {
                    backend: kind,
                    started_at: Instant::now(),
                });
                if kind == CaptureKind::BrowserStream {
                    self.notifier
                        .show_for(locale::RECORDING_STARTED, RECORDING_TOAST);
                }
                true
            }
            Err(err) => {
                warn!(?kind, %err, "could not start recording");
                let text = match (&err, kind) {
                    (CaptureError::Unsupported, _) => locale::CAPTURE_UNSUPPORTED,
                    (CaptureError::PermissionDenied, _) => locale::PERMISSION_DENIED,
                    (CaptureError::Device(_), CaptureKind::BrowserStream) => {
                        locale::STREAM_START_FAILED
                    }
                    (CaptureError::Device(_), CaptureKind::NativeDevice) => {
                        locale::CAPTURE_START_FAILED
                    }
                };
                self.notifier.show(text);
                false
            }
        }
    }

    /// Stops the running recording and uploads it. The slot is free again
    /// once this returns, whatever happened.
    pub async fn stop(&mut self, state: &mut SessionState, sync: &ConversationSyncController) {
        let Some(recording) = self.recording.take() else {
            return;
        };
        let result = self.backend.stop().await;
        info!(
            backend = ?recording.backend,
            elapsed_ms = recording.started_at.elapsed().as_millis() as u64,
            "recording stopped"
        );
        match result {
            Ok(blob) => self.transcriber.upload(blob, state, sync).await,
            Err(err) => {
                warn!(%err, "could not finish recording");
                self.notifier.show(locale::CAPTURE_STOP_FAILED);
            }
        }
    }
}

/// Upload half of the capture flow, also usable with audio that did not come
/// from a live recording.
#[derive(Clone)]
pub struct Transcriber {
    api: Arc<dyn ChatBackend>,
    notifier: NotificationController,
}

impl Transcriber {
    pub fn new(api: Arc<dyn ChatBackend>, notifier: NotificationController) -> Self {
        Self { api, notifier }
    }

    /// Sends a recording for transcription and puts the text in the compose
    /// field. Nothing is sent as a message.
    pub async fn upload(
        &self,
        blob: AudioBlob,
        state: &mut SessionState,
        sync: &ConversationSyncController,
    ) {
        match self.api.transcribe(blob).await {
            Ok(text) => {
                state.compose = text;
                if let Some(id) = state.current.and_then(|current| current.persisted()) {
                    sync.fetch_messages(state, id).await;
                }
            }
            Err(ApiError::Unintelligible) => {
                self.notifier.show(locale::AUDIO_NOT_UNDERSTOOD);
            }
            Err(ApiError::ServerRejected { status, detail }) => {
                warn!(status, ?detail, "transcription rejected");
                let detail = detail.unwrap_or_else(|| locale::AUDIO_FAILED_DETAIL.to_string());
                self.notifier.show(format!("Error: {}", detail));
            }
            Err(err) => {
                warn!(%err, "transcription upload failed");
                self.notifier.show(locale::CONNECTION_PROBLEM);
            }
        }
    }
}
