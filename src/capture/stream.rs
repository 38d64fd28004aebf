use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

use super::{AudioBlob, CaptureBackend, CaptureError, CaptureKind};

/// Encodings tried in order; the first one the recorder supports wins.
pub const STREAM_MIME_PREFERENCE: [&str; 4] = [
    "audio/webm;codecs=opus",
    "audio/webm",
    "audio/ogg;codecs=opus",
    "audio/ogg",
];

pub const DEFAULT_STREAM_MIME: &str = "audio/webm";

/// How often the recorder hands over an encoded chunk.
pub const FLUSH_INTERVAL: Duration = Duration::from_millis(250);

/// Media-stream capture API (the browser side).
#[async_trait]
pub trait MediaStreamApi: Send + Sync {
    /// False when the platform has no recorder at all.
    fn is_available(&self) -> bool;

    fn is_type_supported(&self, mime: &str) -> bool;

    /// Acquires the microphone stream and starts a recorder that pushes one
    /// chunk into `chunks` every `timeslice`.
    async fn open(
        &self,
        mime: &str,
        timeslice: Duration,
        chunks: mpsc::UnboundedSender<Vec<u8>>,
    ) -> Result<Box<dyn MediaRecorder>, CaptureError>;
}

#[async_trait]
pub trait MediaRecorder: Send {
    /// Flushes the final chunk, then releases the stream tracks. Every chunk
    /// must be in the channel by the time this returns.
    async fn stop(self: Box<Self>) -> Result<(), CaptureError>;
}

pub fn pick_stream_mime(api: &dyn MediaStreamApi) -> &'static str {
    STREAM_MIME_PREFERENCE
        .iter()
        .copied()
        .find(|mime| api.is_type_supported(mime))
        .unwrap_or(DEFAULT_STREAM_MIME)
}

fn extension_for(mime: &str) -> &'static str {
    if mime.contains("ogg") { "ogg" } else { "webm" }
}

struct ActiveStream {
    recorder: Box<dyn MediaRecorder>,
    chunks: mpsc::UnboundedReceiver<Vec<u8>>,
    mime: &'static str,
}

pub struct StreamCapture {
    api: Arc<dyn MediaStreamApi>,
    active: Option<ActiveStream>,
}

impl StreamCapture {
    pub fn new(api: Arc<dyn MediaStreamApi>) -> Self {
        Self { api, active: None }
    }
}

#[async_trait]
impl CaptureBackend for StreamCapture {
    fn kind(&self) -> CaptureKind {
        CaptureKind::BrowserStream
    }

    async fn start(&mut self) -> Result<(), CaptureError> {
        if !self.api.is_available() {
            return Err(CaptureError::Unsupported);
        }
        let mime = pick_stream_mime(self.api.as_ref());
        let (tx, rx) = mpsc::unbounded_channel();
        let recorder = self.api.open(mime, FLUSH_INTERVAL, tx).await?;
        debug!(mime, "stream recorder opened");
        self.active = Some(ActiveStream {
            recorder,
            chunks: rx,
            mime,
        });
        Ok(())
    }

    async fn stop(&mut self) -> Result<AudioBlob, CaptureError> {
        let ActiveStream {
            recorder,
            mut chunks,
            mime,
        } = self
            .active
            .take()
            .ok_or_else(|| CaptureError::Device("no active stream".to_string()))?;
        recorder.stop().await?;

        let mut bytes = Vec::new();
        let mut count = 0usize;
        while let Ok(chunk) = chunks.try_recv() {
            if !chunk.is_empty() {
                bytes.extend_from_slice(&chunk);
                count += 1;
            }
        }
        debug!(chunks = count, bytes = bytes.len(), "stream recording assembled");

        Ok(AudioBlob {
            file_name: format!("grabacion.{}", extension_for(mime)),
            mime: mime.to_string(),
            bytes,
        })
    }
}
