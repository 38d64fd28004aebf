use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use super::{AudioBlob, CaptureBackend, CaptureError, CaptureKind};

/// What the device recorder hands back once unloaded.
#[derive(Clone, Debug, PartialEq)]
pub struct NativeRecording {
    pub bytes: Vec<u8>,
    /// Container extension, e.g. `m4a`.
    pub extension: String,
}

/// Platform microphone recorder (the mobile side).
#[async_trait]
pub trait NativeRecorder: Send + Sync {
    /// Prompts if needed; true when recording is allowed.
    async fn request_permission(&self) -> bool;

    async fn start(&self) -> Result<(), CaptureError>;

    /// Stops and unloads the recorder.
    async fn stop(&self) -> Result<NativeRecording, CaptureError>;
}

pub struct NativeCapture {
    recorder: Arc<dyn NativeRecorder>,
}

impl NativeCapture {
    pub fn new(recorder: Arc<dyn NativeRecorder>) -> Self {
        Self { recorder }
    }
}

#[async_trait]
impl CaptureBackend for NativeCapture {
    fn kind(&self) -> CaptureKind {
        CaptureKind::NativeDevice
    }

    async fn start(&mut self) -> Result<(), CaptureError> {
        if !self.recorder.request_permission().await {
            return Err(CaptureError::PermissionDenied);
        }
        self.recorder.start().await
    }

    async fn stop(&mut self) -> Result<AudioBlob, CaptureError> {
        let recording = self.recorder.stop().await?;
        let extension = recording.extension.trim_start_matches('.').to_ascii_lowercase();
        debug!(bytes = recording.bytes.len(), %extension, "native recording unloaded");
        Ok(AudioBlob {
            file_name: format!("audio.{}", extension),
            mime: format!("audio/{}", extension),
            bytes: recording.bytes,
        })
    }
}
