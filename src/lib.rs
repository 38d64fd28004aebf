//! Client-side session controller for the Memo voice chat assistant.
//!
//! The chat screen keeps a [`session::SessionState`] and hands it to the
//! controllers:
//!
//! - [`sync::ConversationSyncController`] - conversation list, drafts, send/fetch
//! - [`capture::AudioCaptureController`] - record, transcribe, fill the compose field
//! - [`speech::SpeechPlaybackArbiter`] - one message read aloud at a time
//! - [`notify::NotificationController`] - one toast at a time
pub mod api;
pub mod capture;
pub mod config;
pub mod credentials;
pub mod locale;
pub mod notify;
pub mod session;
pub mod speech;
pub mod store;
pub mod sync;
pub mod telemetry;
pub mod types;
