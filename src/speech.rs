//! Single-slot text-to-speech playback.
//!
//! Many message bubbles can ask to be read aloud, but only one may be
//! speaking at a time. The arbiter owns that slot and hides the engine's
//! callback model behind `speak` / `stop`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

use crate::locale::ASSISTANT_SIGIL;
use crate::types::{ChatMessage, Role};

#[derive(Clone, Debug, PartialEq)]
pub struct VoiceProfile {
    pub language: String,
    pub voice: String,
    pub pitch: f32,
    pub rate: f32,
}

impl Default for VoiceProfile {
    fn default() -> Self {
        Self {
            language: "es-US".to_string(),
            voice: "es-us-x-esc-network".to_string(),
            pitch: 0.68,
            rate: 1.1,
        }
    }
}

/// How an utterance ended. All three are terminal.
#[derive(Clone, Debug, PartialEq)]
pub enum PlaybackEnd {
    Done,
    Stopped,
    Error(String),
}

pub type PlaybackCallback = Box<dyn FnOnce(PlaybackEnd) + Send + 'static>;

/// Platform text-to-speech engine.
///
/// `speak` must eventually invoke `on_end` exactly once, possibly from
/// another thread, possibly from inside a later `stop`.
pub trait SpeechEngine: Send + Sync {
    fn speak(&self, text: &str, profile: &VoiceProfile, on_end: PlaybackCallback);
    fn stop(&self);
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlaybackToken {
    pub message_key: String,
    generation: u64,
}

#[derive(Default)]
struct PlaybackSlot {
    active: Option<PlaybackToken>,
    generation: u64,
}

impl PlaybackSlot {
    fn claim(&mut self, key: &str) -> u64 {
        self.generation += 1;
        self.active = Some(PlaybackToken {
            message_key: key.to_string(),
            generation: self.generation,
        });
        self.generation
    }
}

#[derive(Clone)]
pub struct SpeechPlaybackArbiter {
    engine: Arc<dyn SpeechEngine>,
    profile: VoiceProfile,
    slot: Arc<Mutex<PlaybackSlot>>,
}

impl SpeechPlaybackArbiter {
    pub fn new(engine: Arc<dyn SpeechEngine>) -> Self {
        Self::with_profile(engine, VoiceProfile::default())
    }

    pub fn with_profile(engine: Arc<dyn SpeechEngine>, profile: VoiceProfile) -> Self {
        Self {
            engine,
            profile,
            slot: Arc::new(Mutex::new(PlaybackSlot::default())),
        }
    }

    /// Toggles playback of one bubble. Returns whether `key` is now playing.
    ///
    /// Toggle-off versus play is decided under a single lock, and the engine
    /// is called only after it is released. Engine callbacks may arrive from
    /// any thread; `speak` itself is expected from one flow.
    pub fn speak(&self, key: &str, raw_text: &str) -> bool {
        let claimed = {
            let mut slot = self.lock();
            if slot
                .active
                .as_ref()
                .is_some_and(|token| token.message_key == key)
            {
                slot.active = None;
                None
            } else {
                Some(slot.claim(key))
            }
        };
        self.engine.stop();
        match claimed {
            Some(generation) => {
                self.start(key, raw_text, generation);
                true
            }
            None => false,
        }
    }

    pub fn speak_message(&self, key: &str, message: &ChatMessage) -> bool {
        self.speak(key, &message.content)
    }

    /// Starts `key` regardless of what is playing, without the toggle-off.
    pub fn play(&self, key: &str, raw_text: &str) {
        let generation = self.lock().claim(key);
        self.engine.stop();
        self.start(key, raw_text, generation);
    }

    fn start(&self, key: &str, raw_text: &str, generation: u64) {
        let text = strip_role_sigil(raw_text);
        debug!(key, generation, "speech playback started");

        let slot = Arc::clone(&self.slot);
        self.engine.speak(
            &text,
            &self.profile,
            Box::new(move |end| {
                if let PlaybackEnd::Error(err) = &end {
                    warn!(%err, "speech playback failed");
                }
                let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
                if slot
                    .active
                    .as_ref()
                    .is_some_and(|token| token.generation == generation)
                {
                    slot.active = None;
                }
            }),
        );
    }

    pub fn stop(&self) {
        self.lock().active = None;
        self.engine.stop();
    }

    pub fn active_key(&self) -> Option<String> {
        self.lock()
            .active
            .as_ref()
            .map(|token| token.message_key.clone())
    }

    pub fn is_playing(&self, key: &str) -> bool {
        self.active_key().as_deref() == Some(key)
    }

    fn lock(&self) -> MutexGuard<'_, PlaybackSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Removes the legacy role decoration: user text was stored behind a leading
/// space, assistant text behind `"Memo:"`.
pub fn strip_role_sigil(raw: &str) -> String {
    if raw.starts_with(' ') {
        return raw.trim().to_string();
    }
    match raw.strip_prefix(ASSISTANT_SIGIL) {
        Some(rest) => rest.trim_start().to_string(),
        None => raw.to_string(),
    }
}

/// The last assistant entry of a log with its index, if any.
pub fn last_assistant(messages: &[ChatMessage]) -> Option<(usize, &ChatMessage)> {
    messages
        .iter()
        .enumerate()
        .rev()
        .find(|(_, message)| message.role == Role::Assistant)
}
