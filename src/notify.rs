use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(2200);

#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
    pub text: String,
    pub expires_at: Instant,
}

#[derive(Default)]
struct ToastSlot {
    current: Option<Toast>,
    generation: u64,
}

/// Single-slot toast. A new toast replaces the visible one; nothing queues.
#[derive(Clone)]
pub struct NotificationController {
    slot: Arc<Mutex<ToastSlot>>,
    default_duration: Duration,
}

impl Default for NotificationController {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_DURATION)
    }
}

impl NotificationController {
    pub fn new(default_duration: Duration) -> Self {
        Self {
            slot: Arc::new(Mutex::new(ToastSlot::default())),
            default_duration,
        }
    }

    pub fn show(&self, text: impl Into<String>) {
        self.show_for(text, self.default_duration);
    }

    pub fn show_for(&self, text: impl Into<String>, duration: Duration) {
        let text = text.into();
        debug!(%text, ?duration, "toast");
        let generation = {
            let mut slot = self.lock();
            slot.generation += 1;
            slot.current = Some(Toast {
                text,
                expires_at: Instant::now() + duration,
            });
            slot.generation
        };

        // Outside a runtime the toast still expires lazily through `current`.
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let slot = Arc::clone(&self.slot);
            handle.spawn(async move {
                tokio::time::sleep(duration).await;
                let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
                if slot.generation == generation {
                    slot.current = None;
                }
            });
        }
    }

    /// The visible toast, if it has not expired yet.
    pub fn current(&self) -> Option<Toast> {
        let mut slot = self.lock();
        if let Some(toast) = &slot.current
            && toast.expires_at <= Instant::now()
        {
            slot.current = None;
        }
        slot.current.clone()
    }

    pub fn current_text(&self) -> Option<String> {
        self.current().map(|toast| toast.text)
    }

    pub fn dismiss(&self) {
        let mut slot = self.lock();
        slot.generation += 1;
        slot.current = None;
    }

    fn lock(&self) -> MutexGuard<'_, ToastSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
