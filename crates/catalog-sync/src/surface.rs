//! Observable output of one panel: status text, progress bar, visible log and
//! diagnostic channel.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;

use crate::feedback::LogEntry;

const EVENT_CAPACITY: usize = 256;

/// A change published by a [`Surface`].
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    Status(String),
    Progress(u8),
    Log(LogEntry),
    Diagnostic(String),
}

#[derive(Debug, Default)]
struct SurfaceState {
    status: String,
    progress: u8,
    log: Vec<LogEntry>,
    /// Entries cleared by earlier resets; the absolute position of `log[0]`.
    cleared: usize,
    diagnostics: Vec<String>,
    /// Bumped by every status writer that should invalidate running animations.
    generation: u64,
}

/// Shared handle to a panel's output. Cloning yields another handle to the same surface.
#[derive(Debug, Clone)]
pub struct Surface {
    state: Arc<Mutex<SurfaceState>>,
    events: broadcast::Sender<SurfaceEvent>,
}

impl Default for Surface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: Arc::new(Mutex::new(SurfaceState::default())),
            events,
        }
    }

    /// Receive every change made after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<SurfaceEvent> {
        self.events.subscribe()
    }

    fn lock(&self) -> MutexGuard<'_, SurfaceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, event: SurfaceEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    pub fn status(&self) -> String {
        self.lock().status.clone()
    }

    pub fn progress(&self) -> u8 {
        self.lock().progress
    }

    pub fn log(&self) -> Vec<LogEntry> {
        self.lock().log.clone()
    }

    /// Absolute position just past the last log entry written so far.
    pub fn log_cursor(&self) -> usize {
        let state = self.lock();
        state.cleared + state.log.len()
    }

    /// Log entries written at or after `cursor`, plus the cursor to pass next time.
    ///
    /// Positions keep counting across [`Surface::reset`], so a reader holding a
    /// cursor from before a reset receives the whole new log.
    pub fn log_since(&self, cursor: usize) -> (Vec<LogEntry>, usize) {
        let state = self.lock();
        let start = cursor.saturating_sub(state.cleared).min(state.log.len());
        (
            state.log[start..].to_vec(),
            state.cleared + state.log.len(),
        )
    }

    pub fn diagnostics(&self) -> Vec<String> {
        self.lock().diagnostics.clone()
    }

    /// Write final status text. Any animation still ticking on this surface
    /// loses the right to write.
    pub fn set_status(&self, text: impl Into<String>) {
        let text = text.into();
        let mut state = self.lock();
        state.generation += 1;
        state.status = text.clone();
        self.publish(SurfaceEvent::Status(text));
    }

    /// Claim the surface for a new animation, invalidating any older one.
    pub(crate) fn claim_animation(&self) -> u64 {
        let mut state = self.lock();
        state.generation += 1;
        state.generation
    }

    /// Release an animation claim without writing text.
    pub(crate) fn release_animation(&self, generation: u64) {
        let mut state = self.lock();
        if state.generation == generation {
            state.generation += 1;
        }
    }

    /// Write animated text if `generation` still owns the surface.
    ///
    /// The check and the write happen under one lock, so a tick can never
    /// land after a later `set_status`.
    pub(crate) fn write_animated(&self, generation: u64, text: String) -> bool {
        let mut state = self.lock();
        if state.generation != generation {
            return false;
        }
        state.status = text.clone();
        self.publish(SurfaceEvent::Status(text));
        true
    }

    /// Update the bar. Unchanged values are not republished.
    pub fn set_progress(&self, percent: u8) {
        let percent = percent.min(100);
        let mut state = self.lock();
        if state.progress == percent {
            return;
        }
        state.progress = percent;
        self.publish(SurfaceEvent::Progress(percent));
    }

    pub fn push_log(&self, entry: LogEntry) {
        let mut state = self.lock();
        state.log.push(entry.clone());
        self.publish(SurfaceEvent::Log(entry));
    }

    /// Record detail meant for troubleshooting, kept out of the visible log.
    pub fn push_diagnostic(&self, text: impl Into<String>) {
        let text = text.into();
        let mut state = self.lock();
        state.diagnostics.push(text.clone());
        self.publish(SurfaceEvent::Diagnostic(text));
    }

    /// Clear log, diagnostics and bar before a new session.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.cleared += state.log.len();
        state.log.clear();
        state.diagnostics.clear();
        if state.progress != 0 {
            state.progress = 0;
            self.publish(SurfaceEvent::Progress(0));
        }
    }
}
