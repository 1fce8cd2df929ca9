use std::time::Duration;

use crate::animator::StatusAnimator;
use crate::error::SyncError;
use crate::feedback::LogEntry;
use crate::progress::ProgressState;
use crate::surface::Surface;

/// Counters for one finished batch session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionReport {
    pub requests: u32,
    pub phases_completed: usize,
}

/// Result of triggering a flow.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome<T = SessionReport> {
    /// The session ran to completion.
    Completed(T),
    /// A fail-fast error ended the session.
    Failed(SyncError),
    /// The control was already locked by an in-flight session; nothing happened.
    AlreadyRunning,
    /// A precondition failed before any session started.
    Rejected(String),
}

impl<T> SessionOutcome<T> {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            _ => None,
        }
    }
}

/// State owned by one running session: its surface handle, animation and
/// progress. Created per run, never shared between sessions.
pub struct Session {
    surface: Surface,
    animator: StatusAnimator,
    progress: ProgressState,
    requests: u32,
}

impl Session {
    /// Start a session on `surface`, clearing the previous run's log and bar.
    pub fn new(surface: Surface, animation_interval: Duration, progress: ProgressState) -> Self {
        surface.reset();
        Self {
            animator: StatusAnimator::new(surface.clone(), animation_interval),
            surface,
            progress,
            requests: 0,
        }
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn progress(&self) -> &ProgressState {
        &self.progress
    }

    pub fn progress_mut(&mut self) -> &mut ProgressState {
        &mut self.progress
    }

    /// Push the current overall percentage to the bar.
    pub fn publish_progress(&self) {
        self.surface.set_progress(self.progress.overall());
    }

    pub fn log(&self, entry: LogEntry) {
        self.surface.push_log(entry);
    }

    /// Classify and log every backend line.
    pub fn log_lines<'a>(&self, lines: impl IntoIterator<Item = &'a String>) {
        for line in lines {
            self.log(LogEntry::classified(line.as_str()));
        }
    }

    /// Animate interim status while a request is outstanding.
    pub fn animate(&mut self, base: impl Into<String>) {
        self.animator.start(base);
    }

    pub fn stop_animation(&mut self) {
        self.animator.stop();
    }

    /// Stop any animation, then write terminal status text.
    pub fn finish_status(&mut self, text: impl Into<String>) {
        self.animator.finish(text);
    }

    pub fn record_request(&mut self) {
        self.requests += 1;
    }

    pub fn requests(&self) -> u32 {
        self.requests
    }
}
