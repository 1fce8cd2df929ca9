use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
struct ControlState {
    locked: bool,
    label: String,
}

/// A triggering control (button) with an explicit session lock.
///
/// At most one [`SessionLease`] exists per control at any time. The lease
/// shows the busy label while held and restores the idle label when released
/// or dropped, so no exit path leaves the control locked.
#[derive(Debug, Clone)]
pub struct Control {
    idle_label: Arc<str>,
    busy_label: Arc<str>,
    state: Arc<Mutex<ControlState>>,
}

impl Control {
    pub fn new(idle_label: impl Into<String>, busy_label: impl Into<String>) -> Self {
        let idle_label: Arc<str> = idle_label.into().into();
        Self {
            state: Arc::new(Mutex::new(ControlState {
                locked: false,
                label: idle_label.to_string(),
            })),
            idle_label,
            busy_label: busy_label.into().into(),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, ControlState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Lock the control for a new session. `None` if a session is already in flight.
    pub fn try_acquire(&self) -> Option<SessionLease> {
        let mut state = self.lock_state();
        if state.locked {
            return None;
        }
        state.locked = true;
        state.label = self.busy_label.to_string();
        Some(SessionLease {
            control: self.clone(),
            released: false,
        })
    }

    pub fn is_locked(&self) -> bool {
        self.lock_state().locked
    }

    /// Label currently shown on the control.
    pub fn label(&self) -> String {
        self.lock_state().label.clone()
    }

    pub fn idle_label(&self) -> &str {
        &self.idle_label
    }

    fn unlock(&self) {
        let mut state = self.lock_state();
        state.locked = false;
        state.label = self.idle_label.to_string();
    }
}

/// Proof that a session holds its control's lock.
#[derive(Debug)]
#[must_use = "dropping the lease unlocks the control immediately"]
pub struct SessionLease {
    control: Control,
    released: bool,
}

impl SessionLease {
    /// Unlock the control and restore its idle label.
    pub fn release(mut self) {
        self.released = true;
        self.control.unlock();
    }
}

impl Drop for SessionLease {
    fn drop(&mut self) {
        if !self.released {
            self.control.unlock();
        }
    }
}
