use std::sync::Mutex;

use crate::error::SessionError;

use super::state::SessionState;

/// Read-modify-write access to the session document.
///
/// `load` never fails; implementations fall back to the default state.
/// `save` failures are reported but callers must not let them change a decision.
pub trait SessionStore: Send + Sync {
    fn name(&self) -> &str;

    fn load(&self) -> SessionState;

    fn save(&self, state: &SessionState) -> Result<(), SessionError>;

    fn reset(&self) -> Result<(), SessionError> {
        self.save(&SessionState::default())
    }
}

/// Process-local store, used by tests and dry runs.
#[derive(Default)]
pub struct MemorySessionStore {
    inner: Mutex<SessionState>,
}

impl MemorySessionStore {
    pub fn new(state: SessionState) -> Self {
        Self {
            inner: Mutex::new(state),
        }
    }

    pub fn snapshot(&self) -> SessionState {
        self.load()
    }
}

impl SessionStore for MemorySessionStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn load(&self) -> SessionState {
        self.inner
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    fn save(&self, state: &SessionState) -> Result<(), SessionError> {
        if let Ok(mut s) = self.inner.lock() {
            *s = state.clone();
        }
        Ok(())
    }
}
