use std::path::{Path, PathBuf};

use opsgate_core::api::{SessionError, SessionState, SessionStore};

/// Session document as a JSON file. Writes go through a sibling temp file
/// and a rename, so readers never see a torn document.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SessionStore for FileSessionStore {
    fn name(&self) -> &str {
        "file"
    }

    fn load(&self) -> SessionState {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(s) => s,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::debug!(target: "opsgate.session", path = %self.path.display(), error = %e, "state unreadable, using default");
                }
                return SessionState::default();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::debug!(target: "opsgate.session", path = %self.path.display(), error = %e, "state corrupt, using default");
            SessionState::default()
        })
    }

    fn save(&self, state: &SessionState) -> Result<(), SessionError> {
        let body = serde_json::to_string_pretty(state).map_err(SessionError::Encode)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(format!(".{}.tmp", std::process::id()));
        let tmp = PathBuf::from(tmp);

        std::fs::write(&tmp, body).map_err(|e| self.io_err(e))?;
        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(self.io_err(e));
        }
        Ok(())
    }
}
