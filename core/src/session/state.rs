use serde::{Deserialize, Serialize};

/// Repeats of the same command that count as a loop.
pub const LOOP_THRESHOLD: u32 = 2;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionState {
    pub last_command: String,
    pub loop_count: u32,
    pub validated_apps: Vec<String>,
    pub diffed_apps: Vec<String>,
}

impl SessionState {
    /// Record `command` and report whether it closes a loop.
    ///
    /// Comparison is exact: whitespace or flag-order differences are a new command.
    pub fn observe_command(&mut self, command: &str) -> bool {
        if self.last_command == command {
            self.loop_count = self.loop_count.saturating_add(1);
            if self.loop_count >= LOOP_THRESHOLD {
                self.loop_count = 0;
                return true;
            }
            return false;
        }
        self.last_command = command.to_string();
        self.loop_count = 0;
        false
    }

    pub fn record_validated(&mut self, app: &str) {
        self.validated_apps.push(app.to_string());
    }

    pub fn record_diffed(&mut self, app: &str) {
        self.diffed_apps.push(app.to_string());
    }

    pub fn has_diffed(&self, app: &str) -> bool {
        self.diffed_apps.iter().any(|a| a == app)
    }
}
