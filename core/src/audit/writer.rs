use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;
use tokio::io::AsyncWriteExt;

use crate::config::AuditConfig;

pub const AUDIT_SCHEMA_VERSION: u32 = 1;

fn audit_preview(s: &str) -> String {
    const MAX: usize = 120;
    if s.len() <= MAX {
        return s.to_string();
    }
    let end = s
        .char_indices()
        .take_while(|(i, _)| *i < MAX)
        .last()
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    let mut out = s[..end].to_string();
    out.push('…');
    out
}

/// One JSONL record.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub v: u32,
    #[serde(rename = "type")]
    pub event_type: String,
    pub ts: String,
    pub data: Value,
}

impl AuditEvent {
    pub fn new(event_type: &str, data: Value) -> Self {
        Self {
            v: AUDIT_SCHEMA_VERSION,
            event_type: event_type.to_string(),
            ts: chrono::Utc::now().to_rfc3339(),
            data,
        }
    }
}

/// Append-only decision log. Every failure is logged and swallowed.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn from_config(cfg: &AuditConfig) -> Option<Self> {
        if !cfg.enabled {
            return None;
        }
        let path = cfg.path.trim();
        if path.is_empty() {
            tracing::warn!(
                target: "opsgate.audit",
                "audit is enabled but audit.path is empty, no decisions will be recorded"
            );
            return None;
        }
        if path == "stdout:" {
            tracing::warn!(
                target: "opsgate.audit",
                "audit.path cannot be stdout (reserved for the hook decision), audit disabled"
            );
            return None;
        }
        Some(Self {
            path: PathBuf::from(shellexpand::tilde(path).into_owned()),
        })
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    pub async fn record(&self, event: &AuditEvent) {
        let mut line = match serde_json::to_string(event) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(target: "opsgate.audit", error = %e, "failed to encode audit event");
                return;
            }
        };
        line.push('\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                tracing::warn!(target: "opsgate.audit", path = %parent.display(), error = %e, "failed to create audit dir");
                return;
            }
        }

        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await;
        let mut file = match file {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(target: "opsgate.audit", path = %self.path.display(), error = %e, "failed to open audit log");
                return;
            }
        };

        tracing::debug!(
            target: "opsgate.audit",
            bytes = line.len(),
            preview = %audit_preview(line.trim_end()),
            "writing audit line"
        );
        if let Err(e) = file.write_all(line.as_bytes()).await {
            tracing::warn!(target: "opsgate.audit", error = %e, "failed to write audit log");
            return;
        }
        let _ = file.flush().await;
    }
}
