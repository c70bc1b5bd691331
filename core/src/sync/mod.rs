//! Post-push sync status of the Argo CD applications.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ToolError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppSyncStatus {
    pub name: String,
    pub sync: String,
    pub health: String,
    pub messages: Vec<String>,
}

impl AppSyncStatus {
    pub fn is_settled(&self) -> bool {
        self.sync == "Synced" && self.health == "Healthy"
    }
}

/// Source of application status, typically `argocd app list -o json`.
#[async_trait]
pub trait SyncStatusSource: Send + Sync {
    fn name(&self) -> &str;

    async fn app_statuses(&self) -> Result<Vec<AppSyncStatus>, ToolError>;
}

#[derive(Deserialize)]
struct RawApp {
    metadata: RawMetadata,
    #[serde(default)]
    status: RawStatus,
}

#[derive(Deserialize)]
struct RawMetadata {
    name: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawStatus {
    sync: RawPhase,
    health: RawPhase,
    conditions: Vec<RawCondition>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawPhase {
    status: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawCondition {
    message: String,
}

pub fn parse_app_list(json: &str) -> Result<Vec<AppSyncStatus>, serde_json::Error> {
    let raw: Vec<RawApp> = serde_json::from_str(json)?;
    Ok(raw
        .into_iter()
        .map(|a| AppSyncStatus {
            name: a.metadata.name,
            sync: or_unknown(a.status.sync.status),
            health: or_unknown(a.status.health.status),
            messages: a
                .status
                .conditions
                .into_iter()
                .map(|c| c.message)
                .filter(|m| !m.is_empty())
                .collect(),
        })
        .collect())
}

fn or_unknown(s: String) -> String {
    if s.is_empty() {
        "Unknown".to_string()
    } else {
        s
    }
}

const MAX_MESSAGE_CHARS: usize = 200;

/// One line per unsettled app, or `None` when everything is Synced/Healthy.
pub fn summarize(apps: &[AppSyncStatus]) -> Option<String> {
    let pending: Vec<&AppSyncStatus> = apps.iter().filter(|a| !a.is_settled()).collect();
    if pending.is_empty() {
        return None;
    }

    let mut out = format!(
        "After push, {} of {} applications are not Synced/Healthy yet:",
        pending.len(),
        apps.len()
    );
    for app in pending {
        out.push_str(&format!("\n- {}: {}/{}", app.name, app.sync, app.health));
        if let Some(msg) = app.messages.first() {
            let msg: String = msg.chars().take(MAX_MESSAGE_CHARS).collect();
            out.push_str(&format!(" ({msg})"));
        }
    }
    Some(out)
}
