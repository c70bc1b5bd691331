use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use opsgate_core::api::{parse_app_list, AppSyncStatus, SyncStatusSource, ToolError};

use crate::process::run_captured;

/// `argocd app list -o json` against the CLI's current context.
pub struct ArgocdStatusSource {
    bin: PathBuf,
    timeout: Duration,
}

impl ArgocdStatusSource {
    /// `None` when `bin` cannot be resolved on `PATH`.
    pub fn locate(bin: &str, timeout: Duration) -> Option<Self> {
        match which::which(bin) {
            Ok(bin) => Some(Self { bin, timeout }),
            Err(e) => {
                tracing::debug!(target: "opsgate.sync", bin, error = %e, "argocd not found, sync report disabled");
                None
            }
        }
    }

    pub fn with_path(bin: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            bin: bin.into(),
            timeout,
        }
    }
}

#[async_trait]
impl SyncStatusSource for ArgocdStatusSource {
    fn name(&self) -> &str {
        "argocd"
    }

    async fn app_statuses(&self) -> Result<Vec<AppSyncStatus>, ToolError> {
        let stdout = run_captured(&self.bin, &["app", "list", "-o", "json"], self.timeout).await?;
        parse_app_list(&stdout).map_err(ToolError::Decode)
    }
}
