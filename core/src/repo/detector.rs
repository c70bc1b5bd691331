use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use super::apps::discover_apps;
use super::cluster::{discover_nodes, infer_domain, read_cluster_config};
use super::model::ClusterContext;
use super::root::find_repo_root;

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30);

struct CachedContext {
    built_at: Instant,
    context: Arc<ClusterContext>,
}

/// Owns the single-slot context cache. Nothing on disk invalidates it; callers
/// that just wrote into the repo call [`ContextDetector::invalidate`].
pub struct ContextDetector {
    ttl: Duration,
    slot: Mutex<Option<CachedContext>>,
}

impl Default for ContextDetector {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

impl ContextDetector {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// Cached context if still fresh, otherwise a fresh detection pass.
    /// `None` only when `start` is outside every repository.
    pub fn detect(&self, start: &Path) -> Option<Arc<ClusterContext>> {
        let root = find_repo_root(start)?;

        if let Ok(slot) = self.slot.lock() {
            if let Some(cached) = slot.as_ref() {
                if cached.built_at.elapsed() < self.ttl && cached.context.repo_root == root {
                    return Some(cached.context.clone());
                }
            }
        }

        let started = Instant::now();
        let context = Arc::new(build_context(root));
        tracing::debug!(
            target: "opsgate.repo",
            root = %context.repo_root.display(),
            apps = context.apps.len(),
            nodes = context.nodes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "repository context built"
        );

        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(CachedContext {
                built_at: Instant::now(),
                context: context.clone(),
            });
        }
        Some(context)
    }

    pub fn invalidate(&self) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
    }
}

/// Uncached detection pass over a known repository root.
pub fn build_context(root: std::path::PathBuf) -> ClusterContext {
    let cluster = read_cluster_config(&root);
    ClusterContext {
        name: cluster.name,
        control_endpoint: cluster.endpoint,
        nodes: discover_nodes(&root),
        domain: infer_domain(&root),
        apps: discover_apps(&root),
        repo_root: root,
    }
}
