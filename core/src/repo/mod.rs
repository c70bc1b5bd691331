//! Repository context detection: root discovery, node/app scanning and the
//! TTL cache in front of them.

mod apps;
mod cluster;
mod detector;
pub mod manifest;
pub mod model;
mod root;

pub use detector::{build_context, ContextDetector, DEFAULT_CACHE_TTL};
pub use manifest::{AppSource, ApplicationManifest};
pub use model::{AppDefinition, ChartRef, ClusterContext, Node, NodeRole, PsaLevel, VERSION_SENTINELS};
pub use root::{find_repo_root, APPS_DIR, CLUSTER_CONFIG_FILE, DOT_MARKER};
