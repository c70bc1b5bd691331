//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `opsgate_core::api` instead of reaching into internal modules.

pub use crate::audit::{AuditEvent, AuditLog};
pub use crate::config::{AppConfig, AuditConfig, LoggingConfig, RemoteConfig, ToolsConfig};
pub use crate::context::AppContext;
pub use crate::decision::{Decision, DecisionKind};
pub use crate::engine::{Gate, GateServices, ServicesFactory, Verdict};
pub use crate::error::{CliError, ConfigError, RemoteError, SessionError, ToolError};
pub use crate::hook::{HookInput, HookOutput, HookPhase};
pub use crate::remote::{ProbeResponse, RemoteProbe};
pub use crate::repo::{ClusterContext, ContextDetector};
pub use crate::session::{SessionState, SessionStore};
pub use crate::sync::{parse_app_list, AppSyncStatus, SyncStatusSource};
pub use crate::validate::{Severity, ValidationError, ValidationReport};
