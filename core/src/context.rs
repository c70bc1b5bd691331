use std::sync::Arc;

use crate::audit::AuditLog;
use crate::config::AppConfig;
use crate::repo::ContextDetector;

/// Per-process state shared by every handler: configuration, the context
/// cache and the optional audit log.
#[derive(Clone)]
pub struct AppContext {
    cfg: AppConfig,
    detector: Arc<ContextDetector>,
    audit: Option<AuditLog>,
    bootstrap: bool,
}

impl AppContext {
    pub fn new(cfg: AppConfig, bootstrap: bool) -> Self {
        let detector = Arc::new(ContextDetector::new(cfg.cache_ttl()));
        let audit = AuditLog::from_config(&cfg.audit);
        Self {
            cfg,
            detector,
            audit,
            bootstrap,
        }
    }

    pub fn cfg(&self) -> &AppConfig {
        &self.cfg
    }

    pub fn detector(&self) -> &Arc<ContextDetector> {
        &self.detector
    }

    pub fn audit(&self) -> Option<&AuditLog> {
        self.audit.as_ref()
    }

    pub fn bootstrap(&self) -> bool {
        self.bootstrap
    }
}
