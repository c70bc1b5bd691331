use std::sync::Arc;

use anyhow::Result;

use opsgate_core::api::{AppConfig, RemoteProbe, SessionStore, SyncStatusSource};

use crate::remote::HttpRemoteProbe;
use crate::session::FileSessionStore;
use crate::sync::ArgocdStatusSource;

pub fn build_store(cfg: &AppConfig) -> Arc<dyn SessionStore> {
    Arc::new(FileSessionStore::new(cfg.state_path()))
}

pub fn build_probe(cfg: &AppConfig) -> Result<Option<Arc<dyn RemoteProbe>>> {
    if !cfg.remote.enabled {
        return Ok(None);
    }
    Ok(Some(Arc::new(HttpRemoteProbe::new(cfg.remote.timeout_ms)?)))
}

pub fn build_sync(cfg: &AppConfig) -> Option<Arc<dyn SyncStatusSource>> {
    if !cfg.tools.sync_poll {
        return None;
    }
    let source = ArgocdStatusSource::locate(&cfg.tools.argocd_bin, cfg.tools.timeout())?;
    Some(Arc::new(source))
}
