//! `ServicesFactory` implementation: builds the session store, remote probe
//! and sync status source from configuration for the CLI.
use opsgate_core::api::{AppConfig, GateServices, ServicesFactory};

use crate::factory;

#[derive(Default)]
pub struct PluginServicesFactory;

impl ServicesFactory for PluginServicesFactory {
    fn build_services(&self, cfg: &AppConfig) -> anyhow::Result<GateServices> {
        let store = factory::build_store(cfg);
        let probe = factory::build_probe(cfg)?;
        let sync = factory::build_sync(cfg);
        tracing::debug!(
            target: "opsgate.services",
            store = store.name(),
            probe = ?probe.as_ref().map(|p| p.name()),
            sync = ?sync.as_ref().map(|s| s.name()),
            "services built"
        );
        Ok(GateServices { store, probe, sync })
    }
}
