use std::path::PathBuf;

use opsgate_core::api::{AppContext, Gate, HookInput, HookOutput, HookPhase, ServicesFactory};
use opsgate_plugins::services::PluginServicesFactory;

use crate::stdio::read_stdin_text;

/// Hook mode never fails: every internal error degrades to an allow.
pub async fn run(app: AppContext) -> HookOutput {
    let raw = match read_stdin_text() {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(target: "opsgate.hook", error = %e, "failed to read stdin, allowing");
            return HookOutput::fail_open(HookPhase::PreToolUse);
        }
    };
    let input = match HookInput::parse(&raw) {
        Ok(i) => i,
        Err(e) => {
            tracing::warn!(target: "opsgate.hook", error = %e, bytes = raw.len(), "malformed event, allowing");
            return HookOutput::fail_open(HookPhase::PreToolUse);
        }
    };

    let services = match PluginServicesFactory.build_services(app.cfg()) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(target: "opsgate.hook", error = %e, "failed to build services, allowing");
            return HookOutput::fail_open(input.phase());
        }
    };

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let gate = Gate::new(app, services);
    gate.handle(&input, &cwd).await.to_output()
}
