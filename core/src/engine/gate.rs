use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::json;

use crate::audit::AuditEvent;
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::decision::Decision;
use crate::hook::{GateEvent, HookInput, HookOutput, HookPhase};
use crate::remote::{CheckOptions, RemoteProbe};
use crate::session::SessionStore;
use crate::sync::{summarize, SyncStatusSource};
use crate::validate::ValidationReport;

use super::command::classify_command;
use super::edit::{is_yaml_path, validate_edit, EditChecks};
use super::rules::{default_rules, match_rules, CommandRule};

/// Backends the gate talks to. Built by a `ServicesFactory`.
pub struct GateServices {
    pub store: Arc<dyn SessionStore>,
    pub probe: Option<Arc<dyn RemoteProbe>>,
    pub sync: Option<Arc<dyn SyncStatusSource>>,
}

/// Builds [`GateServices`] from configuration; implemented outside the core.
pub trait ServicesFactory {
    fn build_services(&self, cfg: &AppConfig) -> anyhow::Result<GateServices>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub phase: HookPhase,
    pub decision: Decision,
    /// Advisory text attached to an allow.
    pub note: Option<String>,
}

impl Verdict {
    pub fn allow(phase: HookPhase) -> Self {
        Self {
            phase,
            decision: Decision::Allow,
            note: None,
        }
    }

    fn new(phase: HookPhase, decision: Decision) -> Self {
        Self {
            phase,
            decision,
            note: None,
        }
    }

    pub fn to_output(&self) -> HookOutput {
        HookOutput::new(self.phase, &self.decision).with_note(self.note.clone())
    }
}

pub struct Gate {
    ctx: AppContext,
    services: GateServices,
    rules: &'static [CommandRule],
}

impl Gate {
    pub fn new(ctx: AppContext, services: GateServices) -> Self {
        Self {
            ctx,
            services,
            rules: default_rules(),
        }
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    pub fn store(&self) -> &dyn SessionStore {
        self.services.store.as_ref()
    }

    /// Decide one event. `fallback_cwd` is used when the event has no `cwd`.
    pub async fn handle(&self, input: &HookInput, fallback_cwd: &Path) -> Verdict {
        let phase = input.phase();
        let cwd = input
            .cwd
            .as_deref()
            .filter(|c| !c.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| fallback_cwd.to_path_buf());

        let verdict = match input.classify() {
            GateEvent::Command { command } => match phase {
                HookPhase::PreToolUse => self.on_command(&command, &cwd),
                HookPhase::PostToolUse => self.after_command(&command, &cwd).await,
            },
            GateEvent::Edit { file_path, content } => match phase {
                HookPhase::PreToolUse => self.on_edit(&cwd.join(file_path), &content).await,
                HookPhase::PostToolUse => Verdict::allow(phase),
            },
            GateEvent::Other => Verdict::allow(phase),
        };

        tracing::info!(
            target: "opsgate.gate",
            tool = %input.tool_name,
            phase = phase.as_str(),
            decision = %verdict.decision.kind(),
            "decision"
        );
        self.record(input, &verdict).await;
        verdict
    }

    fn on_command(&self, command: &str, cwd: &Path) -> Verdict {
        let phase = HookPhase::PreToolUse;
        if self.ctx.detector().detect(cwd).is_none() {
            return Verdict::allow(phase);
        }

        let store = self.store();
        let mut state = store.load();
        let decision = classify_command(self.rules, &mut state, command, self.ctx.bootstrap());
        if let Err(e) = store.save(&state) {
            tracing::warn!(target: "opsgate.session", store = store.name(), error = %e, "failed to persist session state");
        }
        Verdict::new(phase, decision)
    }

    async fn after_command(&self, command: &str, cwd: &Path) -> Verdict {
        let mut verdict = Verdict::allow(HookPhase::PostToolUse);
        let pushed = match_rules(self.rules, command).is_some_and(|m| m.rule.name == "git-push");
        if !pushed || !self.ctx.cfg().tools.sync_poll {
            return verdict;
        }
        if self.ctx.detector().detect(cwd).is_none() {
            return verdict;
        }
        let Some(source) = self.services.sync.as_ref() else {
            return verdict;
        };
        match source.app_statuses().await {
            Ok(apps) => verdict.note = summarize(&apps),
            Err(e) => {
                tracing::debug!(target: "opsgate.sync", source = source.name(), error = %e, "sync status unavailable");
            }
        }
        verdict
    }

    async fn on_edit(&self, path: &Path, content: &str) -> Verdict {
        let phase = HookPhase::PreToolUse;
        if !is_yaml_path(path) {
            return Verdict::allow(phase);
        }
        let start = path.parent().unwrap_or(path);
        let Some(ctx) = self.ctx.detector().detect(start) else {
            return Verdict::allow(phase);
        };

        let display = display_path(&ctx.repo_root, path);
        let report = self.run_checks(path, &display, content).await;
        Verdict::new(phase, report.to_decision())
    }

    /// Edit pipeline over an arbitrary file, inside a repository or not.
    pub async fn validate_file(&self, path: &Path, content: &str) -> ValidationReport {
        let start = path.parent().unwrap_or(path);
        let display = match self.ctx.detector().detect(start) {
            Some(ctx) => display_path(&ctx.repo_root, path),
            None => path.display().to_string(),
        };
        self.run_checks(path, &display, content).await
    }

    async fn run_checks(&self, path: &Path, display: &str, content: &str) -> ValidationReport {
        let cfg = self.ctx.cfg();
        let probe = if cfg.remote.enabled {
            self.services.probe.as_deref()
        } else {
            None
        };
        let checks = EditChecks {
            rules: &cfg.rules,
            probe,
            remote: CheckOptions {
                timeout: cfg.remote.timeout(),
                max_concurrency: cfg.remote.max_concurrency,
            },
        };
        validate_edit(path, display, content, &checks).await
    }

    async fn record(&self, input: &HookInput, verdict: &Verdict) {
        let Some(audit) = self.ctx.audit() else {
            return;
        };
        let event = AuditEvent::new(
            "gate.decision",
            json!({
                "tool": input.tool_name,
                "hook_event": verdict.phase.as_str(),
                "decision": verdict.decision.kind(),
                "reason": verdict.decision.reason().or(verdict.note.as_deref()),
            }),
        );
        audit.record(&event).await;
    }
}

/// `path` relative to `root`, resolving symlinks in the part that exists.
fn display_path(root: &Path, path: &Path) -> String {
    let resolved = path
        .ancestors()
        .find_map(|anc| {
            let real = anc.canonicalize().ok()?;
            let rest = path.strip_prefix(anc).ok()?;
            Some(real.join(rest))
        })
        .unwrap_or_else(|| path.to_path_buf());
    resolved
        .strip_prefix(root)
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| path.display().to_string())
}
