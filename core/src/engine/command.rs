use crate::decision::Decision;
use crate::session::SessionState;

use super::rules::{match_rules, CommandRule, RuleAction};

pub const BOOTSTRAP_HINT: &str = "OPSGATE_BOOTSTRAP=true";

/// Classify one command and apply its side effects to `state`.
///
/// Loop detection runs before the rule table, so a repeated command is
/// denied whatever it is.
pub fn classify_command(
    rules: &[CommandRule],
    state: &mut SessionState,
    command: &str,
    bootstrap: bool,
) -> Decision {
    if state.observe_command(command) {
        return Decision::Deny(format!(
            "Loop detected: `{command}` was repeated several times in a row. \
             Stop retrying and investigate the cause before running it again."
        ));
    }

    let Some(m) = match_rules(rules, command) else {
        return Decision::Allow;
    };

    match m.rule.action {
        RuleAction::Forbidden { label } => forbidden(label, bootstrap),
        RuleAction::RecordValidated => {
            if let Some(app) = &m.target {
                state.record_validated(app);
            }
            Decision::Allow
        }
        RuleAction::RecordDiffed => {
            if let Some(app) = &m.target {
                state.record_diffed(app);
            }
            Decision::Allow
        }
        RuleAction::ManualSync => manual_sync(state, m.target.as_deref()),
        RuleAction::Allow => Decision::Allow,
    }
}

fn forbidden(label: &str, bootstrap: bool) -> Decision {
    if bootstrap {
        return Decision::Ask(format!(
            "Bootstrap mode: `{label}` changes the cluster outside of GitOps. \
             Confirm this is part of the initial cluster setup."
        ));
    }
    Decision::Deny(format!(
        "{label} is blocked: the cluster is managed through GitOps. \
         Render with `helm template`, preview with `argocd app diff`, and deploy with `git push`. \
         For initial cluster bootstrap, set {BOOTSTRAP_HINT}."
    ))
}

fn manual_sync(state: &SessionState, target: Option<&str>) -> Decision {
    let app = target.unwrap_or("<app>");
    if target.is_some_and(|t| state.has_diffed(t)) {
        Decision::Ask(format!(
            "`{app}` was diffed. Prefer `git push` and let Argo CD reconcile; a manual sync bypasses the Git history. Sync anyway?"
        ))
    } else {
        Decision::Ask(format!(
            "No diff recorded for `{app}`. Run `argocd app diff {app}` first, or proceed with the sync without a preview?"
        ))
    }
}
