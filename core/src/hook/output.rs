use serde::Serialize;

use crate::decision::{Decision, DecisionKind};

use super::input::HookPhase;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookOutput {
    pub hook_specific_output: HookSpecificOutput,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookSpecificOutput {
    pub hook_event_name: &'static str,
    pub permission_decision: DecisionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission_decision_reason: Option<String>,
}

impl HookOutput {
    pub fn new(phase: HookPhase, decision: &Decision) -> Self {
        Self {
            hook_specific_output: HookSpecificOutput {
                hook_event_name: phase.as_str(),
                permission_decision: decision.kind(),
                permission_decision_reason: decision.reason().map(String::from),
            },
        }
    }

    /// Advisory text for an allow; never overrides a deny/ask reason.
    pub fn with_note(mut self, note: Option<String>) -> Self {
        let out = &mut self.hook_specific_output;
        if out.permission_decision_reason.is_none() {
            out.permission_decision_reason = note;
        }
        self
    }

    /// Used when the gate itself fails.
    pub fn fail_open(phase: HookPhase) -> Self {
        Self::new(phase, &Decision::Allow)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                r#"{{"hookSpecificOutput":{{"hookEventName":"{}","permissionDecision":"allow"}}}}"#,
                self.hook_specific_output.hook_event_name
            )
        })
    }
}
