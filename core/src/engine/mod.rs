//! Event classification: command rules, the edit pipeline and the gate
//! that drives both against the session store and the context detector.

mod command;
mod edit;
mod gate;
mod rules;

pub use command::{classify_command, BOOTSTRAP_HINT};
pub use edit::{is_yaml_path, validate_edit, EditChecks};
pub use gate::{Gate, GateServices, ServicesFactory, Verdict};
pub use rules::{default_rules, match_rules, CommandRule, RuleAction, RuleMatch};
