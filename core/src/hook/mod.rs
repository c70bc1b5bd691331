//! Tool-use event wire format: JSON in on stdin, one decision out on stdout.

mod input;
mod output;

pub use input::{GateEvent, HookInput, HookPhase};
pub use output::{HookOutput, HookSpecificOutput};
