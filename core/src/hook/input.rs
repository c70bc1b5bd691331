use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HookPhase {
    #[default]
    PreToolUse,
    PostToolUse,
}

impl HookPhase {
    pub fn parse(s: Option<&str>) -> Self {
        match s {
            Some("PostToolUse") => HookPhase::PostToolUse,
            _ => HookPhase::PreToolUse,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HookPhase::PreToolUse => "PreToolUse",
            HookPhase::PostToolUse => "PostToolUse",
        }
    }
}

/// One tool-use event as delivered on stdin.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HookInput {
    #[serde(default)]
    pub tool_name: String,
    #[serde(default)]
    pub tool_input: Value,
    #[serde(default)]
    pub hook_event_name: Option<String>,
    #[serde(default)]
    pub cwd: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateEvent {
    Command { command: String },
    Edit { file_path: String, content: String },
    Other,
}

impl HookInput {
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn phase(&self) -> HookPhase {
        HookPhase::parse(self.hook_event_name.as_deref())
    }

    /// Shape-based: `command` makes a command event, `file_path` plus
    /// `content`/`new_string` makes an edit. Anything else passes through.
    pub fn classify(&self) -> GateEvent {
        let field = |k: &str| self.tool_input.get(k).and_then(Value::as_str);

        if let Some(command) = field("command") {
            return GateEvent::Command {
                command: command.to_string(),
            };
        }
        if let Some(file_path) = field("file_path") {
            if let Some(content) = field("content").or_else(|| field("new_string")) {
                return GateEvent::Edit {
                    file_path: file_path.to_string(),
                    content: content.to_string(),
                };
            }
        }
        GateEvent::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_event() {
        let input = HookInput::parse(
            r#"{"tool_name":"Bash","tool_input":{"command":"kubectl get pods"},"hook_event_name":"PreToolUse"}"#,
        )
        .unwrap();
        assert_eq!(input.phase(), HookPhase::PreToolUse);
        assert_eq!(
            input.classify(),
            GateEvent::Command {
                command: "kubectl get pods".into()
            }
        );
    }

    #[test]
    fn edit_event_prefers_full_content() {
        let input = HookInput::parse(
            r#"{"tool_name":"Edit","tool_input":{"file_path":"/r/apps/a/values.yaml","new_string":"b","content":"a"}}"#,
        )
        .unwrap();
        assert_eq!(
            input.classify(),
            GateEvent::Edit {
                file_path: "/r/apps/a/values.yaml".into(),
                content: "a".into()
            }
        );
    }

    #[test]
    fn partial_or_unknown_shapes_pass_through() {
        let read = HookInput::parse(r#"{"tool_name":"Read","tool_input":{"file_path":"/x"}}"#).unwrap();
        assert_eq!(read.classify(), GateEvent::Other);

        let empty = HookInput::parse("{}").unwrap();
        assert_eq!(empty.classify(), GateEvent::Other);
        assert_eq!(empty.phase(), HookPhase::PreToolUse);
    }

    #[test]
    fn non_object_input_is_an_error() {
        assert!(HookInput::parse("[1,2]").is_err());
        assert!(HookInput::parse("not json").is_err());
    }

    #[test]
    fn post_tool_use_phase() {
        let input = HookInput::parse(r#"{"hook_event_name":"PostToolUse","tool_input":{"command":"git push"}}"#).unwrap();
        assert_eq!(input.phase(), HookPhase::PostToolUse);
    }
}
