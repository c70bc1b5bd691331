//! Ordered command rule table. First match wins.

use lazy_static::lazy_static;
use regex::Regex;

/// What a matching rule does with the command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleAction {
    /// Direct cluster mutation: deny, or ask in bootstrap mode.
    Forbidden { label: &'static str },
    /// Rendering/linting: allow and remember the target.
    RecordValidated,
    /// Preview of a sync: allow and remember the target.
    RecordDiffed,
    /// Always ask; the reason depends on whether a diff was seen.
    ManualSync,
    Allow,
}

#[derive(Debug)]
pub struct CommandRule {
    pub name: &'static str,
    pattern: Regex,
    pub action: RuleAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch<'a> {
    pub rule: &'a CommandRule,
    /// First positional argument after the matched subcommand.
    pub target: Option<String>,
}

// Command position: start of input, after a shell separator, subshell opener
// or quote, then any run of wrappers (`sudo`, `env`, `watch`, `timeout 30`,
// `xargs`, `bash -c`) and VAR=value pairs. Wrapper flags may carry a numeric value.
const COMMAND_POSITION: &str = concat!(
    r#"(?:^|[;&|(`\n"']|\$\()\s*"#,
    r"(?:(?:sudo|env|exec|command|nohup|time|watch|xargs)(?:\s+-\S+(?:\s+\d\S*)?)*\s+",
    r"|timeout(?:\s+-\S+(?:\s+\d\S*)?)*\s+\d\S*\s+",
    r"|(?:bash|sh|zsh)\s+-c\s+",
    r"|[A-Za-z_][A-Za-z0-9_]*=\S*\s+)*",
    r"(?:[^\s;&|()`]*/)?",
);
const WORD_END: &str = r#"(?:\s|$|[;&|)`"'])"#;
// Global flags between `helm` and its subcommand, with an optional value.
const HELM_FLAGS: &str = r"(?:\s+-{1,2}\S+(?:\s+[^-\s]\S*)?)*";

fn rule(name: &'static str, tail: &str, action: RuleAction) -> CommandRule {
    let pattern = format!("{COMMAND_POSITION}{tail}{WORD_END}");
    CommandRule {
        name,
        pattern: Regex::new(&pattern).expect("static rule regex"),
        action,
    }
}

lazy_static! {
    static ref DEFAULT_RULES: Vec<CommandRule> = vec![
        rule(
            "kubectl",
            "kubectl",
            RuleAction::Forbidden { label: "kubectl" },
        ),
        rule(
            "helm-mutate",
            &format!(r"helm{HELM_FLAGS}\s+(?:install|upgrade|uninstall|rollback|delete)"),
            RuleAction::Forbidden { label: "helm install/upgrade" },
        ),
        rule(
            "helm-render",
            &format!(r"helm{HELM_FLAGS}\s+(?:template|lint)"),
            RuleAction::RecordValidated,
        ),
        rule("argocd-diff", r"argocd\s+app\s+diff", RuleAction::RecordDiffed),
        rule("argocd-sync", r"argocd\s+app\s+sync", RuleAction::ManualSync),
        rule("git-push", r"git\s+push", RuleAction::Allow),
    ];
}

pub fn default_rules() -> &'static [CommandRule] {
    &DEFAULT_RULES
}

impl CommandRule {
    pub fn match_command(&self, command: &str) -> Option<RuleMatch<'_>> {
        let m = self.pattern.find(command)?;
        Some(RuleMatch {
            rule: self,
            target: first_positional(&command[m.end()..]),
        })
    }
}

impl PartialEq for CommandRule {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for CommandRule {}

pub fn match_rules<'a>(rules: &'a [CommandRule], command: &str) -> Option<RuleMatch<'a>> {
    rules.iter().find_map(|r| r.match_command(command))
}

/// First token that is not a flag, stopping at the next shell separator.
fn first_positional(rest: &str) -> Option<String> {
    rest.split_whitespace()
        .take_while(|t| !matches!(*t, ";" | "&&" | "||" | "|" | "&"))
        .find(|t| !t.starts_with('-'))
        .map(|t| {
            t.trim_end_matches([';', '&', '|', ')', '`'])
                .trim_matches(['"', '\''])
                .to_string()
        })
        .filter(|t| !t.is_empty())
}
