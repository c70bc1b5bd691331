use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "opsgate",
    version,
    about = "Gate cluster CLIs and manifest edits in a GitOps repository"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Read one tool-use event from stdin and print the decision (default).
    Hook,

    /// Print the detected repository context as JSON.
    Context {
        /// Directory to start the repository search from.
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Validate a manifest on disk; exits 1 when errors are found.
    Validate {
        file: PathBuf,
    },

    /// Inspect or clear the session state file.
    State {
        #[command(subcommand)]
        action: StateAction,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateAction {
    Show,
    Reset,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_hook() {
        let args = Args::try_parse_from(["opsgate"]).unwrap();
        assert!(args.command.is_none());
    }

    #[test]
    fn parses_subcommands() {
        let args = Args::try_parse_from(["opsgate", "context", "--dir", "/srv/infra"]).unwrap();
        assert!(matches!(
            args.command,
            Some(Commands::Context { dir: Some(ref d) }) if d == &PathBuf::from("/srv/infra")
        ));

        let args = Args::try_parse_from(["opsgate", "state", "reset"]).unwrap();
        assert!(matches!(
            args.command,
            Some(Commands::State {
                action: StateAction::Reset
            })
        ));

        assert!(Args::try_parse_from(["opsgate", "validate"]).is_err());
    }
}
