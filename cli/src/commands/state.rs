use opsgate_core::api::{AppConfig, CliError, SessionStore};
use opsgate_plugins::session::FileSessionStore;

use super::cli::StateAction;

pub fn run(cfg: &AppConfig, action: StateAction) -> Result<(), CliError> {
    let store = FileSessionStore::new(cfg.state_path());
    match action {
        StateAction::Show => {
            let state = store.load();
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
        StateAction::Reset => {
            store.reset()?;
            eprintln!("session state reset: {}", store.path().display());
        }
    }
    Ok(())
}
