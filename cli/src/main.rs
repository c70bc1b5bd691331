use clap::Parser;

mod commands;
mod logging;
mod stdio;

use commands::cli::{self, Commands};
use opsgate_core::api::{AppConfig, AppContext, CliError};
use opsgate_core::config::{bootstrap_from_env, load_default};

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let args = cli::Args::parse();

    // The gate must never block on its own configuration.
    let loaded = load_default();
    let cfg = loaded.as_ref().cloned().unwrap_or_else(|_| AppConfig::default());
    let guard = logging::init(&cfg.logging);
    if let Err(e) = &loaded {
        tracing::warn!(target: "opsgate.config", error = %e, "config not loaded, using defaults");
    }

    let app = AppContext::new(cfg, bootstrap_from_env());

    match args.command.unwrap_or(Commands::Hook) {
        Commands::Hook => {
            let out = commands::hook::run(app).await;
            println!("{}", out.to_json());
        }
        Commands::Context { dir } => commands::inspect::context(&app, dir)?,
        Commands::Validate { file } => {
            let code = commands::inspect::validate(app, &file).await?;
            if code != 0 {
                drop(guard);
                std::process::exit(code);
            }
        }
        Commands::State { action } => commands::state::run(app.cfg(), action)?,
    }
    Ok(())
}
