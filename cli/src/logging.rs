use std::path::Path;

use opsgate_core::api::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Logs go to stderr (stdout carries the decision) or, with `logging.file`,
/// to that file. `RUST_LOG` overrides the configured level.
pub fn init(cfg: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cfg.level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    if let Some(file) = cfg.file.as_deref().filter(|f| !f.trim().is_empty()) {
        let path = std::path::PathBuf::from(shellexpand::tilde(file).into_owned());
        match open_append(&path) {
            Ok(f) => {
                let (writer, guard) = tracing_appender::non_blocking(f);
                tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_target(true)
                    .init();
                return Some(guard);
            }
            Err(e) => eprintln!("opsgate: cannot open log file {}: {e}", path.display()),
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
    None
}

fn open_append(path: &Path) -> std::io::Result<std::fs::File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::OpenOptions::new().create(true).append(true).open(path)
}
