use std::path::{Path, PathBuf};

use opsgate_core::api::{AppContext, CliError, Gate, ServicesFactory, ValidationReport};
use opsgate_plugins::services::PluginServicesFactory;

pub fn context(app: &AppContext, dir: Option<PathBuf>) -> Result<(), CliError> {
    let dir = match dir {
        Some(d) => d,
        None => std::env::current_dir()?,
    };
    let ctx = app
        .detector()
        .detect(&dir)
        .ok_or_else(|| CliError::Command(format!("no repository found from {}", dir.display())))?;
    println!("{}", serde_json::to_string_pretty(&*ctx)?);
    Ok(())
}

/// Returns the process exit code: 1 when the report has errors.
pub async fn validate(app: AppContext, file: &Path) -> Result<i32, CliError> {
    let content = std::fs::read_to_string(file)?;
    let services = PluginServicesFactory
        .build_services(app.cfg())
        .map_err(|e| CliError::Command(format!("failed to build services: {e:#}")))?;
    let gate = Gate::new(app, services);
    let report = gate.validate_file(file, &content).await;
    print!("{}", render_report(&report));
    Ok(if report.has_errors() { 1 } else { 0 })
}

pub fn render_report(report: &ValidationReport) -> String {
    let mut out = String::new();
    for e in report.sorted() {
        out.push_str(&format!("{:<7} {}\n", e.severity.as_str(), e.render(true)));
    }
    out.push_str(&format!(
        "{} error(s), {} warning(s)\n",
        report.errors().count(),
        report.warnings().count()
    ));
    out
}
