use std::path::Path;

use crate::config::RulesConfig;
use crate::remote::{CheckOptions, RemoteProbe};
use crate::validate::{validate_application, validate_values, ValidationError, ValidationReport};
use crate::yaml::parse_documents;

/// Inputs for one edit validation pass.
pub struct EditChecks<'a> {
    pub rules: &'a RulesConfig,
    pub probe: Option<&'a dyn RemoteProbe>,
    pub remote: CheckOptions,
}

pub fn is_yaml_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
}

/// Run the edit pipeline over `content`.
///
/// `path` selects the checks by file name; `shown` is what diagnostics
/// print. A syntax error is reported alone.
pub async fn validate_edit(
    path: &Path,
    shown: &str,
    content: &str,
    checks: &EditChecks<'_>,
) -> ValidationReport {
    let mut report = ValidationReport::new();

    let docs = match parse_documents(content) {
        Ok(docs) => docs,
        Err(e) => {
            let line = e.location().map(|l| l.line());
            report.push(ValidationError::error(shown, format!("Invalid YAML: {e}")).at_line(line));
            return report;
        }
    };

    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    if name.contains("application") {
        report.extend(
            validate_application(
                shown,
                content,
                &docs,
                &checks.rules.problematic_charts,
                checks.probe,
                checks.remote,
            )
            .await,
        );
    }

    if name.contains("values") {
        report.extend(validate_values(
            shown,
            content,
            &docs,
            &checks.rules.toleration_paths,
        ));
    }

    tracing::debug!(
        target: "opsgate.engine",
        file = shown,
        errors = report.errors().count(),
        warnings = report.warnings().count(),
        "edit validated"
    );
    report
}
