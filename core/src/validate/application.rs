use serde_yaml::Value;

use crate::remote::{check_sources, CheckOptions, RemoteProbe};
use crate::repo::ApplicationManifest;
use crate::yaml::line_of;

use super::types::ValidationError;

/// Checks for an `Application` manifest: source reachability, then the
/// `ignoreDifferences` hint for charts known to drift.
pub async fn validate_application(
    file: &str,
    content: &str,
    docs: &[Value],
    problematic_charts: &[String],
    probe: Option<&dyn RemoteProbe>,
    opts: CheckOptions,
) -> Vec<ValidationError> {
    let Some(app) = ApplicationManifest::from_documents(docs, content) else {
        return Vec::new();
    };

    let mut out = check_sources(probe, &app.sources, file, content, opts).await;
    out.extend(check_ignore_differences(file, content, &app, problematic_charts));
    out
}

pub fn check_ignore_differences(
    file: &str,
    content: &str,
    app: &ApplicationManifest,
    problematic_charts: &[String],
) -> Option<ValidationError> {
    if app.ignore_differences_present {
        return None;
    }
    let (chart, marker) = app.sources.iter().find_map(|s| {
        let chart = s.chart.as_deref()?;
        let marker = problematic_charts
            .iter()
            .find(|p| !p.is_empty() && chart.contains(p.as_str()))?;
        Some((chart, marker))
    })?;

    Some(
        ValidationError::warning(
            file,
            format!(
                "Chart `{chart}` is known to report permanent OutOfSync ({marker} mutates its own resources) and no ignoreDifferences is set"
            ),
        )
        .at_line(line_of(content, &format!("chart: {chart}")).or_else(|| line_of(content, chart)))
        .with_fix("Add spec.ignoreDifferences for the fields the chart's controllers rewrite"),
    )
}
