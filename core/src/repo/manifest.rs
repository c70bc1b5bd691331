//! Field extraction for Argo CD `Application` documents.

use lazy_static::lazy_static;
use regex::Regex;
use serde_yaml::Value;

use crate::yaml::{lookup, str_at};

use super::model::ChartRef;

lazy_static! {
    static ref NUMERIC_REVISION: Regex =
        Regex::new(r"(?m)^[\s-]*targetRevision:\s*([0-9][0-9.]*)\s*(?:#.*)?$").expect("static regex");
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSource {
    pub repo_url: String,
    pub chart: Option<String>,
    pub target_revision: Option<String>,
    pub path: Option<String>,
    pub value_files: Vec<String>,
}

impl AppSource {
    fn from_value(v: &Value, raw_revisions: &[&str]) -> Option<Self> {
        let repo_url = str_at(v, "repoURL")?.trim().to_string();
        if repo_url.is_empty() {
            return None;
        }
        let value_files = lookup(v, "helm.valueFiles")
            .and_then(Value::as_sequence)
            .map(|seq| {
                seq.iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();
        Some(Self {
            repo_url,
            chart: str_at(v, "chart").map(String::from),
            target_revision: revision_string(v.get("targetRevision"), raw_revisions),
            path: str_at(v, "path").map(String::from),
            value_files,
        })
    }

    pub fn chart_ref(&self) -> Option<ChartRef> {
        let chart = self.chart.as_ref()?;
        Some(ChartRef {
            repo_url: self.repo_url.clone(),
            chart: chart.clone(),
            version: self.target_revision.clone().unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationManifest {
    pub name: Option<String>,
    pub namespace: Option<String>,
    pub sources: Vec<AppSource>,
    pub ignore_differences_present: bool,
}

impl ApplicationManifest {
    /// `None` unless the document is `kind: Application`.
    ///
    /// `raw_revisions` are the unquoted numeric `targetRevision` tokens as
    /// written in the source text.
    fn from_value(doc: &Value, raw_revisions: &[&str]) -> Option<Self> {
        if str_at(doc, "kind") != Some("Application") {
            return None;
        }

        // Both the singular and the multi-source form are accepted; a manifest
        // carrying both contributes all of them.
        let mut sources = Vec::new();
        if let Some(s) = lookup(doc, "spec.source").and_then(|v| AppSource::from_value(v, raw_revisions)) {
            sources.push(s);
        }
        if let Some(seq) = lookup(doc, "spec.sources").and_then(Value::as_sequence) {
            sources.extend(seq.iter().filter_map(|v| AppSource::from_value(v, raw_revisions)));
        }

        let ignore_differences_present = lookup(doc, "spec.ignoreDifferences")
            .and_then(Value::as_sequence)
            .is_some_and(|seq| !seq.is_empty());

        Some(Self {
            name: str_at(doc, "metadata.name").map(String::from),
            namespace: str_at(doc, "spec.destination.namespace").map(String::from),
            sources,
            ignore_differences_present,
        })
    }

    /// First `Application` among `docs`, parsed from `content`.
    pub fn from_documents(docs: &[Value], content: &str) -> Option<Self> {
        let raw: Vec<&str> = NUMERIC_REVISION
            .captures_iter(content)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str())
            .collect();
        docs.iter().find_map(|d| Self::from_value(d, &raw))
    }

    /// First source that names a chart.
    pub fn chart_ref(&self) -> Option<ChartRef> {
        self.sources.iter().find_map(AppSource::chart_ref)
    }
}

// `targetRevision: 1.10` parses as the float 1.1; recover the written token.
fn revision_string(v: Option<&Value>, raw_revisions: &[&str]) -> Option<String> {
    match v? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => {
            let written = n.as_f64().and_then(|f| {
                raw_revisions
                    .iter()
                    .find(|t| t.parse::<f64>().ok() == Some(f))
            });
            Some(written.map_or_else(|| n.to_string(), |t| t.to_string()))
        }
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
