//! Reachability and version checks for the sources of an `Application`.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use regex::Regex;

use crate::error::RemoteError;
use crate::repo::AppSource;
use crate::validate::ValidationError;
use crate::yaml::line_of;

use super::probe::{ProbeResponse, RemoteProbe};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Ssh,
    Oci,
    ChartRepo,
    Git,
}

impl SourceKind {
    pub fn of(source: &AppSource) -> Self {
        let url = source.repo_url.as_str();
        if url.starts_with("git@") || url.starts_with("ssh://") {
            SourceKind::Ssh
        } else if url.starts_with("oci://") {
            SourceKind::Oci
        } else if source.chart.is_some() {
            SourceKind::ChartRepo
        } else {
            SourceKind::Git
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CheckOptions {
    pub timeout: Duration,
    pub max_concurrency: usize,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            max_concurrency: 4,
        }
    }
}

/// `oci://<host>/<path>`; returns what is missing.
pub fn check_oci_format(url: &str) -> Result<(), &'static str> {
    let rest = url.strip_prefix("oci://").ok_or("the oci:// scheme")?;
    let mut parts = rest.splitn(2, '/');
    let host = parts.next().unwrap_or("");
    if host.is_empty() {
        return Err("a registry host");
    }
    let path = parts.next().unwrap_or("").trim_matches('/');
    if path.is_empty() {
        return Err("a repository path");
    }
    Ok(())
}

pub fn index_url(repo_url: &str) -> String {
    format!("{}/index.yaml", repo_url.trim_end_matches('/'))
}

pub fn git_refs_url(repo_url: &str) -> String {
    format!(
        "{}/info/refs?service=git-upload-pack",
        repo_url.trim_end_matches('/')
    )
}

/// Token containment test against a chart index body.
pub fn index_has_version(index: &str, version: &str) -> bool {
    let pattern = format!(
        r#"(?m)^\s*(?:-\s*)?version:\s*["']?{}["']?\s*$"#,
        regex::escape(version)
    );
    Regex::new(&pattern)
        .map(|re| re.is_match(index))
        .unwrap_or(false)
}

/// Check every non-SSH source. Results keep source declaration order.
///
/// With no probe only the offline OCI format check runs.
pub async fn check_sources(
    probe: Option<&dyn RemoteProbe>,
    sources: &[AppSource],
    file: &str,
    content: &str,
    opts: CheckOptions,
) -> Vec<ValidationError> {
    let per_source: Vec<Vec<ValidationError>> = stream::iter(sources)
        .map(|source| check_source(probe, source, file, content, opts.timeout))
        .buffered(opts.max_concurrency.max(1))
        .collect()
        .await;
    per_source.into_iter().flatten().collect()
}

pub async fn check_source(
    probe: Option<&dyn RemoteProbe>,
    source: &AppSource,
    file: &str,
    content: &str,
    timeout: Duration,
) -> Vec<ValidationError> {
    let line = line_of(content, &source.repo_url);
    let url = source.repo_url.as_str();

    match SourceKind::of(source) {
        SourceKind::Ssh => Vec::new(),
        SourceKind::Oci => match check_oci_format(url) {
            Ok(()) => Vec::new(),
            Err(missing) => vec![ValidationError::error(
                file,
                format!("Malformed OCI repository `{url}`: missing {missing}"),
            )
            .at_line(line)
            .with_fix("Use the form oci://<registry-host>/<repository-path>")],
        },
        SourceKind::ChartRepo => {
            let Some(probe) = probe else {
                return Vec::new();
            };
            let index = index_url(url);
            match fetch(probe, &index, timeout).await {
                Ok(resp) if resp.status == 404 => vec![ValidationError::error(
                    file,
                    format!("Chart repository index not found: {index} (HTTP 404)"),
                )
                .at_line(line)
                .with_fix("Check repoURL; classic Helm repositories serve index.yaml at their root")],
                Ok(resp) if resp.is_success() => check_version(source, &resp, file, content),
                Ok(resp) => vec![could_not_verify(file, line, url, &format!("HTTP {}", resp.status))],
                Err(e) => vec![could_not_verify(file, line, url, &e.to_string())],
            }
        }
        SourceKind::Git => {
            let Some(probe) = probe else {
                return Vec::new();
            };
            match fetch(probe, &git_refs_url(url), timeout).await {
                Ok(resp) if resp.status == 404 => vec![ValidationError::error(
                    file,
                    format!("Git repository not found: {url} (HTTP 404)"),
                )
                .at_line(line)
                .with_fix("Check repoURL for typos")],
                Ok(resp) if resp.is_success() => Vec::new(),
                Ok(resp) if resp.status == 401 || resp.status == 403 => vec![could_not_verify(
                    file,
                    line,
                    url,
                    &format!("HTTP {}, repository may be private", resp.status),
                )],
                Ok(resp) => vec![could_not_verify(file, line, url, &format!("HTTP {}", resp.status))],
                Err(e) => vec![could_not_verify(file, line, url, &e.to_string())],
            }
        }
    }
}

async fn fetch(
    probe: &dyn RemoteProbe,
    url: &str,
    timeout: Duration,
) -> Result<ProbeResponse, RemoteError> {
    tracing::debug!(target: "opsgate.remote", probe = probe.name(), url, "probe");
    match tokio::time::timeout(timeout, probe.get(url)).await {
        Ok(res) => res,
        Err(_) => Err(RemoteError::Timeout(timeout.as_millis() as u64)),
    }
}

fn check_version(
    source: &AppSource,
    index: &ProbeResponse,
    file: &str,
    content: &str,
) -> Vec<ValidationError> {
    let Some(chart) = source.chart_ref() else {
        return Vec::new();
    };
    if !chart.is_pinned() || index_has_version(&index.body, &chart.version) {
        return Vec::new();
    }
    vec![ValidationError::error(
        file,
        format!(
            "Chart `{}` version `{}` not found in {}",
            chart.chart,
            chart.version,
            index_url(&chart.repo_url)
        ),
    )
    .at_line(line_of(content, &source.repo_url))
    .with_fix(format!("Run `helm search repo {} --versions` and pin an existing version", chart.chart))]
}

fn could_not_verify(file: &str, line: Option<usize>, url: &str, why: &str) -> ValidationError {
    ValidationError::warning(file, format!("Could not verify `{url}`: {why}")).at_line(line)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::validate::Severity;

    #[derive(Default)]
    struct StubProbe {
        routes: HashMap<String, ProbeResponse>,
        delays: HashMap<String, Duration>,
        calls: AtomicUsize,
    }

    impl StubProbe {
        fn route(mut self, url: &str, status: u16, body: &str) -> Self {
            self.routes.insert(url.to_string(), ProbeResponse::new(status, body));
            self
        }

        fn delay(mut self, url: &str, d: Duration) -> Self {
            self.delays.insert(url.to_string(), d);
            self
        }
    }

    #[async_trait]
    impl RemoteProbe for StubProbe {
        fn name(&self) -> &str {
            "stub"
        }

        async fn get(&self, url: &str) -> Result<ProbeResponse, RemoteError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(d) = self.delays.get(url) {
                tokio::time::sleep(*d).await;
            }
            self.routes
                .get(url)
                .cloned()
                .ok_or_else(|| RemoteError::Transport(anyhow::anyhow!("connection refused")))
        }
    }

    fn chart(url: &str, name: &str, version: &str) -> AppSource {
        AppSource {
            repo_url: url.to_string(),
            chart: Some(name.to_string()),
            target_revision: Some(version.to_string()),
            path: None,
            value_files: Vec::new(),
        }
    }

    fn git(url: &str) -> AppSource {
        AppSource {
            repo_url: url.to_string(),
            chart: None,
            target_revision: Some("HEAD".into()),
            path: Some("apps/x".into()),
            value_files: Vec::new(),
        }
    }

    const INDEX: &str = "apiVersion: v1\nentries:\n  redis:\n    - name: redis\n      version: 18.1.0\n    - name: redis\n      version: \"17.9.2\"\n";

    #[test]
    fn oci_format_requires_host_and_path() {
        assert!(check_oci_format("oci://registry-1.docker.io/bitnamicharts").is_ok());
        assert_eq!(check_oci_format("oci://registry-1.docker.io"), Err("a repository path"));
        assert_eq!(check_oci_format("oci://registry-1.docker.io/"), Err("a repository path"));
        assert_eq!(check_oci_format("oci:///charts"), Err("a registry host"));
    }

    #[test]
    fn version_match_is_token_based() {
        assert!(index_has_version(INDEX, "18.1.0"));
        assert!(index_has_version(INDEX, "17.9.2"));
        assert!(!index_has_version(INDEX, "18.1"));
        assert!(!index_has_version(INDEX, "8.1.0"));
    }

    #[test]
    fn source_kinds() {
        assert_eq!(SourceKind::of(&git("git@github.com:o/r.git")), SourceKind::Ssh);
        assert_eq!(SourceKind::of(&git("ssh://git@host/r")), SourceKind::Ssh);
        assert_eq!(SourceKind::of(&chart("oci://r.io/c", "c", "1")), SourceKind::Oci);
        assert_eq!(SourceKind::of(&chart("https://charts.io", "c", "1")), SourceKind::ChartRepo);
        assert_eq!(SourceKind::of(&git("https://github.com/o/r")), SourceKind::Git);
    }

    #[tokio::test]
    async fn malformed_oci_is_one_error_without_network() {
        let probe = StubProbe::default();
        let sources = vec![chart("oci://ghcr.io", "app", "1.0.0")];
        let content = "spec:\n  source:\n    repoURL: oci://ghcr.io\n";
        let out = check_sources(Some(&probe), &sources, "a.yaml", content, CheckOptions::default()).await;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].severity, Severity::Error);
        assert_eq!(out[0].line, Some(3));
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_index_is_an_error_and_missing_version_too() {
        let probe = StubProbe::default()
            .route("https://gone.example/index.yaml", 404, "")
            .route("https://charts.example/index.yaml", 200, INDEX);
        let sources = vec![
            chart("https://gone.example", "a", "1.0.0"),
            chart("https://charts.example/", "redis", "99.0.0"),
            chart("https://charts.example", "redis", "18.1.0"),
            chart("https://charts.example", "redis", "latest"),
        ];
        let out = check_sources(Some(&probe), &sources, "a.yaml", "", CheckOptions::default()).await;
        assert_eq!(out.len(), 2);
        assert!(out[0].message.contains("HTTP 404"));
        assert!(out[1].message.contains("99.0.0"));
        assert!(out.iter().all(ValidationError::is_error));
    }

    #[tokio::test]
    async fn transport_failures_and_timeouts_only_warn() {
        let slow = "https://slow.example/index.yaml";
        let probe = StubProbe::default()
            .route(slow, 200, INDEX)
            .delay(slow, Duration::from_secs(2))
            .route("https://flaky.example/index.yaml", 503, "");
        let sources = vec![
            chart("https://slow.example", "redis", "18.1.0"),
            chart("https://unreachable.example", "x", "1.0.0"),
            chart("https://flaky.example", "x", "1.0.0"),
        ];
        let opts = CheckOptions {
            timeout: Duration::from_millis(50),
            max_concurrency: 4,
        };
        let out = check_sources(Some(&probe), &sources, "a.yaml", "", opts).await;
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|e| e.severity == Severity::Warning));
        assert!(out.iter().all(|e| e.message.starts_with("Could not verify")));
        assert!(out[0].message.contains("slow.example"));
        assert!(out[1].message.contains("unreachable.example"));
        assert!(out[2].message.contains("HTTP 503"));
    }

    #[tokio::test]
    async fn git_sources_use_smart_http_refs() {
        let probe = StubProbe::default()
            .route("https://github.com/o/ok/info/refs?service=git-upload-pack", 200, "")
            .route("https://github.com/o/missing/info/refs?service=git-upload-pack", 404, "")
            .route("https://github.com/o/private/info/refs?service=git-upload-pack", 401, "");
        let sources = vec![
            git("https://github.com/o/ok"),
            git("https://github.com/o/missing"),
            git("https://github.com/o/private"),
            git("git@github.com:o/ssh.git"),
        ];
        let out = check_sources(Some(&probe), &sources, "a.yaml", "", CheckOptions::default()).await;
        assert_eq!(out.len(), 2);
        assert!(out[0].is_error());
        assert!(!out[1].is_error());
        assert_eq!(probe.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn without_a_probe_only_offline_checks_run() {
        let sources = vec![chart("https://gone.example", "a", "1"), chart("oci://", "a", "1")];
        let out = check_sources(None, &sources, "a.yaml", "", CheckOptions::default()).await;
        assert_eq!(out.len(), 1);
        assert!(out[0].message.contains("registry host"));
    }
}
