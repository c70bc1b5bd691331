use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeRole {
    ControlPlane,
    Worker,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub name: String,
    pub ip: String,
    pub role: NodeRole,
}

/// Sentinel versions that skip the version-existence check.
pub const VERSION_SENTINELS: [&str; 3] = ["HEAD", "latest", "*"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartRef {
    pub repo_url: String,
    pub chart: String,
    pub version: String,
}

impl ChartRef {
    pub fn is_pinned(&self) -> bool {
        !self.version.is_empty() && !VERSION_SENTINELS.contains(&self.version.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PsaLevel {
    Privileged,
    Baseline,
    Restricted,
}

impl PsaLevel {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "privileged" => Some(PsaLevel::Privileged),
            "baseline" => Some(PsaLevel::Baseline),
            "restricted" => Some(PsaLevel::Restricted),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppDefinition {
    pub name: String,
    pub namespace: Option<String>,
    pub chart: Option<ChartRef>,
    pub values_file: Option<PathBuf>,
    pub has_tolerations: bool,
    pub psa_level: Option<PsaLevel>,
    pub ignore_differences_present: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterContext {
    pub name: Option<String>,
    pub control_endpoint: Option<String>,
    pub nodes: Vec<Node>,
    pub domain: Option<String>,
    pub apps: BTreeMap<String, AppDefinition>,
    pub repo_root: PathBuf,
}

impl ClusterContext {
    pub fn app(&self, name: &str) -> Option<&AppDefinition> {
        self.apps.get(name)
    }
}
