use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_state_file")]
    pub state_file: String,

    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default)]
    pub rules: RulesConfig,

    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub audit: AuditConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Session state path with `~` expanded.
    pub fn state_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.state_file).into_owned())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

fn default_state_file() -> String {
    std::env::temp_dir()
        .join("opsgate-session.json")
        .to_string_lossy()
        .into_owned()
}

fn default_cache_ttl_secs() -> u64 {
    30
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            state_file: default_state_file(),
            cache_ttl_secs: default_cache_ttl_secs(),
            remote: RemoteConfig::default(),
            rules: RulesConfig::default(),
            tools: ToolsConfig::default(),
            audit: AuditConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default = "default_remote_enabled")]
    pub enabled: bool,

    #[serde(default = "default_remote_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

impl RemoteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_remote_enabled() -> bool {
    true
}

fn default_remote_timeout_ms() -> u64 {
    5_000
}

fn default_max_concurrency() -> usize {
    4
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: default_remote_enabled(),
            timeout_ms: default_remote_timeout_ms(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Chart name substrings that are known to drift without `ignoreDifferences`.
    #[serde(default = "default_problematic_charts")]
    pub problematic_charts: Vec<String>,

    /// Dotted paths inside values files that must tolerate the control-plane taint.
    #[serde(default = "default_toleration_paths")]
    pub toleration_paths: Vec<String>,
}

fn default_problematic_charts() -> Vec<String> {
    [
        "cilium",
        "cert-manager",
        "kube-prometheus-stack",
        "ingress-nginx",
        "longhorn",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_toleration_paths() -> Vec<String> {
    [
        "tolerations",
        "controller.tolerations",
        "server.tolerations",
        "operator.tolerations",
        "agent.tolerations",
        "daemonset.tolerations",
        "webhook.tolerations",
        "cainjector.tolerations",
        "prometheus.prometheusSpec.tolerations",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            problematic_charts: default_problematic_charts(),
            toleration_paths: default_toleration_paths(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_argocd_bin")]
    pub argocd_bin: String,

    #[serde(default = "default_tool_timeout_ms")]
    pub timeout_ms: u64,

    /// Poll the sync controller after `git push`.
    #[serde(default = "default_sync_poll")]
    pub sync_poll: bool,
}

impl ToolsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_argocd_bin() -> String {
    "argocd".to_string()
}

fn default_tool_timeout_ms() -> u64 {
    10_000
}

fn default_sync_poll() -> bool {
    true
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            argocd_bin: default_argocd_bin(),
            timeout_ms: default_tool_timeout_ms(),
            sync_poll: default_sync_poll(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuditConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Write logs to this file instead of stderr.
    #[serde(default)]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}
