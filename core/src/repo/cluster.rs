use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;

use crate::yaml::{parse_documents, str_at};

use super::model::{Node, NodeRole};
use super::root::CLUSTER_CONFIG_FILE;

lazy_static! {
    static ref IPV4_TOKEN: Regex =
        Regex::new(r"\b\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}\b").expect("static regex");
    static ref HOST_FIELD: Regex = Regex::new(
        r#"(?m)(?:host|hostname|domain|baseDomain|commonName)\s*:\s*["']?(\*\.)?([A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,})"#
    )
    .expect("static regex");
    static ref HOST_LIST_ITEM: Regex =
        Regex::new(r#"(?m)^\s*-\s*["']?(\*\.)([A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,})"#)
            .expect("static regex");
    static ref HOST_MATCHER: Regex = Regex::new(
        r"Host\(`(\*\.)?([A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,})`\)"
    )
    .expect("static regex");
}

/// Ingress-related files checked for a cluster domain, in priority order.
const DOMAIN_FILES: [&str; 3] = [
    "apps/traefik/values.yaml",
    "apps/ingress-nginx/values.yaml",
    "apps/cert-manager/values.yaml",
];
const DOMAIN_GLOBS: [&str; 2] = ["apps/*/manifests/*ingress*", "apps/*/manifests/*certificate*"];

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ClusterConfig {
    pub name: Option<String>,
    pub endpoint: Option<String>,
}

/// Missing or unparseable config leaves both fields empty.
pub fn read_cluster_config(root: &Path) -> ClusterConfig {
    let path = root.join(CLUSTER_CONFIG_FILE);
    let Ok(content) = std::fs::read_to_string(&path) else {
        return ClusterConfig::default();
    };
    let docs = match parse_documents(&content) {
        Ok(d) => d,
        Err(e) => {
            tracing::debug!(target: "opsgate.repo", path = %path.display(), error = %e, "cluster config unparseable");
            return ClusterConfig::default();
        }
    };
    let Some(doc) = docs.first() else {
        return ClusterConfig::default();
    };
    ClusterConfig {
        name: str_at(doc, "clusterName").map(String::from),
        endpoint: str_at(doc, "endpoint").map(String::from),
    }
}

/// Nodes from `clusters/*/patches/*`; files without an IPv4 token are skipped.
pub fn discover_nodes(root: &Path) -> Vec<Node> {
    glob_files(root, "clusters/*/patches/*")
        .into_iter()
        .filter_map(|path| node_from_patch(&path))
        .collect()
}

fn node_from_patch(path: &Path) -> Option<Node> {
    let content = std::fs::read_to_string(path).ok()?;
    let ip = first_ipv4(&content)?;
    let name = path.file_stem()?.to_string_lossy().into_owned();
    let role = if content.contains("control-plane") {
        NodeRole::ControlPlane
    } else {
        NodeRole::Worker
    };
    Some(Node { name, ip, role })
}

fn first_ipv4(content: &str) -> Option<String> {
    IPV4_TOKEN
        .find_iter(content)
        .find(|m| m.as_str().parse::<Ipv4Addr>().is_ok())
        .map(|m| m.as_str().to_string())
}

/// Best-effort cluster domain from well-known ingress configuration.
pub fn infer_domain(root: &Path) -> Option<String> {
    let fixed = DOMAIN_FILES.iter().map(|rel| root.join(rel));
    let globbed = DOMAIN_GLOBS.iter().flat_map(|pat| glob_files(root, pat));
    fixed
        .chain(globbed)
        .filter_map(|p| std::fs::read_to_string(p).ok())
        .find_map(|content| domain_from_text(&content))
}

pub(crate) fn domain_from_text(content: &str) -> Option<String> {
    let caps = HOST_LIST_ITEM
        .captures(content)
        .or_else(|| HOST_MATCHER.captures(content))
        .or_else(|| HOST_FIELD.captures(content))?;
    let host = caps.get(2)?.as_str().to_ascii_lowercase();
    if caps.get(1).is_some() {
        return Some(host);
    }
    // `grafana.lab.example.com` -> `lab.example.com`
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() >= 3 {
        Some(labels[1..].join("."))
    } else {
        Some(host)
    }
}

fn glob_files(root: &Path, pattern: &str) -> Vec<PathBuf> {
    let full = format!("{}/{}", glob::Pattern::escape(&root.to_string_lossy()), pattern);
    match glob::glob(&full) {
        Ok(paths) => paths.filter_map(Result::ok).filter(|p| p.is_file()).collect(),
        Err(e) => {
            tracing::debug!(target: "opsgate.repo", pattern = %full, error = %e, "invalid glob");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn write(root: &Path, rel: &str, content: &str) {
        let p = root.join(rel);
        std::fs::create_dir_all(p.parent().unwrap()).unwrap();
        std::fs::write(p, content).unwrap();
    }

    #[test]
    fn reads_cluster_name_and_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "talconfig.yaml",
            "clusterName: homelab\nendpoint: https://10.0.0.10:6443\n",
        );
        let cfg = read_cluster_config(dir.path());
        assert_eq!(cfg.name.as_deref(), Some("homelab"));
        assert_eq!(cfg.endpoint.as_deref(), Some("https://10.0.0.10:6443"));
    }

    #[test]
    fn broken_cluster_config_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "talconfig.yaml", "clusterName: [unclosed\n");
        assert_eq!(read_cluster_config(dir.path()), ClusterConfig::default());
    }

    #[test]
    fn discovers_nodes_and_roles() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "clusters/lab/patches/cp-1.yaml",
            "machine:\n  nodeLabels:\n    node-role.kubernetes.io/control-plane: \"\"\n  network:\n    interfaces:\n      - addresses: [192.168.1.10/24]\n",
        );
        write(
            dir.path(),
            "clusters/lab/patches/worker-1.yaml",
            "machine:\n  network:\n    interfaces:\n      - addresses: [192.168.1.20/24]\n",
        );
        write(dir.path(), "clusters/lab/patches/common.yaml", "cluster:\n  allowSchedulingOnControlPlanes: true\n");

        let nodes = discover_nodes(dir.path());
        assert_eq!(
            nodes,
            vec![
                Node {
                    name: "cp-1".into(),
                    ip: "192.168.1.10".into(),
                    role: NodeRole::ControlPlane,
                },
                Node {
                    name: "worker-1".into(),
                    ip: "192.168.1.20".into(),
                    role: NodeRole::Worker,
                },
            ]
        );
    }

    #[test]
    fn first_ipv4_skips_out_of_range_tokens() {
        assert_eq!(first_ipv4("999.1.1.1 then 10.1.2.3"), Some("10.1.2.3".into()));
        assert_eq!(first_ipv4("no address here"), None);
    }

    #[test]
    fn domain_from_wildcard_and_host_fields() {
        assert_eq!(
            domain_from_text("tls:\n  domains:\n    - \"*.lab.example.com\"\n"),
            Some("lab.example.com".into())
        );
        assert_eq!(
            domain_from_text("ingress:\n  hostname: grafana.lab.example.com\n"),
            Some("lab.example.com".into())
        );
        assert_eq!(
            domain_from_text("match: Host(`example.org`)\n"),
            Some("example.org".into())
        );
        assert_eq!(domain_from_text("address: 10.0.0.1\n"), None);
    }

    #[test]
    fn infer_domain_reads_ingress_values() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "apps/traefik/values.yaml",
            "ports:\n  websecure:\n    tls:\n      domains:\n        - main: example.net\n          sans:\n            - \"*.example.net\"\n",
        );
        assert_eq!(infer_domain(dir.path()), Some("example.net".into()));
    }
}
