//! Convention checks for chart values files.

use lazy_static::lazy_static;
use regex::Regex;
use serde_yaml::Value;

use crate::yaml::{line_of_path, lookup};

use super::types::ValidationError;

const CONTROL_PLANE_TAINT: &str = "node-role.kubernetes.io/control-plane";

lazy_static! {
    static ref MASTER_KEY: Regex = Regex::new(r"^\s*master:").expect("static regex");
    static ref CPU_WHOLE_MILLIS: Regex =
        Regex::new(r#"^\s*cpu:\s*["']?([1-9][0-9]*)000m["']?\s*(?:#.*)?$"#).expect("static regex");
    static ref CPU_FRACTION: Regex =
        Regex::new(r#"^\s*cpu:\s*["']?([0-9]*\.[0-9]+)["']?\s*(?:#.*)?$"#).expect("static regex");
    static ref SECRET_KEY_NAME: Regex = Regex::new(
        r#"^\s*([A-Za-z]*(?:PasswordKey|SecretKey|secretKey))\s*:\s*["']?([A-Za-z0-9]+(?:_[A-Za-z0-9]+)+)["']?\s*$"#
    )
    .expect("static regex");
    static ref HOST_NETWORK_TRUE: Regex =
        Regex::new(r"^[^#]*\bhostNetwork:\s*true\b").expect("static regex");
}

/// All values-file checks, in a stable order.
pub fn validate_values(
    file: &str,
    content: &str,
    docs: &[Value],
    toleration_paths: &[String],
) -> Vec<ValidationError> {
    let mut out = check_tolerations(file, content, docs, toleration_paths);
    out.extend(scan_line_rules(file, content));
    out.extend(check_host_network(file, content));
    out
}

/// A toleration path that exists must tolerate the control-plane taint.
fn check_tolerations(
    file: &str,
    content: &str,
    docs: &[Value],
    paths: &[String],
) -> Vec<ValidationError> {
    let mut out = Vec::new();
    for path in paths {
        let Some(value) = docs.iter().find_map(|d| lookup(d, path)) else {
            continue;
        };
        let tolerated = value
            .as_sequence()
            .is_some_and(|seq| seq.iter().any(tolerates_control_plane));
        if !tolerated {
            out.push(
                ValidationError::warning(
                    file,
                    format!("`{path}` does not tolerate the control-plane taint; pods may stay Pending on control-plane-only nodes"),
                )
                .at_line(line_of_path(content, path))
                .with_fix(format!(
                    "Add `- key: {CONTROL_PLANE_TAINT}` with `operator: Exists` and `effect: NoSchedule` under `{path}`"
                )),
            );
        }
    }
    out
}

fn tolerates_control_plane(entry: &Value) -> bool {
    let Some(map) = entry.as_mapping() else {
        return false;
    };
    let key = map.get("key").and_then(Value::as_str).unwrap_or("");
    let operator = map.get("operator").and_then(Value::as_str).unwrap_or("");
    key == CONTROL_PLANE_TAINT || (key.is_empty() && operator == "Exists")
}

fn scan_line_rules(file: &str, content: &str) -> Vec<ValidationError> {
    let mut out = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let line_no = Some(idx + 1);

        if MASTER_KEY.is_match(line) {
            out.push(
                ValidationError::warning(
                    file,
                    "`master:` was renamed to `primary:` in Bitnami charts; this block is silently ignored",
                )
                .at_line(line_no)
                .with_fix("Rename `master:` to `primary:`"),
            );
        }

        if let Some(caps) = CPU_WHOLE_MILLIS.captures(line) {
            let cores = &caps[1];
            out.push(
                ValidationError::warning(
                    file,
                    format!("`cpu: {cores}000m` is normalized to `{cores}` by the API server and shows as drift"),
                )
                .at_line(line_no)
                .with_fix(format!("Use `cpu: {cores}`")),
            );
        } else if let Some(caps) = CPU_FRACTION.captures(line) {
            if let Ok(cores) = caps[1].parse::<f64>() {
                let millis = (cores * 1000.0).round() as u64;
                let fix = if millis % 1000 == 0 {
                    format!("Use `cpu: {}`", millis / 1000)
                } else {
                    format!("Use `cpu: {millis}m`")
                };
                out.push(
                    ValidationError::warning(
                        file,
                        format!("`cpu: {}` is normalized to millicores by the API server and shows as drift", &caps[1]),
                    )
                    .at_line(line_no)
                    .with_fix(fix),
                );
            }
        }

        if let Some(caps) = SECRET_KEY_NAME.captures(line) {
            let key = &caps[2];
            let hyphenated = key.replace('_', "-").to_ascii_lowercase();
            out.push(
                ValidationError::warning(
                    file,
                    format!("`{}` references secret key `{key}`; chart-managed secrets use hyphenated key names", &caps[1]),
                )
                .at_line(line_no)
                .with_fix(format!("Name the secret key `{hyphenated}`")),
            );
        }
    }
    out
}

fn check_host_network(file: &str, content: &str) -> Vec<ValidationError> {
    let Some(line) = content
        .lines()
        .position(|l| HOST_NETWORK_TRUE.is_match(l))
        .map(|i| i + 1)
    else {
        return Vec::new();
    };

    let mut out = Vec::new();
    if !content.contains("privileged") {
        out.push(
            ValidationError::warning(
                file,
                "`hostNetwork: true` is rejected unless the namespace enforces the privileged pod security level",
            )
            .at_line(Some(line))
            .with_fix("Label the namespace `pod-security.kubernetes.io/enforce: privileged` in manifests/namespace.yaml"),
        );
    }
    if !content.contains("Recreate") {
        out.push(
            ValidationError::warning(
                file,
                "`hostNetwork: true` with a rolling deployment strategy deadlocks on host port conflicts during rollout",
            )
            .at_line(Some(line))
            .with_fix("Set the deployment strategy `type: Recreate`"),
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::Severity;
    use crate::yaml::parse_documents;

    fn run(content: &str) -> Vec<ValidationError> {
        let docs = parse_documents(content).unwrap();
        let paths: Vec<String> = ["tolerations", "controller.tolerations"]
            .into_iter()
            .map(String::from)
            .collect();
        validate_values("apps/x/values.yaml", content, &docs, &paths)
    }

    #[test]
    fn master_key_warns_at_its_line() {
        let out = run("auth:\n  enabled: true\nmaster:\n  persistence:\n    size: 8Gi\n");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].severity, Severity::Warning);
        assert_eq!(out[0].line, Some(3));
        assert!(out[0].message.contains("primary:"));
    }

    #[test]
    fn commented_master_is_ignored() {
        assert!(run("# master:\nprimary:\n  x: 1\n").is_empty());
    }

    #[test]
    fn host_network_without_recreate_warns_once_about_strategy() {
        let out = run("hostNetwork: true\nsecurityContext:\n  privileged: true\n");
        let strategy: Vec<_> = out.iter().filter(|e| e.message.contains("strategy")).collect();
        assert_eq!(strategy.len(), 1);
        assert_eq!(out.len(), 1);
        assert_eq!(strategy[0].line, Some(1));
    }

    #[test]
    fn host_network_without_privileged_namespace_warns() {
        let out = run("hostNetwork: true\nupdateStrategy:\n  type: Recreate\n");
        assert_eq!(out.len(), 1);
        assert!(out[0].message.contains("privileged"));
        assert!(!out[0].message.contains("strategy"));
    }

    #[test]
    fn host_network_false_is_quiet() {
        assert!(run("hostNetwork: false\n").is_empty());
        assert!(run("# hostNetwork: true\n").is_empty());
    }

    #[test]
    fn host_network_in_list_item_or_flow_map_warns() {
        let out = run("daemonset:\n  - hostNetwork: true\n");
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|e| e.line == Some(2)));

        let out = run("spec: {hostNetwork: true}\n");
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].line, Some(1));
    }

    #[test]
    fn toleration_path_without_control_plane_entry_warns() {
        let out = run("controller:\n  tolerations:\n    - key: dedicated\n      operator: Equal\n      value: infra\n");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].line, Some(2));
        assert!(out[0].message.contains("controller.tolerations"));
    }

    #[test]
    fn toleration_with_taint_key_or_wildcard_passes() {
        assert!(run("tolerations:\n  - key: node-role.kubernetes.io/control-plane\n    effect: NoSchedule\n").is_empty());
        assert!(run("controller:\n  tolerations:\n    - operator: Exists\n").is_empty());
    }

    #[test]
    fn absent_toleration_paths_are_not_reported() {
        assert!(run("replicas: 2\n").is_empty());
    }

    #[test]
    fn cpu_normalization_drift_is_flagged() {
        let out = run("resources:\n  requests:\n    cpu: 2000m\n  limits:\n    cpu: \"0.5\"\n    memory: 1Gi\n");
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].fix.as_deref(), Some("Use `cpu: 2`"));
        assert_eq!(out[1].fix.as_deref(), Some("Use `cpu: 500m`"));
        assert_eq!(out[1].line, Some(5));
    }

    #[test]
    fn plain_millicores_pass() {
        assert!(run("resources:\n  requests:\n    cpu: 250m\n    cpu2: 1000m\n").is_empty());
    }

    #[test]
    fn underscored_secret_keys_are_flagged() {
        let out = run("auth:\n  existingSecret: pg\n  secretKeys:\n    adminPasswordKey: postgres_password\n");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].fix.as_deref(), Some("Name the secret key `postgres-password`"));
    }

    #[test]
    fn validation_is_deterministic() {
        let content = "hostNetwork: true\nmaster:\n  cpu: 1000m\ntolerations: []\n";
        assert_eq!(run(content), run(content));
    }
}
