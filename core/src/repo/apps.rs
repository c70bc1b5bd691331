use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_yaml::Value;

use crate::yaml::{lookup, parse_documents, str_at};

use super::manifest::ApplicationManifest;
use super::model::{AppDefinition, PsaLevel};
use super::root::APPS_DIR;

const PSA_ENFORCE_LABEL: &str = "pod-security.kubernetes.io/enforce";
const VALUES_REF_PREFIX: &str = "$values/";

/// One entry per `apps/<dir>` holding a parseable `Application`. A name seen
/// twice keeps the first definition.
pub fn discover_apps(root: &Path) -> BTreeMap<String, AppDefinition> {
    let mut apps = BTreeMap::new();
    for dir in sorted_entries(&root.join(APPS_DIR)).into_iter().filter(|p| p.is_dir()) {
        let Some(app) = load_app(root, &dir) else {
            continue;
        };
        if apps.contains_key(&app.name) {
            tracing::debug!(target: "opsgate.repo", app = %app.name, dir = %dir.display(), "duplicate app name ignored");
            continue;
        }
        apps.insert(app.name.clone(), app);
    }
    apps
}

fn load_app(root: &Path, app_dir: &Path) -> Option<AppDefinition> {
    let manifest_path = sorted_entries(app_dir).into_iter().find(|p| {
        p.is_file()
            && p.file_name()
                .is_some_and(|n| n.to_string_lossy().contains("application"))
    })?;
    let content = std::fs::read_to_string(&manifest_path).ok()?;
    let docs = match parse_documents(&content) {
        Ok(d) => d,
        Err(e) => {
            tracing::debug!(target: "opsgate.repo", path = %manifest_path.display(), error = %e, "application manifest unparseable");
            return None;
        }
    };
    let manifest = ApplicationManifest::from_documents(&docs, &content)?;

    let dir_name = app_dir.file_name()?.to_string_lossy().into_owned();
    let values_file = resolve_values_file(root, app_dir, &manifest);
    let has_tolerations = values_file
        .as_deref()
        .is_some_and(values_have_tolerations);

    Some(AppDefinition {
        name: manifest.name.clone().unwrap_or(dir_name),
        namespace: manifest.namespace.clone(),
        chart: manifest.chart_ref(),
        values_file,
        has_tolerations,
        psa_level: read_psa_level(app_dir),
        ignore_differences_present: manifest.ignore_differences_present,
    })
}

/// `path` source first, then a `$values/` reference, then the app's own `values.yaml`.
fn resolve_values_file(root: &Path, app_dir: &Path, manifest: &ApplicationManifest) -> Option<PathBuf> {
    if let Some(path) = manifest.sources.iter().find_map(|s| s.path.as_deref()) {
        return Some(root.join(path.trim_matches('/')).join("values.yaml"));
    }
    let from_ref = manifest
        .sources
        .iter()
        .flat_map(|s| s.value_files.iter())
        .find_map(|f| f.strip_prefix(VALUES_REF_PREFIX));
    if let Some(rel) = from_ref {
        return Some(root.join(rel));
    }
    let local = app_dir.join("values.yaml");
    local.is_file().then_some(local)
}

fn values_have_tolerations(path: &Path) -> bool {
    std::fs::read_to_string(path).is_ok_and(|c| {
        c.contains("tolerations:") && (c.contains("control-plane") || c.contains("Exists"))
    })
}

fn read_psa_level(app_dir: &Path) -> Option<PsaLevel> {
    sorted_entries(&app_dir.join("manifests"))
        .into_iter()
        .filter(|p| {
            p.is_file()
                && p.file_name()
                    .is_some_and(|n| n.to_string_lossy().contains("namespace"))
        })
        .filter_map(|p| std::fs::read_to_string(p).ok())
        .filter_map(|c| parse_documents(&c).ok())
        .flatten()
        .find_map(|doc| namespace_psa_label(&doc))
        .and_then(|label| PsaLevel::parse(&label))
}

fn namespace_psa_label(doc: &Value) -> Option<String> {
    if str_at(doc, "kind") != Some("Namespace") {
        return None;
    }
    let labels = lookup(doc, "metadata.labels")?.as_mapping()?;
    labels.get(PSA_ENFORCE_LABEL)?.as_str().map(String::from)
}

fn sorted_entries(dir: &Path) -> Vec<PathBuf> {
    let Ok(rd) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut entries: Vec<PathBuf> = rd.filter_map(|e| e.ok().map(|e| e.path())).collect();
    entries.sort();
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::model::ChartRef;
    use pretty_assertions::assert_eq;

    fn write(root: &Path, rel: &str, content: &str) {
        let p = root.join(rel);
        std::fs::create_dir_all(p.parent().unwrap()).unwrap();
        std::fs::write(p, content).unwrap();
    }

    const CILIUM_APP: &str = r#"
apiVersion: argoproj.io/v1alpha1
kind: Application
metadata:
  name: cilium
spec:
  destination:
    namespace: kube-system
  source:
    repoURL: https://helm.cilium.io
    chart: cilium
    targetRevision: 1.16.0
"#;

    #[test]
    fn discovers_app_with_values_and_psa() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "apps/cilium/application.yaml", CILIUM_APP);
        write(
            root,
            "apps/cilium/values.yaml",
            "operator:\n  tolerations:\n    - key: node-role.kubernetes.io/control-plane\n      operator: Exists\n",
        );
        write(
            root,
            "apps/cilium/manifests/namespace.yaml",
            "apiVersion: v1\nkind: Namespace\nmetadata:\n  name: kube-system\n  labels:\n    pod-security.kubernetes.io/enforce: privileged\n",
        );

        let apps = discover_apps(root);
        let app = apps.get("cilium").unwrap();
        assert_eq!(app.namespace.as_deref(), Some("kube-system"));
        assert_eq!(
            app.chart,
            Some(ChartRef {
                repo_url: "https://helm.cilium.io".into(),
                chart: "cilium".into(),
                version: "1.16.0".into(),
            })
        );
        assert_eq!(app.values_file, Some(root.join("apps/cilium/values.yaml")));
        assert!(app.has_tolerations);
        assert_eq!(app.psa_level, Some(PsaLevel::Privileged));
        assert!(!app.ignore_differences_present);
    }

    #[test]
    fn unknown_psa_value_maps_to_none() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "apps/cilium/application.yaml", CILIUM_APP);
        write(
            root,
            "apps/cilium/manifests/namespace.yaml",
            "kind: Namespace\nmetadata:\n  labels:\n    pod-security.kubernetes.io/enforce: wide-open\n",
        );
        let apps = discover_apps(root);
        assert_eq!(apps["cilium"].psa_level, None);
    }

    #[test]
    fn broken_and_foreign_manifests_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "apps/cilium/application.yaml", CILIUM_APP);
        write(root, "apps/broken/application.yaml", "kind: Application\nspec: [\n");
        write(root, "apps/deploy/application.yaml", "kind: Deployment\n");
        write(root, "apps/empty/README.md", "nothing here");

        let apps = discover_apps(root);
        assert_eq!(apps.keys().cloned().collect::<Vec<_>>(), vec!["cilium".to_string()]);
    }

    #[test]
    fn values_path_follows_path_source_then_values_ref() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(
            root,
            "apps/homepage/application.yaml",
            "kind: Application\nmetadata:\n  name: homepage\nspec:\n  source:\n    repoURL: https://github.com/example/infra\n    path: apps/homepage/chart\n",
        );
        write(
            root,
            "apps/loki/application.yaml",
            "kind: Application\nmetadata:\n  name: loki\nspec:\n  sources:\n    - repoURL: https://grafana.github.io/helm-charts\n      chart: loki\n      targetRevision: 6.0.0\n      helm:\n        valueFiles:\n          - $values/apps/loki/values.yaml\n    - repoURL: https://github.com/example/infra\n      ref: values\n",
        );

        let apps = discover_apps(root);
        assert_eq!(
            apps["homepage"].values_file,
            Some(root.join("apps/homepage/chart/values.yaml"))
        );
        assert_eq!(apps["loki"].values_file, Some(root.join("apps/loki/values.yaml")));
        assert!(apps["homepage"].chart.is_none());
    }

    #[test]
    fn duplicate_names_keep_first_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "apps/a-cilium/application.yaml", CILIUM_APP);
        write(
            root,
            "apps/b-cilium/application.yaml",
            &CILIUM_APP.replace("kube-system", "other"),
        );
        let apps = discover_apps(root);
        assert_eq!(apps.len(), 1);
        assert_eq!(apps["cilium"].namespace.as_deref(), Some("kube-system"));
    }
}
