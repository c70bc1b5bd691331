use std::path::{Path, PathBuf};

pub const CLUSTER_CONFIG_FILE: &str = "talconfig.yaml";
pub const APPS_DIR: &str = "apps";
pub const DOT_MARKER: &str = ".opsgate";

/// Walk upward from `start` to the first directory carrying any repo marker.
/// `start` need not exist; the walk begins at its deepest existing ancestor.
pub fn find_repo_root(start: &Path) -> Option<PathBuf> {
    let start = start
        .ancestors()
        .find_map(|p| p.canonicalize().ok())
        .unwrap_or_else(|| start.to_path_buf());
    start
        .ancestors()
        .find(|dir| is_repo_root(dir))
        .map(Path::to_path_buf)
}

fn is_repo_root(dir: &Path) -> bool {
    dir.join(CLUSTER_CONFIG_FILE).is_file()
        || dir.join(APPS_DIR).is_dir()
        || dir.join(DOT_MARKER).exists()
}
