//! Bounded-timeout probes against chart registries and git remotes.

mod checks;
mod probe;

pub use checks::{
    check_oci_format, check_source, check_sources, git_refs_url, index_has_version, index_url,
    CheckOptions, SourceKind,
};
pub use probe::{ProbeResponse, RemoteProbe};
