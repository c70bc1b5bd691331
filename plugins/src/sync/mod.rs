pub mod argocd;

pub use argocd::ArgocdStatusSource;
