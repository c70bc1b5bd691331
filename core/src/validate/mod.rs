//! Diagnostics for edited manifests.

mod application;
mod types;
mod values;

pub use application::{check_ignore_differences, validate_application};
pub use types::{Severity, ValidationError, ValidationReport};
pub use values::validate_values;
