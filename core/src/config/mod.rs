//! Configuration for the gate.
//!
//! - `types.rs` (data structures + defaults)
//! - `load.rs`  (IO: load_default + env overrides)

mod load;
mod types;

pub use load::{bootstrap_from_env, load_default, load_from_path, BOOTSTRAP_ENV, CONFIG_ENV};
pub use types::*;
