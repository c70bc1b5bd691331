mod state;
mod store;

pub use state::{SessionState, LOOP_THRESHOLD};
pub use store::{MemorySessionStore, SessionStore};
