mod writer;

pub use writer::{AuditEvent, AuditLog, AUDIT_SCHEMA_VERSION};
