//! Store trait definitions

use smash_api::Document;

use crate::{AuditEvent, StoreResult};

/// Persistence port used by the engine
pub trait Store: Send + Sync {
    // Document

    /// Load the persisted document, migrating legacy layouts
    fn load_document(&self) -> StoreResult<Option<Document>>;

    /// Replace the persisted document as a whole
    fn save_document(&self, document: &Document) -> StoreResult<()>;

    // Audit log

    /// Append an audit event
    fn append_audit(&self, event: AuditEvent) -> StoreResult<()>;

    /// Get recent audit events, newest first
    fn get_recent_audits(&self, limit: usize) -> StoreResult<Vec<AuditEvent>>;

    // Health

    /// Check if store is healthy
    fn is_healthy(&self) -> bool;
}
