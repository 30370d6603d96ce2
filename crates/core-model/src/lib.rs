//! Document model: stored memos, the markup content codec, persistence and the
//! workbench that owns the single open editing session.
//!
//! Layering:
//! * `document` is the persisted record (`StoredDocument`), a plain serde type
//!   whose `content` is markup produced by `markup::serialize`.
//! * `store` is the persistence collaborator seam (`DocumentStore`) with an
//!   in-memory and a JSON-file implementation keyed by user scope.
//! * `workbench` ties the two to a live `core_state::Session`.
//!
//! Core invariants (must hold after every public `Workbench` call):
//! * At most one document is open; its session owns the body exclusively.
//! * Switching documents (open, create, close) flushes the open one first, so
//!   unsaved edits are never dropped silently.
//! * A stored document always round-trips: parsing its `content` and
//!   restoring its `layers` / `activeLayerId` yields the session it was
//!   captured from (modulo selection and history, which are not persisted).
//!
//! Load-time repair (dangling active layer, runs owned by unknown layers,
//! nested or untagged markup) is delegated to `LayerRegistry::from_snapshot`
//! and `Session::open`; this crate never edits runs itself.

use thiserror::Error;

pub mod document;
pub mod markup;
pub mod store;
pub mod workbench;

pub use document::StoredDocument;
pub use markup::MarkupError;
pub use store::{DocumentStore, JsonFileStore, MemoryStore};
pub use workbench::{Workbench, WorkbenchOptions};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("no document with id `{0}`")]
    NotFound(String),
    #[error("no document is open")]
    NoOpenDocument,
}

/// Wall-clock time in epoch milliseconds.
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
