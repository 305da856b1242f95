//! Violation & Citation Store
//!
//! Owns the canonical list of violations and issued citations for the
//! process lifetime. Ids are monotonic and assigned under the store lock,
//! so readers observe records in insertion order. Citation amounts come
//! from a configured rate table; document rendering is delegated to a
//! renderer implementation operating on a payload copy, outside any lock.

mod document;
mod store;

pub use document::{CitationDocument, PlainTextRenderer, RenderDocument};
pub use store::{Citation, CitationStore, RateTable, ViolationRecord, ViolationStatus};

use thiserror::Error;
use traffic_model::ViolationKind;

/// Store operation errors
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Unknown violation or citation id; the operation is rejected with no
    /// state change
    #[error("Record not found: {0}")]
    NotFound(u64),

    /// The violation already has a citation (one citation per violation)
    #[error("Violation {0} already cited")]
    AlreadyCited(u64),

    /// Rate table has no entry for a built-in kind; a configuration bug,
    /// not a runtime-recoverable condition
    #[error("No rate configured for violation kind {0}")]
    MissingRate(ViolationKind),

    /// Internal lock poisoned by a panicking writer
    #[error("Store lock poisoned")]
    LockPoisoned,
}
