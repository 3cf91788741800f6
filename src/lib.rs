// ============================================================================
// RustMemento Library
// ============================================================================

// Lets the derive and attribute macros name `::rustmemento` from inside
// this crate as well.
extern crate self as rustmemento;

pub mod core;
pub mod entity;
pub mod snapshot;
pub mod transaction;

// Re-export main types for convenience
pub use crate::core::{CopyDepth, MementoError, Record, Resource, Result, Value};
pub use entity::NumObj;
pub use snapshot::{
    Copier, Duplicate, Memento, Restore, RestoreHandle, Snapshotable, capture, capture_shared,
};
pub use transaction::{Target, Transaction, TransactionConfig, Transactional, with_transaction};

// Derive macros share names with the traits they implement.
pub use rustmemento_derive::{Duplicate, Snapshotable, transactional};
