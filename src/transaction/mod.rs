// ============================================================================
// Transaction Module
// ============================================================================
//
// Rollback support for in-memory objects built on mementos:
// - Transaction: a guard over a flat list of shared targets with an explicit
//   commit point and a repeatable rollback
// - TransactionConfig: builder for guards
// - with_transaction / Transactional: run one operation on one object and
//   undo everything it did if it fails
//
// ============================================================================

pub mod config;
pub mod guard;
pub mod transactional;

pub use config::TransactionConfig;
pub use guard::{Target, Transaction};
pub use transactional::{Transactional, with_transaction};
