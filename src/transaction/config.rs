use super::{Target, Transaction};
use crate::core::{CopyDepth, Result};
use crate::snapshot::Snapshotable;
use std::cell::RefCell;
use std::rc::Rc;

/// Transaction configuration
///
/// Collects the copy depth and the targets, then opens the guard with
/// [`begin`](TransactionConfig::begin).
///
/// ```
/// # use std::cell::RefCell;
/// # use std::rc::Rc;
/// # use rustmemento::{Record, TransactionConfig};
/// # fn main() -> rustmemento::Result<()> {
/// let account = Rc::new(RefCell::new(Record::new().with("balance", 10)));
///
/// let transaction = TransactionConfig::new()
///     .deep(true)
///     .target(Rc::clone(&account))
///     .begin()?;
///
/// account.borrow_mut().set("balance", 0);
/// transaction.rollback()?;
/// assert_eq!(account.borrow().get("balance").and_then(|v| v.as_i64()), Some(10));
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct TransactionConfig {
    /// Copy depth used for every capture
    pub depth: CopyDepth,

    targets: Vec<Rc<dyn Target>>,
}

impl TransactionConfig {
    /// Create a configuration with shallow captures and no targets
    pub fn new() -> Self {
        Self::default()
    }

    /// Select deep (`true`) or shallow (`false`) captures
    pub fn deep(mut self, deep: bool) -> Self {
        self.depth = CopyDepth::from(deep);
        self
    }

    /// Set the copy depth
    pub fn depth(mut self, depth: CopyDepth) -> Self {
        self.depth = depth;
        self
    }

    /// Add a shared target
    pub fn target<T>(mut self, target: Rc<RefCell<T>>) -> Self
    where
        T: Snapshotable + 'static,
        T::State: 'static,
    {
        self.targets.push(target);
        self
    }

    /// Add an already type-erased target
    pub fn dyn_target(mut self, target: Rc<dyn Target>) -> Self {
        self.targets.push(target);
        self
    }

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// Open the transaction, capturing the initial commit point
    pub fn begin(self) -> Result<Transaction> {
        Transaction::new(self.depth, self.targets)
    }
}
