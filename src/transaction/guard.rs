use crate::core::{CopyDepth, MementoError, Result};
use crate::snapshot::{Restore, Snapshotable, capture_shared};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

/// Something a [`Transaction`] can capture.
///
/// Implemented for every `RefCell<T>` with a snapshotable `T`, so an
/// `Rc<RefCell<T>>` can be handed to a transaction as an `Rc<dyn Target>`.
pub trait Target {
    fn capture_handle(self: Rc<Self>, depth: CopyDepth) -> Result<Box<dyn Restore>>;
}

impl<T> Target for RefCell<T>
where
    T: Snapshotable + 'static,
    T::State: 'static,
{
    fn capture_handle(self: Rc<Self>, depth: CopyDepth) -> Result<Box<dyn Restore>> {
        Ok(Box::new(capture_shared(&self, depth)?))
    }
}

/// Transaction guard over a fixed list of targets.
///
/// Holds one restore handle per target, captured at the last commit.
/// Construction commits once, so a fresh guard rolls back to the state the
/// targets had when it was created.
///
/// ```text
/// new ──> [commit point] ──commit──> [commit point] ...
///              ^                          ^
///              └──rollback                └──rollback (repeatable)
/// ```
pub struct Transaction {
    targets: Vec<Rc<dyn Target>>,
    states: Vec<Box<dyn Restore>>,
    depth: CopyDepth,
}

impl Transaction {
    /// Creates a guard and captures the initial commit point.
    ///
    /// # Errors
    /// Returns `CopyError` if any target cannot be captured at `depth`.
    pub fn new(depth: impl Into<CopyDepth>, targets: Vec<Rc<dyn Target>>) -> Result<Self> {
        let mut transaction = Self {
            targets,
            states: Vec::new(),
            depth: depth.into(),
        };
        transaction.commit()?;
        Ok(transaction)
    }

    pub fn depth(&self) -> CopyDepth {
        self.depth
    }

    /// Number of targets under this guard.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Makes the current state of every target the new rollback point.
    ///
    /// The previous commit point is kept if any capture fails.
    pub fn commit(&mut self) -> Result<()> {
        let states = self
            .targets
            .iter()
            .map(|target| Rc::clone(target).capture_handle(self.depth))
            .collect::<Result<Vec<_>>>()?;
        self.states = states;
        debug!(targets = self.states.len(), depth = %self.depth, "transaction committed");
        Ok(())
    }

    /// Restores every target, in construction order, to the last commit point.
    ///
    /// The commit point itself is left untouched, so rolling back twice has
    /// the same effect as rolling back once. A target that cannot be restored
    /// does not stop the others; the first failure is returned once every
    /// target has been tried.
    pub fn rollback(&self) -> Result<()> {
        let mut first_error = None;
        for state in &self.states {
            if let Err(err) = state.restore() {
                first_error.get_or_insert(err);
            }
        }
        debug!(
            targets = self.states.len(),
            failed = first_error.is_some(),
            "transaction rolled back"
        );
        first_error.map_or(Ok(()), Err)
    }

    /// Runs `operation` against the targets.
    ///
    /// On success the new state is committed. On failure the targets are
    /// rolled back first and then the operation's own error is returned.
    /// A success whose state cannot be committed is rolled back as well and
    /// reports the commit error.
    pub fn attempt<R, E, F>(&mut self, operation: F) -> std::result::Result<R, E>
    where
        F: FnOnce() -> std::result::Result<R, E>,
        E: From<MementoError>,
    {
        match operation() {
            Ok(value) => {
                if let Err(err) = self.commit() {
                    self.rollback()?;
                    return Err(err.into());
                }
                Ok(value)
            }
            Err(err) => {
                self.rollback()?;
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("targets", &self.targets.len())
            .field("depth", &self.depth)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Record, Value};

    fn shared(record: Record) -> Rc<RefCell<Record>> {
        Rc::new(RefCell::new(record))
    }

    #[test]
    fn test_new_commits_initial_state() {
        let record = shared(Record::new().with("value", 1));
        let transaction = Transaction::new(true, vec![record.clone() as Rc<dyn Target>]).unwrap();
        assert_eq!(transaction.len(), 1);

        record.borrow_mut().set("value", 99);
        transaction.rollback().unwrap();
        assert_eq!(record.borrow().get("value"), Some(&Value::Integer(1)));
    }

    #[test]
    fn test_commit_moves_baseline() {
        let record = shared(Record::new().with("value", 1));
        let mut transaction =
            Transaction::new(false, vec![record.clone() as Rc<dyn Target>]).unwrap();

        record.borrow_mut().set("value", 2);
        transaction.commit().unwrap();
        record.borrow_mut().set("value", 3);
        transaction.rollback().unwrap();

        assert_eq!(record.borrow().get("value"), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_rollback_is_repeatable() {
        let record = shared(Record::new().with("value", 1));
        let transaction = Transaction::new(true, vec![record.clone() as Rc<dyn Target>]).unwrap();

        record.borrow_mut().set("value", 5);
        transaction.rollback().unwrap();
        record.borrow_mut().set("extra", true);
        transaction.rollback().unwrap();

        assert_eq!(*record.borrow(), Record::new().with("value", 1));
    }

    #[test]
    fn test_failed_commit_keeps_previous_point() {
        let record = shared(Record::new().with("value", 1));
        let mut transaction =
            Transaction::new(true, vec![record.clone() as Rc<dyn Target>]).unwrap();

        record
            .borrow_mut()
            .set("socket", crate::core::Resource::new("socket"));
        assert!(matches!(
            transaction.commit(),
            Err(MementoError::CopyError(_))
        ));

        transaction.rollback().unwrap();
        assert_eq!(*record.borrow(), Record::new().with("value", 1));
    }

    #[test]
    fn test_attempt_rolls_back_before_returning_error() {
        let record = shared(Record::new().with("value", 1));
        let mut transaction =
            Transaction::new(true, vec![record.clone() as Rc<dyn Target>]).unwrap();

        let result: std::result::Result<(), MementoError> = transaction.attempt(|| {
            record.borrow_mut().set("value", 2);
            let sum = record.borrow().get("value").unwrap().add(&Value::from("x"))?;
            record.borrow_mut().set("value", sum);
            Ok(())
        });

        assert!(matches!(result, Err(MementoError::TypeMismatch(_))));
        assert_eq!(record.borrow().get("value"), Some(&Value::Integer(1)));
    }

    #[test]
    fn test_attempt_commits_on_success() {
        let record = shared(Record::new().with("value", 1));
        let mut transaction =
            Transaction::new(true, vec![record.clone() as Rc<dyn Target>]).unwrap();

        transaction
            .attempt(|| -> Result<()> {
                record.borrow_mut().set("value", 10);
                Ok(())
            })
            .unwrap();
        record.borrow_mut().set("value", 11);
        transaction.rollback().unwrap();

        assert_eq!(record.borrow().get("value"), Some(&Value::Integer(10)));
    }

    #[test]
    fn test_rollback_restores_remaining_targets_after_failure() {
        let first = shared(Record::new().with("value", 1));
        let second = shared(Record::new().with("value", 1));
        let transaction = Transaction::new(
            false,
            vec![first.clone() as Rc<dyn Target>, second.clone() as Rc<dyn Target>],
        )
        .unwrap();

        first.borrow_mut().set("value", 2);
        second.borrow_mut().set("value", 2);

        let result = {
            let _reader = first.borrow();
            transaction.rollback()
        };

        assert!(matches!(result, Err(MementoError::TargetBorrowed(_))));
        assert_eq!(first.borrow().get("value"), Some(&Value::Integer(2)));
        assert_eq!(second.borrow().get("value"), Some(&Value::Integer(1)));
    }

    #[test]
    fn test_attempt_rolls_back_when_commit_fails() {
        let record = shared(Record::new().with("value", 1));
        let mut transaction =
            Transaction::new(true, vec![record.clone() as Rc<dyn Target>]).unwrap();

        let result = transaction.attempt(|| -> Result<()> {
            let mut record = record.borrow_mut();
            record.set("value", 2);
            record.set("socket", crate::core::Resource::new("socket"));
            Ok(())
        });

        assert!(matches!(result, Err(MementoError::CopyError(_))));
        assert_eq!(*record.borrow(), Record::new().with("value", 1));
    }
}
