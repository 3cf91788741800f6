use crate::core::{CopyDepth, MementoError};
use crate::snapshot::{Snapshotable, capture};
use std::cell::RefCell;
use std::rc::Rc;

/// Runs `operation` on `target` atomically.
///
/// `target` is captured (shallow) before the call. If `operation` fails, the
/// capture is restored and then the operation's error is returned unchanged.
/// On success the new state is kept.
///
/// The error type only has to accept a [`MementoError`] so that a failed
/// capture can be reported.
pub fn with_transaction<T, R, E, F>(target: &mut T, operation: F) -> Result<R, E>
where
    T: Snapshotable,
    F: FnOnce(&mut T) -> Result<R, E>,
    E: From<MementoError>,
{
    let memento = capture(target, CopyDepth::Shallow)?;
    match operation(&mut *target) {
        Ok(value) => Ok(value),
        Err(err) => {
            memento.restore_into(target)?;
            Err(err)
        }
    }
}

/// A method wrapped with transactional semantics.
///
/// Wraps any `Fn(&mut T, A) -> Result<R, E>` and keeps its calling shape:
/// the receiver plus one argument value (use a tuple for several).
///
/// ```
/// # use rustmemento::{MementoError, Record, Transactional, Value};
/// let bump = Transactional::new(|record: &mut Record, by: Value| {
///     let current = record.get("n").cloned().unwrap_or(Value::Integer(0));
///     record.set("touched", true);
///     record.set("n", current.add(&by)?);
///     Ok::<_, MementoError>(())
/// });
///
/// let mut record = Record::new().with("n", 1);
/// assert!(bump.call(&mut record, Value::from("x")).is_err());
/// assert!(!record.contains("touched"));
/// ```
pub struct Transactional<F> {
    method: F,
}

impl<F> Transactional<F> {
    pub fn new(method: F) -> Self {
        Self { method }
    }

    pub fn call<T, A, R, E>(&self, target: &mut T, args: A) -> Result<R, E>
    where
        T: Snapshotable,
        F: Fn(&mut T, A) -> Result<R, E>,
        E: From<MementoError>,
    {
        with_transaction(target, |target| (self.method)(target, args))
    }

    /// Calls the method on a shared target, holding its mutable borrow for
    /// the duration of the call.
    pub fn call_shared<T, A, R, E>(&self, target: &Rc<RefCell<T>>, args: A) -> Result<R, E>
    where
        T: Snapshotable,
        F: Fn(&mut T, A) -> Result<R, E>,
        E: From<MementoError>,
    {
        let mut target = target.try_borrow_mut().map_err(MementoError::from)?;
        self.call(&mut *target, args)
    }

    pub fn into_inner(self) -> F {
        self.method
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Record, Value};

    #[derive(Debug, PartialEq)]
    enum AppError {
        Rejected(&'static str),
        Memento(MementoError),
    }

    impl From<MementoError> for AppError {
        fn from(err: MementoError) -> Self {
            AppError::Memento(err)
        }
    }

    #[test]
    fn test_success_keeps_changes() {
        let mut record = Record::new().with("value", 1);
        let out = with_transaction(&mut record, |r| -> Result<i32, AppError> {
            r.set("value", 2);
            Ok(7)
        });
        assert_eq!(out, Ok(7));
        assert_eq!(record.get("value"), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_failure_restores_and_keeps_error() {
        let mut record = Record::new().with("value", 1);
        let out = with_transaction(&mut record, |r| -> Result<(), AppError> {
            r.set("value", 2);
            r.set("other", "x");
            Err(AppError::Rejected("nope"))
        });
        assert_eq!(out, Err(AppError::Rejected("nope")));
        assert_eq!(record, Record::new().with("value", 1));
    }

    #[test]
    fn test_wrapper_call_shared() {
        let set_value = Transactional::new(|r: &mut Record, v: i64| -> Result<(), MementoError> {
            r.set("value", v);
            if v < 0 {
                return Err(MementoError::TypeMismatch("negative".into()));
            }
            Ok(())
        });
        let record = Rc::new(RefCell::new(Record::new().with("value", 1)));

        set_value.call_shared(&record, 5).unwrap();
        assert!(set_value.call_shared(&record, -1).is_err());
        assert_eq!(record.borrow().get("value"), Some(&Value::Integer(5)));
    }

    #[test]
    fn test_wrapper_reports_borrowed_target() {
        let noop = Transactional::new(|_: &mut Record, _: ()| -> Result<(), MementoError> { Ok(()) });
        let record = Rc::new(RefCell::new(Record::new()));
        let _reader = record.borrow();
        assert!(matches!(
            noop.call_shared(&record, ()),
            Err(MementoError::TargetBorrowed(_))
        ));
    }
}
