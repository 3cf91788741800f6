use super::{Duplicate, Snapshotable};
use crate::core::{CopyDepth, Result};
use std::any::type_name;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::trace;

/// A captured copy of an object's state.
///
/// The captured state is never handed out by value. Every restore duplicates
/// it again at the depth it was captured with, so the same memento can be
/// applied any number of times with the same result.
#[derive(Debug)]
pub struct Memento<S> {
    state: S,
    depth: CopyDepth,
}

impl<S: Duplicate> Memento<S> {
    pub fn depth(&self) -> CopyDepth {
        self.depth
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    /// Replaces the whole state of `target` with the captured one.
    pub fn restore_into<T>(&self, target: &mut T) -> Result<()>
    where
        T: Snapshotable<State = S>,
    {
        let state = self.state.duplicate(self.depth)?;
        target.restore(state);
        trace!(target_type = type_name::<T>(), depth = %self.depth, "restored memento");
        Ok(())
    }
}

/// Captures the current state of `target`.
///
/// Only reads `target`. Fails with `CopyError` when part of the state cannot
/// be copied at `depth`.
pub fn capture<T: Snapshotable>(target: &T, depth: CopyDepth) -> Result<Memento<T::State>> {
    let state = target.snapshot(depth)?;
    trace!(target_type = type_name::<T>(), depth = %depth, "captured memento");
    Ok(Memento { state, depth })
}

/// Zero-argument restore operation over type-erased targets.
pub trait Restore {
    fn restore(&self) -> Result<()>;
}

/// A memento bound to the shared object it was captured from.
pub struct RestoreHandle<T: Snapshotable> {
    target: Rc<RefCell<T>>,
    memento: Memento<T::State>,
}

impl<T: Snapshotable> RestoreHandle<T> {
    /// Resets the bound object to the captured state.
    ///
    /// # Errors
    /// Returns `TargetBorrowed` if the object is borrowed elsewhere.
    pub fn restore(&self) -> Result<()> {
        let mut target = self.target.try_borrow_mut()?;
        self.memento.restore_into(&mut *target)
    }

    pub fn memento(&self) -> &Memento<T::State> {
        &self.memento
    }

    pub fn target(&self) -> &Rc<RefCell<T>> {
        &self.target
    }
}

impl<T: Snapshotable> Restore for RestoreHandle<T> {
    fn restore(&self) -> Result<()> {
        RestoreHandle::restore(self)
    }
}

/// Captures a shared object and returns a handle that restores it in place.
pub fn capture_shared<T: Snapshotable>(
    target: &Rc<RefCell<T>>,
    depth: CopyDepth,
) -> Result<RestoreHandle<T>> {
    let memento = capture(&*target.try_borrow()?, depth)?;
    Ok(RestoreHandle {
        target: Rc::clone(target),
        memento,
    })
}
