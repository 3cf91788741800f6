// ============================================================================
// Snapshot Capability
// ============================================================================
//
// Types opt into capture/restore explicitly instead of being reflected over:
// - Duplicate: copy a value at a chosen depth (shallow or deep)
// - Snapshotable: expose the complete mutable state of an object as one value
//   and accept a replacement for it
//
// Both traits can be derived with `#[derive(Duplicate, Snapshotable)]`.
//
// ============================================================================

pub mod copier;
pub mod memento;

pub use copier::Copier;
pub use memento::{Memento, Restore, RestoreHandle, capture, capture_shared};

use crate::core::{CopyDepth, Result};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::hash::Hash;
use std::rc::Rc;

/// Copies a value at the requested depth.
///
/// For owned data both depths produce an independent copy. The depths only
/// differ for aliasable values: `Shallow` keeps pointing at the same `Rc`
/// allocation, `Deep` allocates new ones all the way down while keeping
/// allocations that were shared inside the value shared in the copy.
///
/// Implementors write `duplicate_in` and pass the [`Copier`] on to their
/// parts. A value that cannot be copied returns
/// [`MementoError::CopyError`](crate::MementoError::CopyError).
pub trait Duplicate: Sized {
    fn duplicate_in(&self, copier: &mut Copier) -> Result<Self>;

    fn duplicate(&self, depth: CopyDepth) -> Result<Self> {
        self.duplicate_in(&mut Copier::new(depth))
    }
}

/// An object whose whole mutable state can be captured and put back.
///
/// `restore` must replace the state completely: anything that was not part of
/// the captured state stops being part of the object.
pub trait Snapshotable {
    type State: Duplicate;

    fn snapshot(&self, depth: CopyDepth) -> Result<Self::State>;

    fn restore(&mut self, state: Self::State);
}

macro_rules! duplicate_by_clone {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Duplicate for $ty {
                fn duplicate_in(&self, _copier: &mut Copier) -> Result<Self> {
                    Ok(self.clone())
                }
            }
        )*
    };
}

duplicate_by_clone!(
    (), bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
    String, CopyDepth,
);

impl<T: Duplicate> Duplicate for Option<T> {
    fn duplicate_in(&self, copier: &mut Copier) -> Result<Self> {
        self.as_ref().map(|value| value.duplicate_in(copier)).transpose()
    }
}

impl<T: Duplicate> Duplicate for Box<T> {
    fn duplicate_in(&self, copier: &mut Copier) -> Result<Self> {
        Ok(Box::new((**self).duplicate_in(copier)?))
    }
}

impl<T: Duplicate> Duplicate for Vec<T> {
    fn duplicate_in(&self, copier: &mut Copier) -> Result<Self> {
        self.iter().map(|item| item.duplicate_in(copier)).collect()
    }
}

impl<T: Duplicate> Duplicate for VecDeque<T> {
    fn duplicate_in(&self, copier: &mut Copier) -> Result<Self> {
        self.iter().map(|item| item.duplicate_in(copier)).collect()
    }
}

impl<K: Ord + Clone, V: Duplicate> Duplicate for BTreeMap<K, V> {
    fn duplicate_in(&self, copier: &mut Copier) -> Result<Self> {
        self.iter()
            .map(|(key, value)| -> Result<(K, V)> { Ok((key.clone(), value.duplicate_in(copier)?)) })
            .collect()
    }
}

impl<K: Eq + Hash + Clone, V: Duplicate> Duplicate for HashMap<K, V> {
    fn duplicate_in(&self, copier: &mut Copier) -> Result<Self> {
        self.iter()
            .map(|(key, value)| -> Result<(K, V)> { Ok((key.clone(), value.duplicate_in(copier)?)) })
            .collect()
    }
}

impl<T: Duplicate + 'static> Duplicate for Rc<T> {
    fn duplicate_in(&self, copier: &mut Copier) -> Result<Self> {
        copier.copy_rc(self)
    }
}

impl<T: Duplicate> Duplicate for RefCell<T> {
    fn duplicate_in(&self, copier: &mut Copier) -> Result<Self> {
        Ok(RefCell::new(self.try_borrow()?.duplicate_in(copier)?))
    }
}

macro_rules! duplicate_tuple {
    ($($name:ident),+) => {
        impl<$($name: Duplicate),+> Duplicate for ($($name,)+) {
            #[allow(non_snake_case)]
            fn duplicate_in(&self, copier: &mut Copier) -> Result<Self> {
                let ($($name,)+) = self;
                Ok(($($name.duplicate_in(copier)?,)+))
            }
        }
    };
}

duplicate_tuple!(A);
duplicate_tuple!(A, B);
duplicate_tuple!(A, B, C);
duplicate_tuple!(A, B, C, D);
