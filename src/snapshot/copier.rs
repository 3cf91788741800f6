use super::Duplicate;
use crate::core::{CopyDepth, Result};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::rc::Rc;

/// State carried through one duplication pass.
///
/// In a deep pass every `Rc` allocation is copied once and reused for every
/// later occurrence, so two fields that shared a cell before the copy share
/// one (new) cell after it.
pub struct Copier {
    depth: CopyDepth,
    copies: HashMap<(usize, TypeId), Rc<dyn Any>>,
}

impl Copier {
    pub fn new(depth: CopyDepth) -> Self {
        Self {
            depth,
            copies: HashMap::new(),
        }
    }

    pub fn depth(&self) -> CopyDepth {
        self.depth
    }

    /// Copies an `Rc` at this pass's depth, reusing earlier copies of the
    /// same allocation.
    ///
    /// Reference cycles are not supported: the copy of an allocation is
    /// recorded only after its contents have been duplicated.
    pub fn copy_rc<T: Duplicate + 'static>(&mut self, rc: &Rc<T>) -> Result<Rc<T>> {
        if !self.depth.is_deep() {
            return Ok(Rc::clone(rc));
        }

        let key = (Rc::as_ptr(rc) as usize, TypeId::of::<T>());
        if let Some(existing) = self.copies.get(&key) {
            if let Ok(copy) = Rc::clone(existing).downcast::<T>() {
                return Ok(copy);
            }
        }

        let copy = Rc::new((**rc).duplicate_in(self)?);
        self.copies.insert(key, Rc::clone(&copy) as Rc<dyn Any>);
        Ok(copy)
    }
}
