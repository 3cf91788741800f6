use std::fmt;

use serde::Serialize;

use crate::core::{Result, Value};
use crate::{Duplicate, Snapshotable, transactional};

/// A minimal object with one numeric field.
///
/// `increment` is a plain method; `do_stuff` is transactional and always
/// fails halfway through, leaving the object as it was.
#[derive(Debug, Clone, PartialEq, Serialize, Duplicate, Snapshotable)]
pub struct NumObj {
    value: Value,
}

impl NumObj {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<Value>) {
        self.value = value.into();
    }

    /// Adds one to `value`. Fails with `TypeMismatch` if it is not numeric.
    pub fn increment(&mut self) -> Result<()> {
        self.value = self.value.add(&Value::Integer(1))?;
        Ok(())
    }

    #[transactional]
    pub fn do_stuff(&mut self) -> Result<()> {
        self.value = Value::from("1111");
        self.increment()
    }
}

impl fmt::Display for NumObj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Value::Text(text) => write!(f, "<NumObj: '{}'>", text),
            other => write!(f, "<NumObj: {}>", other),
        }
    }
}
