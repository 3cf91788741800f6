use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::core::{CopyDepth, Result, Value};
use crate::snapshot::{Duplicate, Snapshotable};

/// An object whose entire state is a map from field name to value.
///
/// Fields can be added and removed at any time, and a restore brings back
/// exactly the captured set of fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field setter.
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.fields.get_mut(name)
    }

    /// Sets a field, returning the previous value if there was one.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.to_string(), value.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl Snapshotable for Record {
    type State = BTreeMap<String, Value>;

    fn snapshot(&self, depth: CopyDepth) -> Result<Self::State> {
        self.fields.duplicate(depth)
    }

    fn restore(&mut self, state: Self::State) {
        self.fields.clear();
        self.fields.extend(state);
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", name, value)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::capture;

    #[test]
    fn test_restore_drops_added_and_returns_removed_fields() {
        let mut record = Record::new().with("a", 1).with("b", "two");
        let memento = capture(&record, CopyDepth::Shallow).unwrap();

        record.set("c", true);
        record.remove("a");
        memento.restore_into(&mut record).unwrap();

        assert!(!record.contains("c"));
        assert_eq!(record.get("a"), Some(&Value::Integer(1)));
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_to_json() {
        let record = Record::new().with("n", 3).with("s", "x").with("z", Value::Null);
        assert_eq!(record.to_json().unwrap(), r#"{"n":3,"s":"x","z":null}"#);
    }

    #[test]
    fn test_display() {
        let record = Record::new().with("value", 2).with("name", "obj");
        assert_eq!(record.to_string(), "{name: obj, value: 2}");
    }
}
