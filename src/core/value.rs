use std::borrow::Cow;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::{Serialize, Serializer};

use crate::core::{CopyDepth, MementoError, Result};
use crate::snapshot::{Copier, Duplicate};

/// A dynamically typed field value.
///
/// Plain variants are owned outright, so every copy of them is independent.
/// `Shared` is the aliasable variant: a shallow copy shares the cell with the
/// original, a deep copy allocates a fresh one. `Resource` stands for a handle
/// that cannot be duplicated at all.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
    List(Vec<Value>),
    Shared(Rc<RefCell<Value>>),
    Resource(Resource),
}

impl Value {
    /// Wraps a value in a fresh shared cell.
    pub fn shared(value: impl Into<Value>) -> Self {
        Self::Shared(Rc::new(RefCell::new(value.into())))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Integer(_) => "INTEGER",
            Self::Float(_) => "FLOAT",
            Self::Text(_) => "TEXT",
            Self::Boolean(_) => "BOOLEAN",
            Self::List(_) => "LIST",
            Self::Shared(_) => "SHARED",
            Self::Resource(_) => "RESOURCE",
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            Self::Shared(cell) => cell.try_borrow().ok()?.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Integer(i) => Some(*i as f64),
            Self::Shared(cell) => cell.try_borrow().ok()?.as_f64(),
            _ => None,
        }
    }

    /// Text content, read through shared cells like the numeric accessors.
    /// Text behind a shared cell is copied out since the cell's borrow
    /// cannot outlive this call.
    pub fn as_str(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Text(s) => Some(Cow::Borrowed(s)),
            Self::Shared(cell) => cell
                .try_borrow()
                .ok()?
                .as_str()
                .map(|text| Cow::Owned(text.into_owned())),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer(_) | Self::Float(_))
    }

    /// Adds two values.
    ///
    /// Numbers add numerically (integer overflow promotes to float), text
    /// concatenates with text and lists concatenate with lists. Shared cells
    /// are read through. Any other pairing is a `TypeMismatch`.
    pub fn add(&self, other: &Value) -> Result<Value> {
        match (self, other) {
            (Self::Shared(cell), _) => cell.try_borrow()?.add(other),
            (_, Self::Shared(cell)) => self.add(&*cell.try_borrow()?),

            (Self::Integer(a), Self::Integer(b)) => Ok(a
                .checked_add(*b)
                .map(Value::Integer)
                .unwrap_or(Value::Float(*a as f64 + *b as f64))),
            (Self::Integer(a), Self::Float(b)) => Ok(Value::Float(*a as f64 + b)),
            (Self::Float(a), Self::Integer(b)) => Ok(Value::Float(a + *b as f64)),
            (Self::Float(a), Self::Float(b)) => Ok(Value::Float(a + b)),

            (Self::Text(a), Self::Text(b)) => Ok(Value::Text(format!("{a}{b}"))),

            (Self::List(a), Self::List(b)) => {
                let mut joined = a.clone();
                joined.extend(b.iter().cloned());
                Ok(Value::List(joined))
            }

            _ => Err(MementoError::TypeMismatch(format!(
                "Cannot add {} and {}",
                self.type_name(),
                other.type_name()
            ))),
        }
    }
}

impl Duplicate for Value {
    fn duplicate_in(&self, copier: &mut Copier) -> Result<Self> {
        match self {
            Self::List(items) => Ok(Self::List(items.duplicate_in(copier)?)),
            Self::Shared(cell) => Ok(Self::Shared(cell.duplicate_in(copier)?)),
            Self::Resource(resource) => Ok(Self::Resource(resource.duplicate_in(copier)?)),
            other => Ok(other.clone()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => {
                if a.is_nan() && b.is_nan() {
                    return true;
                }
                (a - b).abs() < f64::EPSILON
            }
            (Self::Integer(i), Self::Float(f)) | (Self::Float(f), Self::Integer(i)) => {
                (*i as f64 - f).abs() < f64::EPSILON
            }
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Shared(a), Self::Shared(b)) => {
                if Rc::ptr_eq(a, b) {
                    return true;
                }
                match (a.try_borrow(), b.try_borrow()) {
                    (Ok(a), Ok(b)) => *a == *b,
                    _ => false,
                }
            }
            (Self::Resource(a), Self::Resource(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(fl) => {
                if fl.is_nan() {
                    write!(f, "NaN")
                } else if fl.is_infinite() {
                    if *fl > 0.0 {
                        write!(f, "Infinity")
                    } else {
                        write!(f, "-Infinity")
                    }
                } else {
                    write!(f, "{}", fl)
                }
            }
            Self::Text(s) => write!(f, "{}", s),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Self::Shared(cell) => match cell.try_borrow() {
                Ok(inner) => write!(f, "&{}", inner),
                Err(_) => write!(f, "&<borrowed>"),
            },
            Self::Resource(resource) => write!(f, "{}", resource),
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

impl From<Resource> for Value {
    fn from(resource: Resource) -> Self {
        Self::Resource(resource)
    }
}

/// An opaque handle to something outside the object graph (a socket, a file
/// descriptor, a lock). Clones share the handle; a deep copy is refused.
#[derive(Debug, Clone)]
pub struct Resource {
    name: Rc<str>,
}

impl Resource {
    pub fn new(name: &str) -> Self {
        Self { name: Rc::from(name) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Duplicate for Resource {
    fn duplicate_in(&self, copier: &mut Copier) -> Result<Self> {
        match copier.depth() {
            CopyDepth::Shallow => Ok(self.clone()),
            CopyDepth::Deep => Err(MementoError::CopyError(format!(
                "resource '{}' cannot be deep copied",
                self.name
            ))),
        }
    }
}

impl PartialEq for Resource {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.name, &other.name)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<resource {}>", self.name)
    }
}

impl Serialize for Resource {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
