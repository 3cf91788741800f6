use std::fmt;

/// How far a capture duplicates the state it reads.
///
/// `Shallow` copies the top-level state only, so nested shared values
/// (`Rc`, [`Value::Shared`](crate::Value::Shared)) stay aliased with the live
/// object. `Deep` duplicates nested values recursively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CopyDepth {
    #[default]
    Shallow,
    Deep,
}

impl CopyDepth {
    pub fn is_deep(&self) -> bool {
        matches!(self, CopyDepth::Deep)
    }
}

impl From<bool> for CopyDepth {
    fn from(deep: bool) -> Self {
        if deep { CopyDepth::Deep } else { CopyDepth::Shallow }
    }
}

impl fmt::Display for CopyDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CopyDepth::Shallow => write!(f, "SHALLOW"),
            CopyDepth::Deep => write!(f, "DEEP"),
        }
    }
}
