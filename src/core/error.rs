use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MementoError {
    #[error("Copy error: {0}")]
    CopyError(String),

    #[error("Target borrowed: {0}")]
    TargetBorrowed(String),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),
}

pub type Result<T> = std::result::Result<T, MementoError>;

impl From<std::cell::BorrowMutError> for MementoError {
    fn from(err: std::cell::BorrowMutError) -> Self {
        Self::TargetBorrowed(err.to_string())
    }
}

impl From<std::cell::BorrowError> for MementoError {
    fn from(err: std::cell::BorrowError) -> Self {
        Self::TargetBorrowed(err.to_string())
    }
}
