pub mod error;
pub mod record;
pub mod types;
pub mod value;

pub use error::{MementoError, Result};
pub use record::Record;
pub use types::CopyDepth;
pub use value::{Resource, Value};
