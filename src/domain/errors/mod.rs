//! Domain error types.

mod load_error;

pub use load_error::{LoadError, LoadErrorKind, LoadResult};
