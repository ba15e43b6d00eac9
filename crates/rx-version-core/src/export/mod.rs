//! Version summary export.

mod summary;

pub use summary::*;
