//! Domain models for prescription versions.

mod catalog;
mod medicine;

pub use catalog::*;
pub use medicine::*;
