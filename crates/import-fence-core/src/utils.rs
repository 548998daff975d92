//! Utility modules shared by the checker components.

pub mod paths;

#[doc(inline)]
pub use paths::{normalize, prefix_matches};
