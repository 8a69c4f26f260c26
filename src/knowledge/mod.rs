//! Organ recommendations knowledge base.
//!
//! Provides read-only access to curated per-organ data:
//! - Known recommendations (strong evidence)
//! - Potential recommendations (mixed or limited evidence)
//! - Debunked claims

mod legacy;
mod repository;
mod source;
mod types;

pub use legacy::*;
pub use repository::*;
pub use source::*;
pub use types::*;
