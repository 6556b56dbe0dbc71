//! Human-readable numbering for documents and stock movements.
//!
//! Numbers produced here are proposals: the caller may edit them before
//! committing, and nothing downstream enforces uniqueness.

pub mod policy;

pub use policy::{NumberingPolicy, NumberingScheme, next_number, next_number_with};
