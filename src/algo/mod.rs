//! Mesh processing algorithms.
//!
//! The crate's algorithmic core lives here:
//!
//! - **Simplification**: quadric-error-metric edge collapse with exact,
//!   stack-ordered undo and level-of-detail control

pub mod simplify;
