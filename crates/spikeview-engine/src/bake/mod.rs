//! Dirty-tracked bake pipeline.
//!
//! Attribute setters record *what* changed ([`DirtySet`]); the next frame's
//! draw decides *when* it reaches the GPU by running the handlers declared in
//! a [`BakeRegistry`]. Handlers run in lexicographic name order so dependent
//! uploads (cluster count before colors) are reproducible.

mod dirty;
mod registry;
mod visual;

pub use dirty::DirtySet;
pub use registry::{BakeHandler, BakeRegistry};
pub use visual::{BakeVisual, DrawOutcome, Drawable};
