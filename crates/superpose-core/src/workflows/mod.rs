//! High-level entry points tying the data model and the engine together.

pub mod align;
