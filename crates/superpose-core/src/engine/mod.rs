//! # Engine Module
//!
//! The computational core of the alignment: residue correspondence between two
//! chain slices and the Kabsch superposition that follows. Every function in
//! this layer is pure; given the same inputs it produces the same outputs,
//! which is what makes request-level parallelism in callers trivially safe.

pub mod correspondence;
pub mod error;
pub mod superposition;
