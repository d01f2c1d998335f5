//! Data structures representing fetched atomic coordinate data.
//!
//! The model is intentionally flat: a [`structure::Structure`] owns an ordered
//! `Vec` of [`atom::Atom`] records exactly as they appeared in the source
//! file. All interpretation (chain selection, per-residue deduplication)
//! happens when a [`structure::ChainSlice`] is derived from it.

pub mod atom;
pub mod structure;
