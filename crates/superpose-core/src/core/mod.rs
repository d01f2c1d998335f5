//! # Core Module
//!
//! Fundamental building blocks for structural comparison: the molecular data
//! model and coordinate-file I/O.
//!
//! ## Overview
//!
//! This module provides the passive data structures the rest of the crate
//! operates on. A [`models::structure::Structure`] is an ordered collection of
//! labeled atomic coordinates; a [`models::structure::ChainSlice`] is the
//! deduplicated, per-residue view of one of its chains that the alignment
//! engine consumes.
//!
//! - **Molecular Representation** ([`models`]) - Atoms, structures, and chain
//!   slices with their selection and deduplication rules
//! - **File I/O** ([`io`]) - Fixed-column PDB `ATOM` record parsing

pub mod io;
pub mod models;
