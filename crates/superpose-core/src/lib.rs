//! # Superpose Core Library
//!
//! A library for the structural comparison of macromolecular models: given two
//! collections of atomic coordinates identified by chain and residue, it
//! establishes a correspondence between matching residues, computes the optimal
//! rigid-body superposition of one point set onto the other, and reports the
//! root-mean-square deviation (RMSD) of the aligned coordinates.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture to ensure a
//! clear separation of concerns, making it modular, testable, and extensible.
//!
//! - **[`core`]: The Foundation.** Contains stateless data models ([`core::models::structure::Structure`],
//!   [`core::models::structure::ChainSlice`]) and I/O utilities for reading
//!   PDB-format coordinate files.
//!
//! - **[`engine`]: The Logic Core.** Implements the residue correspondence
//!   builder and the Kabsch superposition engine, together with the typed
//!   failure taxonomy ([`engine::error::EngineError`]). Everything in this
//!   layer is a pure function of its inputs.
//!
//! - **[`workflows`]: The Public API.** The highest-level, user-facing layer.
//!   It ties `engine` and `core` together to execute a complete alignment:
//!   chain selection, correspondence, superposition, RMSD.
//!
//! Fetching structures from a remote archive is deliberately *not* part of
//! this crate; callers hand in already-materialized [`core::models::structure::Structure`]
//! values, which keeps the whole library synchronous and free of network
//! concerns.

pub mod core;
pub mod engine;
pub mod workflows;
