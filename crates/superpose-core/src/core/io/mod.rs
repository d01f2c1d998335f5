//! Reading molecular coordinate data from external formats.
//!
//! Only the PDB format is supported; the parser extracts exactly the fields
//! the alignment engine needs (atom name, chain, residue number, coordinates)
//! and leaves everything else untouched.

pub mod pdb;
