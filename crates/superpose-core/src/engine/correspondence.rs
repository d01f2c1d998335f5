use super::error::EngineError;
use crate::core::models::structure::ChainSlice;
use nalgebra::Point3;
use serde::Serialize;

/// Minimum number of matched residues for a well-defined rigid rotation.
///
/// Three non-collinear points are the minimum that pins down a rotation in
/// 3D; with fewer (or all-collinear) pairs the optimal rotation is ambiguous.
pub const MIN_PAIRS: usize = 3;

/// One matched residue between two chain slices: the shared residue number
/// and the retained coordinate from each side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CorrespondencePair {
    pub residue_number: isize,
    pub point_a: Point3<f64>,
    pub point_b: Point3<f64>,
}

/// Builds the one-to-one matched pair list between two chain slices.
///
/// Pairs cover exactly the residue numbers present in both slices; emission
/// follows slice A's residue order restricted to that intersection, so the
/// result is deterministic regardless of container iteration order.
///
/// # Errors
///
/// Returns [`EngineError::InsufficientCorrespondence`] when fewer than
/// [`MIN_PAIRS`] residues are shared.
pub fn build(a: &ChainSlice, b: &ChainSlice) -> Result<Vec<CorrespondencePair>, EngineError> {
    let pairs: Vec<CorrespondencePair> = a
        .iter()
        .filter_map(|(residue_number, point_a)| {
            b.position_of(residue_number).map(|point_b| CorrespondencePair {
                residue_number,
                point_a: *point_a,
                point_b: *point_b,
            })
        })
        .collect();

    if pairs.len() < MIN_PAIRS {
        return Err(EngineError::InsufficientCorrespondence {
            chain_a: a.chain_id(),
            chain_b: b.chain_id(),
            found: pairs.len(),
            required: MIN_PAIRS,
        });
    }

    Ok(pairs)
}
