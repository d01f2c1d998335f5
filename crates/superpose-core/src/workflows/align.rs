use crate::core::models::structure::{ChainSelection, Structure};
use crate::engine::correspondence;
use crate::engine::error::EngineError;
use crate::engine::superposition::{self, SuperpositionResult};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Caller-supplied knobs for an alignment run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct AlignOptions {
    /// Chain selection for the first structure.
    pub chain_a: ChainSelection,
    /// Chain selection for the second structure.
    pub chain_b: ChainSelection,
}

/// The outcome of a successful alignment.
#[derive(Debug, Clone, Serialize)]
pub struct AlignmentReport {
    /// Chain chosen from the first structure.
    pub chain_a: char,
    /// Chain chosen from the second structure.
    pub chain_b: char,
    /// Number of residues matched between the two chains.
    pub matched_residues: usize,
    /// The optimal rigid-body superposition and its RMSD.
    pub superposition: SuperpositionResult,
}

/// Runs the full alignment: chain selection and dedup on each structure,
/// residue correspondence, Kabsch superposition.
///
/// The run either fully succeeds or fails atomically with a typed
/// [`EngineError`]; no partial result is ever produced and nothing is retried
/// here. Both structures are borrowed for the duration of the call only.
#[instrument(skip_all, name = "alignment_workflow", fields(id_a = %structure_a.id, id_b = %structure_b.id))]
pub fn run(
    structure_a: &Structure,
    structure_b: &Structure,
    options: &AlignOptions,
) -> Result<AlignmentReport, EngineError> {
    let slice_a = structure_a
        .select_chain(options.chain_a)
        .ok_or_else(|| EngineError::NoChainFound {
            structure_id: structure_a.id.clone(),
            selection: options.chain_a,
        })?;
    let slice_b = structure_b
        .select_chain(options.chain_b)
        .ok_or_else(|| EngineError::NoChainFound {
            structure_id: structure_b.id.clone(),
            selection: options.chain_b,
        })?;
    info!(
        chain_a = %slice_a.chain_id(),
        residues_a = slice_a.len(),
        chain_b = %slice_b.chain_id(),
        residues_b = slice_b.len(),
        "Selected chains for alignment."
    );

    let pairs = correspondence::build(&slice_a, &slice_b)?;
    let superposition = superposition::superpose(&pairs)?;
    info!(
        matched = pairs.len(),
        rmsd = superposition.rmsd,
        "Alignment complete."
    );

    Ok(AlignmentReport {
        chain_a: slice_a.chain_id(),
        chain_b: slice_b.chain_id(),
        matched_residues: pairs.len(),
        superposition,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use nalgebra::{Point3, Rotation3, Vector3};

    const TOL: f64 = 1e-6;

    fn structure(id: &str, chain: char, residues: &[(isize, [f64; 3])]) -> Structure {
        let atoms = residues
            .iter()
            .map(|&(r, [x, y, z])| Atom::new("CA", chain, r, Point3::new(x, y, z)))
            .collect();
        Structure::new(id, atoms)
    }

    fn sample(id: &str, chain: char) -> Structure {
        structure(
            id,
            chain,
            &[
                (1, [0.0, 0.0, 0.0]),
                (2, [1.5, 0.1, -0.4]),
                (3, [-0.2, 2.3, 0.9]),
                (4, [1.1, -1.0, 1.6]),
            ],
        )
    }

    #[test]
    fn self_alignment_reports_zero_rmsd() {
        let a = sample("1abc", 'A');
        let b = sample("1abc", 'A');
        let report = run(&a, &b, &AlignOptions::default()).unwrap();
        assert_eq!(report.matched_residues, 4);
        assert!(report.superposition.rmsd.abs() < TOL);
    }

    #[test]
    fn alignment_is_symmetric_in_its_arguments() {
        let a = sample("1abc", 'A');
        let mut b = sample("2xyz", 'B');
        let motion = Rotation3::from_euler_angles(0.4, 0.2, -0.9);
        for atom in &mut b.atoms {
            atom.position = motion * atom.position + Vector3::new(3.0, -1.0, 2.0);
            atom.position.x += 0.05 * atom.residue_number as f64;
        }
        let forward = run(&a, &b, &AlignOptions::default()).unwrap();
        let backward = run(&b, &a, &AlignOptions::default()).unwrap();
        assert!((forward.superposition.rmsd - backward.superposition.rmsd).abs() < TOL);
    }

    #[test]
    fn partially_overlapping_numbering_uses_the_intersection() {
        let a = structure(
            "a",
            'A',
            &[
                (1, [0.0, 0.0, 0.0]),
                (2, [1.0, 0.0, 0.0]),
                (3, [0.0, 1.0, 0.0]),
                (4, [0.0, 0.0, 1.0]),
            ],
        );
        let b = structure(
            "b",
            'A',
            &[
                (2, [1.0, 0.0, 0.0]),
                (3, [0.0, 1.0, 0.0]),
                (4, [0.0, 0.0, 1.0]),
                (5, [9.0, 9.0, 9.0]),
            ],
        );
        let report = run(&a, &b, &AlignOptions::default()).unwrap();
        assert_eq!(report.matched_residues, 3);
        assert!(report.superposition.rmsd.abs() < TOL);
    }

    #[test]
    fn empty_structure_fails_with_no_chain_found() {
        let a = Structure::new("empty", Vec::new());
        let b = sample("1abc", 'A');
        let err = run(&a, &b, &AlignOptions::default()).unwrap_err();
        match err {
            EngineError::NoChainFound { structure_id, .. } => assert_eq!(structure_id, "empty"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn explicit_chain_selection_is_honored() {
        let mut a = sample("1abc", 'A');
        a.atoms.extend(sample("", 'C').atoms);
        let b = sample("2xyz", 'C');
        let options = AlignOptions {
            chain_a: ChainSelection::Explicit('C'),
            chain_b: ChainSelection::FirstSeen,
        };
        let report = run(&a, &b, &options).unwrap();
        assert_eq!(report.chain_a, 'C');
        assert_eq!(report.chain_b, 'C');
        assert!(report.superposition.rmsd.abs() < TOL);
    }

    #[test]
    fn explicit_selection_of_absent_chain_fails() {
        let a = sample("1abc", 'A');
        let b = sample("2xyz", 'A');
        let options = AlignOptions {
            chain_a: ChainSelection::Explicit('Q'),
            chain_b: ChainSelection::FirstSeen,
        };
        let err = run(&a, &b, &options).unwrap_err();
        assert!(matches!(err, EngineError::NoChainFound { .. }));
    }

    #[test]
    fn two_shared_residues_fail_with_insufficient_correspondence() {
        let a = structure(
            "a",
            'A',
            &[(1, [0.0, 0.0, 0.0]), (2, [1.0, 0.0, 0.0]), (8, [0.0, 1.0, 0.0])],
        );
        let b = structure(
            "b",
            'A',
            &[(1, [0.0, 0.0, 0.0]), (2, [1.0, 0.0, 0.0]), (9, [0.0, 1.0, 0.0])],
        );
        let err = run(&a, &b, &AlignOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InsufficientCorrespondence { found: 2, .. }
        ));
    }
}
