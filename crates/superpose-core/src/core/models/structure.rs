use super::atom::Atom;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Policy for choosing which chain of a structure participates in alignment.
///
/// The historical default is "first seen": the chain of the first atom in file
/// order. That rule is an ordering accident rather than a biological
/// guarantee, so callers who know which chains are comparable should pass
/// [`ChainSelection::Explicit`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChainSelection {
    /// Use the chain of the first atom encountered in atom order.
    #[default]
    FirstSeen,
    /// Use the chain with the given identifier, failing if it is absent.
    Explicit(char),
}

/// An in-memory macromolecular model: an identifier plus its atoms in file order.
///
/// A structure is created per alignment request by the fetch collaborator or
/// the PDB reader and is owned exclusively by that request. It is a passive
/// container; chain selection and residue deduplication happen when a
/// [`ChainSlice`] is derived via [`Structure::select_chain`].
#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
    /// Opaque identifier of the model (e.g., a PDB ID or a file stem).
    pub id: String,
    /// All atoms of the model, in the order they appeared in the source.
    pub atoms: Vec<Atom>,
}

/// The per-residue view of one chain of a [`Structure`].
///
/// Holds at most one coordinate per residue number: when a residue number
/// repeats within the chain (alternate conformations, insertion codes), the
/// first-encountered atom is retained. Residues keep the order in which they
/// first appeared, which makes downstream correspondence emission
/// deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainSlice {
    chain_id: char,
    residues: Vec<(isize, Point3<f64>)>,
    index: HashMap<isize, usize>,
}

impl Structure {
    /// Creates a structure from an identifier and its atoms.
    pub fn new(id: impl Into<String>, atoms: Vec<Atom>) -> Self {
        Self {
            id: id.into(),
            atoms,
        }
    }

    /// Returns the distinct chain identifiers in order of first appearance.
    pub fn chain_ids(&self) -> Vec<char> {
        let mut seen = HashSet::new();
        self.atoms
            .iter()
            .filter(|atom| seen.insert(atom.chain_id))
            .map(|atom| atom.chain_id)
            .collect()
    }

    /// Derives the [`ChainSlice`] for the chain designated by `selection`.
    ///
    /// Applies the dedup-by-residue-number rule: the first atom seen for each
    /// residue number wins.
    ///
    /// # Return
    ///
    /// Returns `None` when the structure has no atoms, or when an explicitly
    /// requested chain does not occur in it. Callers translate this into the
    /// `NoChainFound` failure of the alignment taxonomy.
    pub fn select_chain(&self, selection: ChainSelection) -> Option<ChainSlice> {
        let chain_id = match selection {
            ChainSelection::FirstSeen => self.atoms.first()?.chain_id,
            ChainSelection::Explicit(id) => {
                if self.atoms.iter().any(|atom| atom.chain_id == id) {
                    id
                } else {
                    return None;
                }
            }
        };

        let mut residues = Vec::new();
        let mut index = HashMap::new();
        for atom in self.atoms.iter().filter(|atom| atom.chain_id == chain_id) {
            if let std::collections::hash_map::Entry::Vacant(entry) =
                index.entry(atom.residue_number)
            {
                entry.insert(residues.len());
                residues.push((atom.residue_number, atom.position));
            }
        }

        Some(ChainSlice {
            chain_id,
            residues,
            index,
        })
    }
}

impl ChainSlice {
    /// The identifier of the chain this slice was built from.
    pub fn chain_id(&self) -> char {
        self.chain_id
    }

    /// Number of distinct residues in the slice.
    pub fn len(&self) -> usize {
        self.residues.len()
    }

    /// Returns `true` if the slice holds no residues.
    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    /// Iterates over `(residue_number, position)` pairs in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (isize, &Point3<f64>)> {
        self.residues.iter().map(|(number, pos)| (*number, pos))
    }

    /// Looks up the retained coordinate for a residue number, if present.
    pub fn position_of(&self, residue_number: isize) -> Option<&Point3<f64>> {
        self.index
            .get(&residue_number)
            .map(|&i| &self.residues[i].1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom(name: &str, chain: char, residue: isize, x: f64) -> Atom {
        Atom::new(name, chain, residue, Point3::new(x, 0.0, 0.0))
    }

    #[test]
    fn chain_ids_preserve_first_appearance_order() {
        let structure = Structure::new(
            "test",
            vec![
                atom("CA", 'B', 1, 0.0),
                atom("CA", 'A', 1, 1.0),
                atom("CA", 'B', 2, 2.0),
            ],
        );
        assert_eq!(structure.chain_ids(), vec!['B', 'A']);
    }

    #[test]
    fn first_seen_selects_chain_of_first_atom() {
        let structure = Structure::new(
            "test",
            vec![atom("CA", 'C', 5, 0.0), atom("CA", 'A', 1, 1.0)],
        );
        let slice = structure.select_chain(ChainSelection::FirstSeen).unwrap();
        assert_eq!(slice.chain_id(), 'C');
        assert_eq!(slice.len(), 1);
    }

    #[test]
    fn explicit_selection_picks_requested_chain() {
        let structure = Structure::new(
            "test",
            vec![atom("CA", 'A', 1, 0.0), atom("CA", 'B', 7, 3.0)],
        );
        let slice = structure
            .select_chain(ChainSelection::Explicit('B'))
            .unwrap();
        assert_eq!(slice.chain_id(), 'B');
        assert_eq!(slice.position_of(7), Some(&Point3::new(3.0, 0.0, 0.0)));
    }

    #[test]
    fn explicit_selection_of_missing_chain_yields_none() {
        let structure = Structure::new("test", vec![atom("CA", 'A', 1, 0.0)]);
        assert!(structure.select_chain(ChainSelection::Explicit('Z')).is_none());
    }

    #[test]
    fn empty_structure_yields_none() {
        let structure = Structure::new("empty", Vec::new());
        assert!(structure.select_chain(ChainSelection::FirstSeen).is_none());
    }

    #[test]
    fn duplicate_residue_numbers_keep_first_occurrence() {
        let structure = Structure::new(
            "test",
            vec![
                atom("CA", 'A', 10, 1.0),
                atom("CA", 'A', 10, 2.0),
                atom("CA", 'A', 11, 3.0),
            ],
        );
        let slice = structure.select_chain(ChainSelection::FirstSeen).unwrap();
        assert_eq!(slice.len(), 2);
        assert_eq!(slice.position_of(10), Some(&Point3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn iteration_follows_first_appearance_order() {
        let structure = Structure::new(
            "test",
            vec![
                atom("CA", 'A', 3, 0.0),
                atom("CA", 'A', 1, 1.0),
                atom("CA", 'A', 2, 2.0),
            ],
        );
        let slice = structure.select_chain(ChainSelection::FirstSeen).unwrap();
        let numbers: Vec<isize> = slice.iter().map(|(n, _)| n).collect();
        assert_eq!(numbers, vec![3, 1, 2]);
    }
}
