use nalgebra::Point3;

/// Represents a single labeled atomic coordinate within a macromolecular model.
///
/// An atom is an immutable record produced by the I/O layer (or a remote fetch
/// collaborator) and is never mutated after creation. The `chain_id` and
/// `residue_number` fields are treated purely as opaque correspondence keys by
/// the alignment engine; no chemical meaning is attached to them here.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The name of the atom as it appeared in the source record (e.g., "CA").
    pub name: String,
    /// The single-character identifier of the chain this atom belongs to.
    pub chain_id: char,
    /// The residue sequence number within the chain.
    pub residue_number: isize,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
}

impl Atom {
    /// Creates a new `Atom` record.
    ///
    /// # Arguments
    ///
    /// * `name` - The atom name (e.g., "CA", "N").
    /// * `chain_id` - The chain identifier character.
    /// * `residue_number` - The residue sequence number.
    /// * `position` - The 3D coordinates of the atom.
    pub fn new(name: &str, chain_id: char, residue_number: isize, position: Point3<f64>) -> Self {
        Self {
            name: name.to_string(),
            chain_id,
            residue_number,
            position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_atom_carries_all_fields() {
        let atom = Atom::new("CA", 'A', 42, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(atom.name, "CA");
        assert_eq!(atom.chain_id, 'A');
        assert_eq!(atom.residue_number, 42);
        assert_eq!(atom.position, Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn atom_equality_and_clone_works() {
        let atom1 = Atom::new("N", 'B', -1, Point3::new(0.0, 0.0, 0.0));
        let atom2 = atom1.clone();
        assert_eq!(atom1, atom2);
    }
}
