use crate::core::models::atom::Atom;
use crate::core::models::structure::Structure;
use nalgebra::Point3;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: PdbParseErrorKind,
    },
}

#[derive(Debug, Error)]
pub enum PdbParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Line is too short for ATOM record (must be at least 54 chars)")]
    LineTooShort,
}

/// Which atoms of an `ATOM` record stream end up in the [`Structure`].
///
/// Alignment needs one representative point per residue; the alpha-carbon
/// filter gives exactly that for proteins and is the default. `All` keeps
/// every atom and relies on the chain-slice dedup rule to pick the first
/// atom of each residue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AtomFilter {
    /// Keep only alpha-carbon ("CA") atoms.
    #[default]
    AlphaCarbon,
    /// Keep every `ATOM` record.
    All,
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end).unwrap_or("").trim()
}

/// Reader for PDB-format coordinate files.
///
/// Parses fixed-column `ATOM` records. Conformer subsetting happens here, so
/// downstream consumers see a single self-consistent model:
///
/// - only the first `MODEL` of a multi-model file is read (`ENDMDL` stops parsing),
/// - alternate-location indicators other than blank or 'A' are skipped,
/// - `HETATM` records are ignored.
pub struct PdbFile;

impl PdbFile {
    /// Reads a structure from a buffered reader, tagging it with `id`.
    ///
    /// # Errors
    ///
    /// Returns a [`PdbError`] carrying the offending line number when an
    /// `ATOM` record is malformed, or on underlying I/O failure. A file with
    /// no matching `ATOM` record yields an empty structure rather than an
    /// error; emptiness is diagnosed later as `NoChainFound`.
    pub fn read_from(
        reader: &mut impl BufRead,
        id: &str,
        filter: AtomFilter,
    ) -> Result<Structure, PdbError> {
        let mut atoms = Vec::new();

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;

            let record_type = slice_and_trim(&line, 0, 6);
            match record_type {
                // First model only.
                "ENDMDL" => break,
                "ATOM" => {
                    if line.len() < 54 {
                        return Err(PdbError::Parse {
                            line: line_num,
                            kind: PdbParseErrorKind::LineTooShort,
                        });
                    }

                    let alt_loc = line.as_bytes()[16] as char;
                    if alt_loc != ' ' && alt_loc != 'A' {
                        continue;
                    }

                    let name = slice_and_trim(&line, 12, 16);
                    if filter == AtomFilter::AlphaCarbon && name != "CA" {
                        continue;
                    }

                    let chain_id = line.as_bytes()[21] as char;

                    let residue_str = slice_and_trim(&line, 22, 26);
                    let residue_number: isize =
                        residue_str.parse().map_err(|_| PdbError::Parse {
                            line: line_num,
                            kind: PdbParseErrorKind::InvalidInt {
                                columns: "23-26".into(),
                                value: residue_str.into(),
                            },
                        })?;

                    let x = Self::parse_coord(&line, line_num, 30, 38)?;
                    let y = Self::parse_coord(&line, line_num, 38, 46)?;
                    let z = Self::parse_coord(&line, line_num, 46, 54)?;

                    atoms.push(Atom::new(
                        name,
                        chain_id,
                        residue_number,
                        Point3::new(x, y, z),
                    ));
                }
                _ => {}
            }
        }

        Ok(Structure::new(id, atoms))
    }

    /// Reads a structure from a file path, using the file stem as its id.
    pub fn read_from_path(path: &Path, filter: AtomFilter) -> Result<Structure, PdbError> {
        let id = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        let mut reader = BufReader::new(File::open(path)?);
        Self::read_from(&mut reader, &id, filter)
    }

    /// Reads a structure from in-memory PDB text.
    pub fn read_from_str(text: &str, id: &str, filter: AtomFilter) -> Result<Structure, PdbError> {
        Self::read_from(&mut text.as_bytes(), id, filter)
    }

    fn parse_coord(
        line: &str,
        line_num: usize,
        start: usize,
        end: usize,
    ) -> Result<f64, PdbError> {
        let value = slice_and_trim(line, start, end);
        value.parse().map_err(|_| PdbError::Parse {
            line: line_num,
            kind: PdbParseErrorKind::InvalidFloat {
                columns: format!("{}-{}", start + 1, end),
                value: value.into(),
            },
        })
    }
}
