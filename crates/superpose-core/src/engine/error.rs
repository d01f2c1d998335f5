use crate::core::models::structure::ChainSelection;
use thiserror::Error;

/// The failure taxonomy of the alignment engine.
///
/// Every variant is terminal for the request that produced it: the engine
/// never retries and never returns a partial or approximate result alongside
/// an error. Variants carry enough context to tell data problems (bad chain,
/// mismatched numbering) apart from malformed input.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("No chain found in structure '{structure_id}' for selection {selection:?}")]
    NoChainFound {
        structure_id: String,
        selection: ChainSelection,
    },

    #[error(
        "Insufficient correspondence between chains '{chain_a}' and '{chain_b}': \
         {found} shared residue(s), need at least {required}"
    )]
    InsufficientCorrespondence {
        chain_a: char,
        chain_b: char,
        found: usize,
        required: usize,
    },

    #[error("Degenerate input: {0}")]
    DegenerateInput(String),
}
