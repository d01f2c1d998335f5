use crate::fetch::{FetchCache, FetchError, StructureProvider};
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use superpose::engine::error::EngineError;
use superpose::workflows::align::{self, AlignOptions, AlignmentReport};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Fetch(Arc<FetchError>),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// A completed alignment plus the optional advisory cross-check summary.
///
/// The advisory field never replaces or suppresses the computed RMSD; it is
/// extra information from an independent tool, and its absence (tool not
/// configured, tool failed) is not an error.
#[derive(Debug)]
pub struct AlignmentOutcome {
    pub report: AlignmentReport,
    pub advisory: Option<String>,
}

/// Orchestrates fetch, chain selection, correspondence, and superposition for
/// a pair of structure identifiers.
///
/// Each call is independent and stateless apart from the fetch cache, so the
/// service supports unbounded request-level parallelism. Any component error
/// is surfaced as a typed [`ServiceError`]; an alignment either fully
/// succeeds or fails atomically.
pub struct AlignmentService<P> {
    cache: FetchCache<P>,
    options: AlignOptions,
    crosscheck_command: Option<PathBuf>,
}

impl<P: StructureProvider> AlignmentService<P> {
    pub fn new(provider: P, options: AlignOptions, crosscheck_command: Option<PathBuf>) -> Self {
        Self {
            cache: FetchCache::new(provider),
            options,
            crosscheck_command,
        }
    }

    /// Aligns the structures behind the two identifiers and reports the RMSD.
    ///
    /// The two fetches run concurrently; the first failure aborts the other
    /// wait and becomes the request's error.
    pub async fn align(&self, id_1: &str, id_2: &str) -> Result<AlignmentOutcome, ServiceError> {
        let (structure_1, structure_2) =
            tokio::try_join!(self.cache.get(id_1), self.cache.get(id_2))
                .map_err(ServiceError::Fetch)?;

        let report = align::run(&structure_1, &structure_2, &self.options)?;

        let advisory = match &self.crosscheck_command {
            Some(command) => run_crosscheck(command, id_1, id_2).await,
            None => None,
        };

        Ok(AlignmentOutcome { report, advisory })
    }
}

/// Invokes the independent cross-validation tool with the two structure ids
/// as positional arguments, capturing and logging its output.
///
/// The tool is advisory: whatever it reports is returned as a summary string
/// for the caller, and any failure to run it is logged and swallowed.
async fn run_crosscheck(command: &PathBuf, id_1: &str, id_2: &str) -> Option<String> {
    let output = match tokio::process::Command::new(command)
        .arg(id_1)
        .arg(id_2)
        .stdin(Stdio::null())
        .output()
        .await
    {
        Ok(output) => output,
        Err(error) => {
            warn!(command = %command.display(), %error, "Failed to run cross-check tool.");
            return None;
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    if output.status.success() {
        info!(
            command = %command.display(),
            stdout = %stdout.trim(),
            "Cross-check tool finished."
        );
    } else {
        warn!(
            command = %command.display(),
            status = %output.status,
            stderr = %stderr.trim(),
            "Cross-check tool reported a non-success status."
        );
    }

    let summary = stdout.trim().lines().next().unwrap_or("").to_string();
    Some(if summary.is_empty() {
        format!("cross-check exited with {}", output.status)
    } else {
        format!("cross-check ({}): {}", output.status, summary)
    })
}
