use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use superpose::core::io::pdb::{AtomFilter, PdbError, PdbFile};
use superpose::core::models::structure::Structure;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Structure id '{id}' is not a valid identifier")]
    InvalidId { id: String },

    #[error("Structure '{id}' not found in the remote archive")]
    NotFound { id: String },

    #[error("Fetch of structure '{id}' timed out after {seconds} s")]
    Timeout { id: String, seconds: u64 },

    #[error("Network error fetching structure '{id}': {source}")]
    Http {
        id: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to parse fetched structure '{id}': {source}")]
    Parse {
        id: String,
        #[source]
        source: PdbError,
    },
}

/// Source of structures keyed by an opaque identifier.
///
/// The returned structure must carry atoms tagged with chain id, residue
/// number, and 3D coordinates, already subset to a single conformer/model.
pub trait StructureProvider: Send + Sync {
    fn fetch(&self, id: &str) -> impl Future<Output = Result<Structure, FetchError>> + Send;
}

/// Downloads PDB-format coordinate files from the RCSB archive (or any
/// mirror exposing the same `{base_url}/{id}.pdb` layout).
///
/// Every request is bounded by `timeout`; a fetch that does not complete
/// within it fails with [`FetchError::Timeout`] instead of blocking the
/// caller indefinitely.
#[derive(Debug, Clone)]
pub struct RcsbProvider {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl RcsbProvider {
    pub const DEFAULT_BASE_URL: &'static str = "https://files.rcsb.org/download";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            timeout,
        }
    }
}

impl Default for RcsbProvider {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BASE_URL, Self::DEFAULT_TIMEOUT)
    }
}

impl StructureProvider for RcsbProvider {
    fn fetch(&self, id: &str) -> impl Future<Output = Result<Structure, FetchError>> + Send {
        async move {
            if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(FetchError::InvalidId { id: id.to_string() });
            }

            let url = format!(
                "{}/{}.pdb",
                self.base_url.trim_end_matches('/'),
                id.to_lowercase()
            );
            debug!(%url, "Requesting structure from remote archive.");

            let classify = |source: reqwest::Error| {
                if source.is_timeout() {
                    FetchError::Timeout {
                        id: id.to_string(),
                        seconds: self.timeout.as_secs(),
                    }
                } else {
                    FetchError::Http {
                        id: id.to_string(),
                        source,
                    }
                }
            };

            let response = self
                .client
                .get(&url)
                .timeout(self.timeout)
                .send()
                .await
                .map_err(classify)?;
            if response.status() == reqwest::StatusCode::NOT_FOUND {
                return Err(FetchError::NotFound { id: id.to_string() });
            }
            let response = response.error_for_status().map_err(classify)?;
            let body = response.text().await.map_err(classify)?;

            let structure =
                PdbFile::read_from_str(&body, id, AtomFilter::AlphaCarbon).map_err(|source| {
                    FetchError::Parse {
                        id: id.to_string(),
                        source,
                    }
                })?;
            info!(id, atoms = structure.atoms.len(), "Fetched structure.");
            Ok(structure)
        }
    }
}

type FetchOutcome = Result<Arc<Structure>, Arc<FetchError>>;

enum Flight {
    Ready(Arc<Structure>),
    Pending(watch::Receiver<Option<FetchOutcome>>),
}

enum Role {
    Hit(Arc<Structure>),
    Follower(watch::Receiver<Option<FetchOutcome>>),
    Leader(watch::Sender<Option<FetchOutcome>>),
}

/// Singleflight cache over a [`StructureProvider`].
///
/// Guarantees at-most-one in-flight fetch per structure id: concurrent
/// requests for an id already being fetched await the same outcome, sharing
/// its result or its failure instead of issuing duplicate network calls.
/// Successful fetches are retained for the lifetime of the cache; failures
/// are published to the waiters of the flight that produced them and then
/// forgotten, so the next request retries.
///
/// The map lock is never held across an await point.
pub struct FetchCache<P> {
    provider: P,
    flights: Mutex<HashMap<String, Flight>>,
}

struct FlightGuard<'a> {
    flights: &'a Mutex<HashMap<String, Flight>>,
    id: &'a str,
    armed: bool,
}

impl Drop for FlightGuard<'_> {
    // Removes the pending entry when the leading fetch is cancelled, so
    // later callers start a fresh flight instead of waiting forever.
    fn drop(&mut self) {
        if self.armed {
            self.flights.lock().unwrap().remove(self.id);
        }
    }
}

impl<P: StructureProvider> FetchCache<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            flights: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the structure for `id`, fetching it at most once concurrently.
    pub async fn get(&self, id: &str) -> FetchOutcome {
        loop {
            let role = {
                let mut flights = self.flights.lock().unwrap();
                match flights.get(id) {
                    Some(Flight::Ready(structure)) => Role::Hit(structure.clone()),
                    Some(Flight::Pending(rx)) => Role::Follower(rx.clone()),
                    None => {
                        let (tx, rx) = watch::channel(None);
                        flights.insert(id.to_string(), Flight::Pending(rx));
                        Role::Leader(tx)
                    }
                }
            };

            match role {
                Role::Hit(structure) => return Ok(structure),
                Role::Follower(mut rx) => {
                    let outcome = loop {
                        if let Some(outcome) = rx.borrow_and_update().clone() {
                            break Some(outcome);
                        }
                        if rx.changed().await.is_err() {
                            break None;
                        }
                    };
                    match outcome {
                        Some(outcome) => return outcome,
                        // The leader was cancelled before publishing; retry.
                        None => continue,
                    }
                }
                Role::Leader(tx) => {
                    let mut guard = FlightGuard {
                        flights: &self.flights,
                        id,
                        armed: true,
                    };
                    let outcome: FetchOutcome = match self.provider.fetch(id).await {
                        Ok(structure) => Ok(Arc::new(structure)),
                        Err(error) => Err(Arc::new(error)),
                    };
                    {
                        let mut flights = self.flights.lock().unwrap();
                        match &outcome {
                            Ok(structure) => {
                                flights
                                    .insert(id.to_string(), Flight::Ready(structure.clone()));
                            }
                            Err(_) => {
                                flights.remove(id);
                            }
                        }
                    }
                    guard.armed = false;
                    let _ = tx.send(Some(outcome.clone()));
                    return outcome;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use superpose::core::models::atom::Atom;

    struct MockProvider {
        calls: AtomicUsize,
        failures_before_success: usize,
        delay: Duration,
    }

    impl MockProvider {
        fn new(failures_before_success: usize, delay: Duration) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                failures_before_success,
                delay,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl StructureProvider for MockProvider {
        fn fetch(&self, id: &str) -> impl Future<Output = Result<Structure, FetchError>> + Send {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let should_fail = call < self.failures_before_success;
            async move {
                tokio::time::sleep(self.delay).await;
                if should_fail {
                    Err(FetchError::NotFound { id: id.to_string() })
                } else {
                    Ok(Structure::new(
                        id,
                        vec![Atom::new("CA", 'A', 1, nalgebra::Point3::origin())],
                    ))
                }
            }
        }
    }

    #[tokio::test]
    async fn concurrent_requests_share_a_single_fetch() {
        let cache = Arc::new(FetchCache::new(MockProvider::new(
            0,
            Duration::from_millis(50),
        )));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.get("1abc").await })
            })
            .collect();

        let mut structures = Vec::new();
        for handle in handles {
            structures.push(handle.await.unwrap().unwrap());
        }
        assert_eq!(cache.provider.calls(), 1);
        for pair in structures.windows(2) {
            assert!(Arc::ptr_eq(&pair[0], &pair[1]));
        }
    }

    #[tokio::test]
    async fn successful_fetch_is_cached_across_requests() {
        let cache = FetchCache::new(MockProvider::new(0, Duration::ZERO));
        let first = cache.get("1abc").await.unwrap();
        let second = cache.get("1abc").await.unwrap();
        assert_eq!(cache.provider.calls(), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn distinct_ids_fetch_independently() {
        let cache = FetchCache::new(MockProvider::new(0, Duration::ZERO));
        cache.get("1abc").await.unwrap();
        cache.get("2xyz").await.unwrap();
        assert_eq!(cache.provider.calls(), 2);
    }

    #[tokio::test]
    async fn failure_is_not_cached_beyond_its_flight() {
        let cache = FetchCache::new(MockProvider::new(1, Duration::ZERO));
        let first = cache.get("1abc").await;
        assert!(matches!(
            first.unwrap_err().as_ref(),
            FetchError::NotFound { .. }
        ));
        let second = cache.get("1abc").await;
        assert!(second.is_ok());
        assert_eq!(cache.provider.calls(), 2);
    }

    #[tokio::test]
    async fn concurrent_requests_share_the_failure_of_their_flight() {
        let cache = Arc::new(FetchCache::new(MockProvider::new(
            usize::MAX,
            Duration::from_millis(50),
        )));
        let handles: Vec<_> = (0..3)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.get("1abc").await })
            })
            .collect();
        for handle in handles {
            assert!(handle.await.unwrap().is_err());
        }
        assert_eq!(cache.provider.calls(), 1);
    }
}
