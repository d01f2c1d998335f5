use crate::cli::ServeArgs;
use crate::error::{CliError, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Fully resolved service configuration: defaults, overlaid by the TOML
/// config file, overlaid by CLI flags.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub fetch_base_url: String,
    pub fetch_timeout: Duration,
    pub crosscheck_command: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            fetch_base_url: crate::fetch::RcsbProvider::DEFAULT_BASE_URL.to_string(),
            fetch_timeout: crate::fetch::RcsbProvider::DEFAULT_TIMEOUT,
            crosscheck_command: None,
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct PartialServerConfig {
    bind: Option<SocketAddr>,
    #[serde(default)]
    fetch: PartialFetchConfig,
    #[serde(default)]
    crosscheck: PartialCrosscheckConfig,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialFetchConfig {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialCrosscheckConfig {
    command: Option<PathBuf>,
}

impl PartialServerConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading service configuration file.");
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| CliError::Config(format!("invalid config file '{}': {}", path.display(), e)))
    }

    /// Resolves the final configuration, giving CLI flags precedence over the
    /// file and the file precedence over built-in defaults.
    pub fn merge_with_cli(self, args: &ServeArgs) -> ServerConfig {
        let defaults = ServerConfig::default();
        ServerConfig {
            bind: args.bind.or(self.bind).unwrap_or(defaults.bind),
            fetch_base_url: args
                .base_url
                .clone()
                .or(self.fetch.base_url)
                .unwrap_or(defaults.fetch_base_url),
            fetch_timeout: args
                .fetch_timeout_secs
                .or(self.fetch.timeout_secs)
                .map(Duration::from_secs)
                .unwrap_or(defaults.fetch_timeout),
            crosscheck_command: args
                .crosscheck
                .clone()
                .or(self.crosscheck.command)
                .or(defaults.crosscheck_command),
        }
    }
}
