use crate::cli::ServeArgs;
use crate::config::{PartialServerConfig, ServerConfig};
use crate::error::Result;
use crate::fetch::RcsbProvider;
use crate::server;
use crate::service::AlignmentService;
use std::sync::Arc;
use superpose::workflows::align::AlignOptions;
use tracing::info;

pub async fn run(args: ServeArgs) -> Result<()> {
    let partial = match &args.config {
        Some(path) => PartialServerConfig::from_file(path)?,
        None => PartialServerConfig::default(),
    };
    let config: ServerConfig = partial.merge_with_cli(&args);
    info!(
        bind = %config.bind,
        base_url = %config.fetch_base_url,
        timeout_secs = config.fetch_timeout.as_secs(),
        crosscheck = config.crosscheck_command.is_some(),
        "Starting alignment service."
    );

    let provider = RcsbProvider::new(config.fetch_base_url.clone(), config.fetch_timeout);
    let service = Arc::new(AlignmentService::new(
        provider,
        AlignOptions::default(),
        config.crosscheck_command.clone(),
    ));

    server::serve(config.bind, service).await?;
    Ok(())
}
