use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "superpose - structural comparison of macromolecular models: residue correspondence, optimal rigid-body superposition, and RMSD.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Align two structures and report the RMSD of the superposed coordinates.
    Align(AlignArgs),
    /// Run the HTTP alignment service.
    Serve(ServeArgs),
}

/// Arguments for the `align` subcommand.
#[derive(Args, Debug)]
pub struct AlignArgs {
    /// First structure: a local PDB file path or a 4-character structure id
    /// to fetch from the remote archive.
    #[arg(value_name = "INPUT1")]
    pub input_1: String,

    /// Second structure: a local PDB file path or a 4-character structure id.
    #[arg(value_name = "INPUT2")]
    pub input_2: String,

    /// Chain of the first structure to align (default: first chain seen).
    #[arg(long, value_name = "CHAIN")]
    pub chain_1: Option<char>,

    /// Chain of the second structure to align (default: first chain seen).
    #[arg(long, value_name = "CHAIN")]
    pub chain_2: Option<char>,

    /// Base URL for remote structure downloads.
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Abort a remote fetch that has not completed within this many seconds.
    #[arg(long, value_name = "SECS")]
    pub fetch_timeout_secs: Option<u64>,
}

/// Arguments for the `serve` subcommand.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Path to the service configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Address to listen on, overriding the config file.
    #[arg(short, long, value_name = "ADDR")]
    pub bind: Option<SocketAddr>,

    /// Base URL for remote structure downloads, overriding the config file.
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Fetch timeout in seconds, overriding the config file.
    #[arg(long, value_name = "SECS")]
    pub fetch_timeout_secs: Option<u64>,

    /// Advisory cross-check command to run after each alignment,
    /// overriding the config file.
    #[arg(long, value_name = "PATH")]
    pub crosscheck: Option<PathBuf>,
}
