//! # pkgadmin-cli
//!
//! Command line interface for the packages admin API.
//!
//! This is the main entry point for the `pkgadmin` tool. It parses the
//! command line, sets up logging, resolves the client configuration and
//! dispatches to the command handlers, which use the blocking client API.

use std::collections::HashMap;
use std::process::ExitCode;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use pkgadmin_client::PackagesClient;
use pkgadmin_config::ConfigLoader;

mod commands;
mod output;

use commands::CommandContext;
use output::errors::ErrorFormatter;

/// Manage packages stored by the admin service
#[derive(Parser, Debug)]
#[command(name = "pkgadmin", version, long_version = long_version(), about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to ~/.pkgadmin/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,

    /// Admin service URL, e.g. http://localhost:8080
    #[arg(long, global = true, value_name = "URL")]
    pub url: Option<String>,

    /// Bearer token used to authenticate
    #[arg(long, global = true, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the metadata of a package version
    GetMetadata {
        /// Package name, e.g. function://public/default/echo@1.0
        name: String,
    },
    /// Change the metadata of a package version
    UpdateMetadata {
        name: String,
        #[command(flatten)]
        metadata: MetadataArgs,
    },
    /// Upload a package version
    Upload {
        name: String,
        /// Local file to upload
        #[arg(long, value_name = "FILE")]
        path: Utf8PathBuf,
        #[command(flatten)]
        metadata: MetadataArgs,
    },
    /// Download a package version
    Download {
        name: String,
        /// Destination file; parent directories are created
        #[arg(long, value_name = "FILE")]
        path: Utf8PathBuf,
    },
    /// Delete a package version
    Delete { name: String },
    /// List the versions of a package
    ListVersions { name: String },
    /// List the packages of one type in a namespace
    List {
        /// Package type: function, sink or source
        #[arg(long = "type", value_name = "TYPE")]
        package_type: String,
        /// Namespace as tenant/namespace
        #[arg(long, value_name = "TENANT/NAMESPACE")]
        namespace: String,
    },
}

/// Metadata fields settable from the command line
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct MetadataArgs {
    /// Package description
    #[arg(long)]
    pub description: Option<String>,

    /// Contact information
    #[arg(long)]
    pub contact: Option<String>,

    /// Additional property, may be repeated
    #[arg(short = 'P', long = "property", value_name = "KEY=VALUE", value_parser = commands::parse_property)]
    pub properties: Vec<(String, String)>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose);
    debug!("Starting pkgadmin v{}", env!("CARGO_PKG_VERSION"));

    match run_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{}", ErrorFormatter::new().format_report(&error));
            ExitCode::FAILURE
        },
    }
}

fn run_cli(cli: Cli) -> anyhow::Result<()> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_path(path.clone());
    }

    let (config, sources) = loader
        .load(&cli_overrides(&cli))
        .context("Failed to load configuration")?;
    debug!(?sources, url = %config.web_service_url, "configuration resolved");

    let client = PackagesClient::new(&config)?;
    info!(url = %client.web_service_url(), "using admin service");

    let ctx = CommandContext::new(client);
    commands::dispatch_command(cli.command, &ctx)?;
    Ok(())
}

/// Command line values that override file and environment configuration
fn cli_overrides(cli: &Cli) -> HashMap<String, String> {
    let mut overrides = HashMap::new();
    if let Some(url) = &cli.url {
        overrides.insert("url".to_string(), url.clone());
    }
    if let Some(token) = &cli.token {
        overrides.insert("token".to_string(), token.clone());
    }
    overrides
}

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "pkgadmin={level},pkgadmin_client={level},pkgadmin_config={level}",
            level = level
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn long_version() -> &'static str {
    concat!(env!("CARGO_PKG_VERSION"), " (", env!("RUSTC_VERSION"), ")")
}
