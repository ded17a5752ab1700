//! Command implementations and dispatch logic.
//!
//! Each command is a plain function taking the shared [`CommandContext`];
//! all of them use the blocking client API.

use tracing::info;

use pkgadmin_client::PackagesClient;
use pkgadmin_core::PackageMetadata;

pub mod delete;
pub mod download;
pub mod list;
pub mod metadata;
pub mod upload;


use crate::{output::OutputHandler, Commands, MetadataArgs};

/// Shared context for all commands
pub struct CommandContext {
    pub client: PackagesClient,
    pub output: OutputHandler,
}

impl CommandContext {
    pub fn new(client: PackagesClient) -> Self {
        Self {
            client,
            output: OutputHandler::new(),
        }
    }
}

/// Dispatch a command to its handler
pub fn dispatch_command(command: Commands, ctx: &CommandContext) -> anyhow::Result<()> {
    match command {
        Commands::GetMetadata { name } => {
            info!("Fetching metadata of {}", name);
            metadata::get(&name, ctx)
        },
        Commands::UpdateMetadata { name, metadata } => {
            info!("Updating metadata of {}", name);
            metadata::update(&name, &metadata, ctx)
        },
        Commands::Upload { name, path, metadata } => {
            info!("Uploading {} as {}", path, name);
            upload::execute(&name, &path, &metadata, ctx)
        },
        Commands::Download { name, path } => {
            info!("Downloading {} to {}", name, path);
            download::execute(&name, &path, ctx)
        },
        Commands::Delete { name } => {
            info!("Deleting {}", name);
            delete::execute(&name, ctx)
        },
        Commands::ListVersions { name } => {
            info!("Listing versions of {}", name);
            list::versions(&name, ctx)
        },
        Commands::List { package_type, namespace } => {
            info!("Listing {} packages in {}", package_type, namespace);
            list::packages(&package_type, &namespace, ctx)
        },
    }
}

/// Parse a `key=value` property argument
pub fn parse_property(value: &str) -> Result<(String, String), String> {
    let (key, value) = value
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", value))?;

    let key = key.trim();
    if key.is_empty() {
        return Err("property key must not be empty".to_string());
    }
    Ok((key.to_string(), value.to_string()))
}

/// Overlay the fields given on the command line onto `metadata`
pub fn apply_metadata_args(metadata: &mut PackageMetadata, args: &MetadataArgs) {
    if let Some(description) = &args.description {
        metadata.description = Some(description.clone());
    }
    if let Some(contact) = &args.contact {
        metadata.contact = Some(contact.clone());
    }
    for (key, value) in &args.properties {
        metadata.set_property(key.clone(), value.clone());
    }
}

impl MetadataArgs {
    /// True when no metadata field was given
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.contact.is_none() && self.properties.is_empty()
    }
}
