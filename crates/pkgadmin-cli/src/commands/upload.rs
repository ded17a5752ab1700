use camino::Utf8Path;
use pkgadmin_core::PackageMetadata;

use super::{apply_metadata_args, CommandContext};
use crate::MetadataArgs;

pub fn execute(name: &str, path: &Utf8Path, args: &MetadataArgs, ctx: &CommandContext) -> anyhow::Result<()> {
    let mut metadata = PackageMetadata::default();
    apply_metadata_args(&mut metadata, args);

    ctx.client.upload(&metadata, name, path)?;
    ctx.output.success(&format!("Uploaded {} as {}", path, name));
    Ok(())
}
