//! `get-metadata` and `update-metadata`

use anyhow::bail;

use super::{apply_metadata_args, CommandContext};
use crate::MetadataArgs;

pub fn get(name: &str, ctx: &CommandContext) -> anyhow::Result<()> {
    let metadata = ctx.client.get_metadata(name)?;
    ctx.output.json(&metadata)?;
    Ok(())
}

/// Read, modify and write back the metadata; fields not given are kept
pub fn update(name: &str, args: &MetadataArgs, ctx: &CommandContext) -> anyhow::Result<()> {
    if args.is_empty() {
        bail!("Nothing to update: pass --description, --contact or -P KEY=VALUE");
    }

    let mut metadata = ctx.client.get_metadata(name)?;
    apply_metadata_args(&mut metadata, args);
    ctx.client.update_metadata(name, &metadata)?;

    ctx.output.success(&format!("Updated metadata of {}", name));
    Ok(())
}
