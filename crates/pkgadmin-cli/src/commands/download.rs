use camino::Utf8Path;

use super::CommandContext;

pub fn execute(name: &str, path: &Utf8Path, ctx: &CommandContext) -> anyhow::Result<()> {
    ctx.client.download(name, path)?;
    ctx.output.success(&format!("Downloaded {} to {}", name, path));
    Ok(())
}
