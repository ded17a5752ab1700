use super::CommandContext;

pub fn execute(name: &str, ctx: &CommandContext) -> anyhow::Result<()> {
    ctx.client.delete(name)?;
    ctx.output.success(&format!("Deleted {}", name));
    Ok(())
}
