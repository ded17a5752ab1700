//! `list-versions` and `list`; one entry per line on stdout

use super::CommandContext;

pub fn versions(name: &str, ctx: &CommandContext) -> anyhow::Result<()> {
    let versions = ctx.client.list_package_versions(name)?;
    if versions.is_empty() {
        ctx.output.info(&format!("No versions found for {}", name));
    }
    ctx.output.lines(&versions);
    Ok(())
}

pub fn packages(package_type: &str, namespace: &str, ctx: &CommandContext) -> anyhow::Result<()> {
    let packages = ctx.client.list_packages(package_type, namespace)?;
    if packages.is_empty() {
        ctx.output.info(&format!("No {} packages in {}", package_type, namespace));
    }
    ctx.output.lines(&packages);
    Ok(())
}
