use crate::output;
use colored::Colorize;
use serde_json::Value;
use skyport_cloud::{Diagnostics, OperationContext};
use skyport_provider::DynamicResource;
use std::io::Read;
use std::path::Path;

/// Read a JSON state from a file, or stdin for "-".
fn read_state(path: &Path) -> anyhow::Result<Value> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?
    };
    serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("{} is not valid JSON: {}", path.display(), e))
}

pub async fn create(
    resource: &dyn DynamicResource,
    ctx: &OperationContext,
    diags: &mut Diagnostics,
    state: &Path,
) -> anyhow::Result<Option<Value>> {
    let planned = read_state(state)?;
    output::progress(format!("Creating {}...", resource.type_name()));
    Ok(resource.create(ctx, diags, planned).await)
}

pub async fn read(
    resource: &dyn DynamicResource,
    ctx: &OperationContext,
    diags: &mut Diagnostics,
    state: &Path,
) -> anyhow::Result<Option<Value>> {
    let current = read_state(state)?;
    let refreshed = resource.read(ctx, diags, current).await;
    if refreshed.is_none() && !diags.has_errors() {
        diags.warning(
            "Resource no longer exists",
            "It was deleted outside of skyport; drop it from your state.",
        );
        return Ok(Some(Value::Null));
    }
    Ok(refreshed)
}

pub async fn update(
    resource: &dyn DynamicResource,
    ctx: &OperationContext,
    diags: &mut Diagnostics,
    prior: &Path,
    planned: &Path,
) -> anyhow::Result<Option<Value>> {
    let prior = read_state(prior)?;
    let planned = read_state(planned)?;
    output::progress(format!("Updating {}...", resource.type_name()));
    Ok(resource.update(ctx, diags, prior, planned).await)
}

pub async fn delete(
    resource: &dyn DynamicResource,
    ctx: &OperationContext,
    diags: &mut Diagnostics,
    state: &Path,
) -> anyhow::Result<Option<Value>> {
    let current = read_state(state)?;
    output::progress(format!("Deleting {}...", resource.type_name()));
    if resource.delete(ctx, diags, current).await.is_some() {
        eprintln!("{}", "✓ Deleted".green());
    }
    Ok(None)
}
