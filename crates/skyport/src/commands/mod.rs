pub mod lifecycle;
pub mod resources;

pub use resources::list_resources;

use crate::LifecycleCommand;
use serde_json::Value;
use skyport_cloud::{Diagnostics, OperationContext};
use skyport_provider::{DynamicResource, Provider};

fn lookup<'a>(
    provider: &'a Provider,
    resource_type: &str,
) -> anyhow::Result<&'a dyn DynamicResource> {
    provider.resource(resource_type).ok_or_else(|| {
        anyhow::anyhow!(
            "Unknown resource type '{}'. Available: {}",
            resource_type,
            provider.resource_types().collect::<Vec<_>>().join(", ")
        )
    })
}

/// Dispatch a lifecycle command, returning the state to print.
pub async fn run(
    provider: &Provider,
    ctx: &OperationContext,
    diags: &mut Diagnostics,
    command: LifecycleCommand,
) -> anyhow::Result<Option<Value>> {
    match command {
        LifecycleCommand::Create {
            resource_type,
            state,
        } => {
            let resource = lookup(provider, &resource_type)?;
            lifecycle::create(resource, ctx, diags, &state).await
        }
        LifecycleCommand::Read {
            resource_type,
            state,
        } => {
            let resource = lookup(provider, &resource_type)?;
            lifecycle::read(resource, ctx, diags, &state).await
        }
        LifecycleCommand::Update {
            resource_type,
            prior,
            planned,
        } => {
            let resource = lookup(provider, &resource_type)?;
            lifecycle::update(resource, ctx, diags, &prior, &planned).await
        }
        LifecycleCommand::Delete {
            resource_type,
            state,
        } => {
            let resource = lookup(provider, &resource_type)?;
            lifecycle::delete(resource, ctx, diags, &state).await
        }
        LifecycleCommand::Import { resource_type, id } => {
            let resource = lookup(provider, &resource_type)?;
            Ok(resource.import(ctx, diags, &id).await)
        }
    }
}
