//! `skyport_namespace`
//!
//! Namespaces cannot be modified after creation. Deleting one waits for the
//! control plane to tear down everything inside it, which can take minutes.

use super::{ensure_unchanged, found, gone};
use crate::import_id::parse_import_id;
use crate::resource::Resource;
use crate::settings::Settings;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use skyport_api::{ControlPlane, CreateNamespaceInput, Namespace};
use skyport_cloud::{
    CloudError, Diagnostics, Operation, OperationContext, ReportExt, ResourceRef,
    delete_with_retry, mutate_with_retry,
};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamespaceState {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl From<Namespace> for NamespaceState {
    fn from(ns: Namespace) -> Self {
        Self {
            name: ns.name,
            description: ns.description,
            status: ns.state,
            created_at: ns.created_at.map(|t| t.to_rfc3339()),
        }
    }
}

fn target(name: &str) -> ResourceRef {
    ResourceRef::new("namespace", "", name)
}

pub struct NamespaceResource {
    client: Arc<dyn ControlPlane>,
    settings: Settings,
}

impl NamespaceResource {
    pub fn new(client: Arc<dyn ControlPlane>, settings: Settings) -> Self {
        Self { client, settings }
    }

    async fn create_namespace(
        &self,
        ctx: &OperationContext,
        planned: NamespaceState,
    ) -> Result<NamespaceState, CloudError> {
        let input = CreateNamespaceInput {
            name: planned.name,
            description: planned.description,
        };
        let target = target(&input.name);
        let created = mutate_with_retry(ctx, &self.settings.lock_wait, &target, || {
            self.client.create_namespace(&input)
        })
        .await?;
        tracing::info!(namespace = %created.name, "namespace created");
        Ok(created.into())
    }

    async fn delete_namespace(&self, ctx: &OperationContext, name: &str) -> Result<(), CloudError> {
        let client = self.client.as_ref();
        delete_with_retry(ctx, &self.settings.namespace_delete_retry, &target(name), || {
            client.delete_namespace(name)
        })
        .await?;
        Ok(())
    }
}

#[async_trait]
impl Resource for NamespaceResource {
    type State = NamespaceState;

    fn type_name(&self) -> &'static str {
        "skyport_namespace"
    }

    fn import_format(&self) -> &'static str {
        "<name>"
    }

    fn state_from_import_id(&self, id: &str) -> Result<NamespaceState, CloudError> {
        let [name] = parse_import_id::<1>(id, self.import_format())?;
        Ok(NamespaceState {
            name,
            ..Default::default()
        })
    }

    async fn create(
        &self,
        ctx: &OperationContext,
        diags: &mut Diagnostics,
        planned: NamespaceState,
    ) -> Option<NamespaceState> {
        let label = target(&planned.name).to_string();
        let ctx = ctx.with_timeout(self.settings.timeouts.mutate());
        self.create_namespace(&ctx, planned)
            .await
            .report(diags, Operation::Create, &label)
    }

    async fn read(
        &self,
        ctx: &OperationContext,
        diags: &mut Diagnostics,
        state: NamespaceState,
    ) -> Option<NamespaceState> {
        let target = target(&state.name);
        let ctx = ctx.with_timeout(self.settings.timeouts.read());
        match found(ctx.guard(self.client.get_namespace(&state.name)).await)
            .report(diags, Operation::Read, &target.to_string())?
        {
            Some(ns) => Some(ns.into()),
            None => gone(&target),
        }
    }

    async fn update(
        &self,
        _ctx: &OperationContext,
        diags: &mut Diagnostics,
        prior: NamespaceState,
        planned: NamespaceState,
    ) -> Option<NamespaceState> {
        let target = target(&prior.name);
        ensure_unchanged(&target, "name", &prior.name, &planned.name)
            .and_then(|()| {
                ensure_unchanged(&target, "description", &prior.description, &planned.description)
            })
            .report(diags, Operation::Update, &target.to_string())?;
        Some(prior)
    }

    async fn delete(
        &self,
        ctx: &OperationContext,
        diags: &mut Diagnostics,
        state: NamespaceState,
    ) -> Option<()> {
        let label = target(&state.name).to_string();
        let ctx = ctx.with_timeout(self.settings.timeouts.namespace_delete());
        self.delete_namespace(&ctx, &state.name)
            .await
            .report(diags, Operation::Delete, &label)
    }
}
