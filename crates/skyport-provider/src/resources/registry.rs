//! `skyport_registry`
//!
//! The control plane never returns the registry password, so it is carried
//! over from the state the host already holds.

use super::{ensure_same_identity, found, gone};
use crate::import_id::parse_import_id;
use crate::resource::Resource;
use crate::settings::Settings;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use skyport_api::{ControlPlane, CreateRegistryInput, ModifyRegistryInput, Registry};
use skyport_cloud::{
    CloudError, Diagnostics, Operation, OperationContext, ReportExt, ResourceRef,
    delete_with_retry, mutate_with_retry,
};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryState {
    pub namespace: String,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub status: String,
}

impl RegistryState {
    fn from_remote(registry: Registry, password: Option<String>) -> Self {
        Self {
            namespace: registry.namespace,
            name: registry.name,
            url: registry.url,
            username: registry.username,
            password,
            status: registry.state,
        }
    }
}

fn target(namespace: &str, name: &str) -> ResourceRef {
    ResourceRef::new("registry", namespace, name)
}

pub struct RegistryResource {
    client: Arc<dyn ControlPlane>,
    settings: Settings,
}

impl RegistryResource {
    pub fn new(client: Arc<dyn ControlPlane>, settings: Settings) -> Self {
        Self { client, settings }
    }

    async fn modify(
        &self,
        ctx: &OperationContext,
        prior: &RegistryState,
        planned: RegistryState,
    ) -> Result<RegistryState, CloudError> {
        let target = target(&prior.namespace, &prior.name);
        ensure_same_identity(&target, &planned.namespace, &planned.name)?;

        if planned.url == prior.url
            && planned.username == prior.username
            && planned.password == prior.password
        {
            return Ok(prior.clone());
        }

        let input = ModifyRegistryInput {
            url: planned.url,
            username: planned.username,
            password: planned.password.clone(),
        };
        let registry = mutate_with_retry(ctx, &self.settings.lock_wait, &target, || {
            self.client.modify_registry(&prior.namespace, &prior.name, &input)
        })
        .await?;
        tracing::info!(resource = %target, "registry credentials updated");
        Ok(RegistryState::from_remote(registry, planned.password))
    }
}

#[async_trait]
impl Resource for RegistryResource {
    type State = RegistryState;

    fn type_name(&self) -> &'static str {
        "skyport_registry"
    }

    fn state_from_import_id(&self, id: &str) -> Result<RegistryState, CloudError> {
        let [namespace, name] = parse_import_id::<2>(id, self.import_format())?;
        Ok(RegistryState {
            namespace,
            name,
            ..Default::default()
        })
    }

    async fn create(
        &self,
        ctx: &OperationContext,
        diags: &mut Diagnostics,
        planned: RegistryState,
    ) -> Option<RegistryState> {
        let target = target(&planned.namespace, &planned.name);
        let ctx = ctx.with_timeout(self.settings.timeouts.mutate());
        let input = CreateRegistryInput {
            name: planned.name.clone(),
            url: planned.url.clone(),
            username: planned.username.clone(),
            password: planned.password.clone(),
        };
        mutate_with_retry(&ctx, &self.settings.lock_wait, &target, || {
            self.client.create_registry(&planned.namespace, &input)
        })
        .await
        .map(|registry| RegistryState::from_remote(registry, planned.password))
        .report(diags, Operation::Create, &target.to_string())
    }

    async fn read(
        &self,
        ctx: &OperationContext,
        diags: &mut Diagnostics,
        state: RegistryState,
    ) -> Option<RegistryState> {
        let target = target(&state.namespace, &state.name);
        let ctx = ctx.with_timeout(self.settings.timeouts.read());
        match found(ctx.guard(self.client.get_registry(&state.namespace, &state.name)).await)
            .report(diags, Operation::Read, &target.to_string())?
        {
            Some(registry) => Some(RegistryState::from_remote(registry, state.password)),
            None => gone(&target),
        }
    }

    async fn update(
        &self,
        ctx: &OperationContext,
        diags: &mut Diagnostics,
        prior: RegistryState,
        planned: RegistryState,
    ) -> Option<RegistryState> {
        let label = target(&prior.namespace, &prior.name).to_string();
        let ctx = ctx.with_timeout(self.settings.timeouts.mutate());
        self.modify(&ctx, &prior, planned)
            .await
            .report(diags, Operation::Update, &label)
    }

    async fn delete(
        &self,
        ctx: &OperationContext,
        diags: &mut Diagnostics,
        state: RegistryState,
    ) -> Option<()> {
        let target = target(&state.namespace, &state.name);
        let ctx = ctx.with_timeout(self.settings.timeouts.delete());
        let client = self.client.as_ref();
        delete_with_retry(&ctx, &self.settings.delete_retry, &target, || {
            client.delete_registry(&state.namespace, &state.name)
        })
        .await
        .map(|_| ())
        .report(diags, Operation::Delete, &target.to_string())
    }
}
