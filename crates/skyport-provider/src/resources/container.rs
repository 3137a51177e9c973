//! `skyport_container`
//!
//! Containers are locked by the control plane while a deployment rolls out.
//! Create waits for the rollout to settle; update waits on both sides of the
//! modification and sends nested collections as present/absent deltas.

use super::{changed, ensure_same_identity, found, gone};
use crate::import_id::parse_import_id;
use crate::resource::Resource;
use crate::resource_class::ResourceClass;
use crate::settings::Settings;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use skyport_api::{
    Container, ContainerLock, ControlPlane, CreateContainerInput, EnvVar, Ingress,
    ModifyContainerInput, Mount,
};
use skyport_cloud::{
    CloudError, Diagnostics, LockedMutation, Operation, OperationContext, ReportExt, ResourceRef,
    delete_with_retry, reconcile_by_key,
};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerState {
    pub namespace: String,
    pub name: String,
    pub image: String,
    pub cpu: f64,
    pub memory_gb: f64,
    #[serde(default = "default_instances")]
    pub instances: u32,
    #[serde(default)]
    pub env: Vec<EnvVar>,
    #[serde(default)]
    pub mounts: Vec<Mount>,
    #[serde(default)]
    pub ingresses: Vec<Ingress>,
    #[serde(default)]
    pub status: String,
}

fn default_instances() -> u32 {
    1
}

impl ContainerState {
    fn from_remote(c: Container) -> Result<Self, CloudError> {
        let class: ResourceClass = c.resource_class.parse()?;
        Ok(Self {
            namespace: c.namespace,
            name: c.name,
            image: c.image,
            cpu: class.cpu,
            memory_gb: class.memory_gb,
            instances: c.instances,
            env: c.env,
            mounts: c.mounts,
            ingresses: c.ingresses,
            status: c.state,
        })
    }

    fn resource_class(&self) -> Result<ResourceClass, CloudError> {
        ResourceClass::new(self.cpu, self.memory_gb)
    }

    /// Delta between `self` (prior) and `planned`, or `None` when nothing
    /// changed.
    fn diff(&self, planned: &Self) -> Result<Option<ModifyContainerInput>, CloudError> {
        let planned_class = planned.resource_class()?;
        let input = ModifyContainerInput {
            image: changed(&self.image, &planned.image),
            resource_class: (planned_class != self.resource_class()?)
                .then(|| planned_class.to_string()),
            instances: changed(&self.instances, &planned.instances),
            env: reconcile_by_key(&planned.env, &self.env),
            mounts: reconcile_by_key(&planned.mounts, &self.mounts),
            ingresses: reconcile_by_key(&planned.ingresses, &self.ingresses),
        };

        let untouched = input.image.is_none()
            && input.resource_class.is_none()
            && input.instances.is_none()
            && self.env == planned.env
            && self.mounts == planned.mounts
            && self.ingresses == planned.ingresses;
        Ok((!untouched).then_some(input))
    }
}

fn target(namespace: &str, name: &str) -> ResourceRef {
    ResourceRef::new("container", namespace, name)
}

pub struct ContainerResource {
    client: Arc<dyn ControlPlane>,
    settings: Settings,
}

impl ContainerResource {
    pub fn new(client: Arc<dyn ControlPlane>, settings: Settings) -> Self {
        Self { client, settings }
    }

    async fn deploy(
        &self,
        ctx: &OperationContext,
        planned: ContainerState,
    ) -> Result<ContainerState, CloudError> {
        let target = target(&planned.namespace, &planned.name);
        let input = CreateContainerInput {
            name: planned.name.clone(),
            image: planned.image.clone(),
            resource_class: planned.resource_class()?.to_string(),
            instances: planned.instances,
            env: planned.env.clone(),
            mounts: planned.mounts.clone(),
            ingresses: planned.ingresses.clone(),
        };

        let client = self.client.as_ref();
        let container = LockedMutation::SETTLE
            .run_then_refetch(
                ctx,
                &self.settings.lock_wait,
                &ContainerLock(client),
                &target,
                || client.create_container(&planned.namespace, &input),
                || client.get_container(&planned.namespace, &planned.name),
            )
            .await?;
        ContainerState::from_remote(container)
    }

    async fn modify(
        &self,
        ctx: &OperationContext,
        prior: &ContainerState,
        planned: &ContainerState,
    ) -> Result<ContainerState, CloudError> {
        let target = target(&prior.namespace, &prior.name);
        ensure_same_identity(&target, &planned.namespace, &planned.name)?;

        let Some(input) = prior.diff(planned)? else {
            tracing::debug!(resource = %target, "no changes to apply");
            return Ok(prior.clone());
        };

        let client = self.client.as_ref();
        let container = LockedMutation::GUARDED
            .run_then_refetch(
                ctx,
                &self.settings.lock_wait,
                &ContainerLock(client),
                &target,
                || client.modify_container(&prior.namespace, &prior.name, &input),
                || client.get_container(&prior.namespace, &prior.name),
            )
            .await?;
        ContainerState::from_remote(container)
    }

    async fn fetch(
        &self,
        ctx: &OperationContext,
        state: &ContainerState,
    ) -> Result<Option<ContainerState>, CloudError> {
        found(ctx.guard(self.client.get_container(&state.namespace, &state.name)).await)?
            .map(ContainerState::from_remote)
            .transpose()
    }
}

#[async_trait]
impl Resource for ContainerResource {
    type State = ContainerState;

    fn type_name(&self) -> &'static str {
        "skyport_container"
    }

    fn state_from_import_id(&self, id: &str) -> Result<ContainerState, CloudError> {
        let [namespace, name] = parse_import_id::<2>(id, self.import_format())?;
        Ok(ContainerState {
            namespace,
            name,
            image: String::new(),
            cpu: 0.0,
            memory_gb: 0.0,
            instances: default_instances(),
            env: Vec::new(),
            mounts: Vec::new(),
            ingresses: Vec::new(),
            status: String::new(),
        })
    }

    async fn create(
        &self,
        ctx: &OperationContext,
        diags: &mut Diagnostics,
        planned: ContainerState,
    ) -> Option<ContainerState> {
        let label = target(&planned.namespace, &planned.name).to_string();
        let ctx = ctx.with_timeout(self.settings.timeouts.container());
        self.deploy(&ctx, planned)
            .await
            .report(diags, Operation::Create, &label)
    }

    async fn read(
        &self,
        ctx: &OperationContext,
        diags: &mut Diagnostics,
        state: ContainerState,
    ) -> Option<ContainerState> {
        let target = target(&state.namespace, &state.name);
        let ctx = ctx.with_timeout(self.settings.timeouts.read());
        match self
            .fetch(&ctx, &state)
            .await
            .report(diags, Operation::Read, &target.to_string())?
        {
            Some(state) => Some(state),
            None => gone(&target),
        }
    }

    async fn update(
        &self,
        ctx: &OperationContext,
        diags: &mut Diagnostics,
        prior: ContainerState,
        planned: ContainerState,
    ) -> Option<ContainerState> {
        let label = target(&prior.namespace, &prior.name).to_string();
        let ctx = ctx.with_timeout(self.settings.timeouts.container());
        self.modify(&ctx, &prior, &planned)
            .await
            .report(diags, Operation::Update, &label)
    }

    async fn delete(
        &self,
        ctx: &OperationContext,
        diags: &mut Diagnostics,
        state: ContainerState,
    ) -> Option<()> {
        let target = target(&state.namespace, &state.name);
        let ctx = ctx.with_timeout(self.settings.timeouts.delete());
        let client = self.client.as_ref();
        delete_with_retry(&ctx, &self.settings.delete_retry, &target, || {
            client.delete_container(&state.namespace, &state.name)
        })
        .await
        .map(|_| ())
        .report(diags, Operation::Delete, &target.to_string())
    }
}
