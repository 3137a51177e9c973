//! `skyport_volume`

use super::{ensure_same_identity, found, gone};
use crate::import_id::parse_import_id;
use crate::resource::Resource;
use crate::settings::Settings;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use skyport_api::{ControlPlane, CreateVolumeInput, ModifyVolumeInput, Volume};
use skyport_cloud::{
    CloudError, Diagnostics, Operation, OperationContext, ReportExt, ResourceRef,
    delete_with_retry, mutate_with_retry,
};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeState {
    pub namespace: String,
    pub name: String,
    pub size_gb: u32,
    #[serde(default)]
    pub status: String,
}

impl From<Volume> for VolumeState {
    fn from(v: Volume) -> Self {
        Self {
            namespace: v.namespace,
            name: v.name,
            size_gb: v.size_gb,
            status: v.state,
        }
    }
}

fn target(namespace: &str, name: &str) -> ResourceRef {
    ResourceRef::new("volume", namespace, name)
}

pub struct VolumeResource {
    client: Arc<dyn ControlPlane>,
    settings: Settings,
}

impl VolumeResource {
    pub fn new(client: Arc<dyn ControlPlane>, settings: Settings) -> Self {
        Self { client, settings }
    }

    async fn resize(
        &self,
        ctx: &OperationContext,
        prior: &VolumeState,
        planned: &VolumeState,
    ) -> Result<VolumeState, CloudError> {
        let target = target(&prior.namespace, &prior.name);
        ensure_same_identity(&target, &planned.namespace, &planned.name)?;

        if planned.size_gb < prior.size_gb {
            return Err(CloudError::validation(
                "size_gb",
                format!("at least {} (volumes cannot shrink)", prior.size_gb),
                planned.size_gb.to_string(),
            ));
        }
        if planned.size_gb == prior.size_gb {
            return Ok(prior.clone());
        }

        let input = ModifyVolumeInput {
            size_gb: planned.size_gb,
        };
        let volume = mutate_with_retry(ctx, &self.settings.lock_wait, &target, || {
            self.client.modify_volume(&prior.namespace, &prior.name, &input)
        })
        .await?;
        tracing::info!(resource = %target, size_gb = volume.size_gb, "volume resized");
        Ok(volume.into())
    }
}

#[async_trait]
impl Resource for VolumeResource {
    type State = VolumeState;

    fn type_name(&self) -> &'static str {
        "skyport_volume"
    }

    fn state_from_import_id(&self, id: &str) -> Result<VolumeState, CloudError> {
        let [namespace, name] = parse_import_id::<2>(id, self.import_format())?;
        Ok(VolumeState {
            namespace,
            name,
            ..Default::default()
        })
    }

    async fn create(
        &self,
        ctx: &OperationContext,
        diags: &mut Diagnostics,
        planned: VolumeState,
    ) -> Option<VolumeState> {
        let target = target(&planned.namespace, &planned.name);
        let ctx = ctx.with_timeout(self.settings.timeouts.mutate());
        let input = CreateVolumeInput {
            name: planned.name.clone(),
            size_gb: planned.size_gb,
        };
        mutate_with_retry(&ctx, &self.settings.lock_wait, &target, || {
            self.client.create_volume(&planned.namespace, &input)
        })
        .await
        .map(VolumeState::from)
        .report(diags, Operation::Create, &target.to_string())
    }

    async fn read(
        &self,
        ctx: &OperationContext,
        diags: &mut Diagnostics,
        state: VolumeState,
    ) -> Option<VolumeState> {
        let target = target(&state.namespace, &state.name);
        let ctx = ctx.with_timeout(self.settings.timeouts.read());
        match found(ctx.guard(self.client.get_volume(&state.namespace, &state.name)).await)
            .report(diags, Operation::Read, &target.to_string())?
        {
            Some(volume) => Some(volume.into()),
            None => gone(&target),
        }
    }

    async fn update(
        &self,
        ctx: &OperationContext,
        diags: &mut Diagnostics,
        prior: VolumeState,
        planned: VolumeState,
    ) -> Option<VolumeState> {
        let label = target(&prior.namespace, &prior.name).to_string();
        let ctx = ctx.with_timeout(self.settings.timeouts.mutate());
        self.resize(&ctx, &prior, &planned)
            .await
            .report(diags, Operation::Update, &label)
    }

    async fn delete(
        &self,
        ctx: &OperationContext,
        diags: &mut Diagnostics,
        state: VolumeState,
    ) -> Option<()> {
        let target = target(&state.namespace, &state.name);
        let ctx = ctx.with_timeout(self.settings.timeouts.delete());
        let client = self.client.as_ref();
        delete_with_retry(&ctx, &self.settings.delete_retry, &target, || {
            client.delete_volume(&state.namespace, &state.name)
        })
        .await
        .map(|_| ())
        .report(diags, Operation::Delete, &target.to_string())
    }
}
