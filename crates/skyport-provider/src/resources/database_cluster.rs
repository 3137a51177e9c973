//! `skyport_database_cluster`
//!
//! Provisioning a cluster takes several minutes, during which the control
//! plane keeps it locked. The engine is fixed at creation.

use super::{changed, ensure_same_identity, ensure_unchanged, found, gone};
use crate::import_id::parse_import_id;
use crate::resource::Resource;
use crate::resource_class::ResourceClass;
use crate::settings::Settings;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use skyport_api::{
    ClusterLock, ControlPlane, CreateClusterInput, DatabaseCluster, ModifyClusterInput,
};
use skyport_cloud::{
    CloudError, Diagnostics, LockedMutation, Operation, OperationContext, ReportExt, ResourceRef,
    delete_with_retry,
};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseClusterState {
    pub namespace: String,
    pub name: String,
    /// e.g. `postgres`, `mysql`
    pub engine: String,
    pub version: String,
    pub cpu: f64,
    pub memory_gb: f64,
    #[serde(default = "default_nodes")]
    pub nodes: u32,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub status: String,
}

fn default_nodes() -> u32 {
    1
}

impl DatabaseClusterState {
    fn from_remote(cluster: DatabaseCluster) -> Result<Self, CloudError> {
        let class: ResourceClass = cluster.resource_class.parse()?;
        Ok(Self {
            namespace: cluster.namespace,
            name: cluster.name,
            engine: cluster.engine,
            version: cluster.version,
            cpu: class.cpu,
            memory_gb: class.memory_gb,
            nodes: cluster.nodes,
            endpoint: cluster.endpoint,
            status: cluster.state,
        })
    }

    fn resource_class(&self) -> Result<ResourceClass, CloudError> {
        ResourceClass::new(self.cpu, self.memory_gb)
    }
}

fn target(namespace: &str, name: &str) -> ResourceRef {
    ResourceRef::new("database cluster", namespace, name)
}

pub struct DatabaseClusterResource {
    client: Arc<dyn ControlPlane>,
    settings: Settings,
}

impl DatabaseClusterResource {
    pub fn new(client: Arc<dyn ControlPlane>, settings: Settings) -> Self {
        Self { client, settings }
    }

    async fn provision(
        &self,
        ctx: &OperationContext,
        planned: DatabaseClusterState,
    ) -> Result<DatabaseClusterState, CloudError> {
        let target = target(&planned.namespace, &planned.name);
        let input = CreateClusterInput {
            name: planned.name.clone(),
            engine: planned.engine.clone(),
            version: planned.version.clone(),
            resource_class: planned.resource_class()?.to_string(),
            nodes: planned.nodes,
        };

        let client = self.client.as_ref();
        let cluster = LockedMutation::SETTLE
            .run_then_refetch(
                ctx,
                &self.settings.lock_wait,
                &ClusterLock(client),
                &target,
                || client.create_cluster(&planned.namespace, &input),
                || client.get_cluster(&planned.namespace, &planned.name),
            )
            .await?;
        DatabaseClusterState::from_remote(cluster)
    }

    async fn modify(
        &self,
        ctx: &OperationContext,
        prior: &DatabaseClusterState,
        planned: &DatabaseClusterState,
    ) -> Result<DatabaseClusterState, CloudError> {
        let target = target(&prior.namespace, &prior.name);
        ensure_same_identity(&target, &planned.namespace, &planned.name)?;
        ensure_unchanged(&target, "engine", &prior.engine, &planned.engine)?;

        let planned_class = planned.resource_class()?;
        let input = ModifyClusterInput {
            version: changed(&prior.version, &planned.version),
            resource_class: (planned_class != prior.resource_class()?)
                .then(|| planned_class.to_string()),
            nodes: changed(&prior.nodes, &planned.nodes),
        };
        if input == ModifyClusterInput::default() {
            return Ok(prior.clone());
        }

        let client = self.client.as_ref();
        let cluster = LockedMutation::GUARDED
            .run_then_refetch(
                ctx,
                &self.settings.lock_wait,
                &ClusterLock(client),
                &target,
                || client.modify_cluster(&prior.namespace, &prior.name, &input),
                || client.get_cluster(&prior.namespace, &prior.name),
            )
            .await?;
        DatabaseClusterState::from_remote(cluster)
    }
}

#[async_trait]
impl Resource for DatabaseClusterResource {
    type State = DatabaseClusterState;

    fn type_name(&self) -> &'static str {
        "skyport_database_cluster"
    }

    fn state_from_import_id(&self, id: &str) -> Result<DatabaseClusterState, CloudError> {
        let [namespace, name] = parse_import_id::<2>(id, self.import_format())?;
        Ok(DatabaseClusterState {
            namespace,
            name,
            engine: String::new(),
            version: String::new(),
            cpu: 0.0,
            memory_gb: 0.0,
            nodes: default_nodes(),
            endpoint: None,
            status: String::new(),
        })
    }

    async fn create(
        &self,
        ctx: &OperationContext,
        diags: &mut Diagnostics,
        planned: DatabaseClusterState,
    ) -> Option<DatabaseClusterState> {
        let label = target(&planned.namespace, &planned.name).to_string();
        let ctx = ctx.with_timeout(self.settings.timeouts.cluster_create());
        self.provision(&ctx, planned)
            .await
            .report(diags, Operation::Create, &label)
    }

    async fn read(
        &self,
        ctx: &OperationContext,
        diags: &mut Diagnostics,
        state: DatabaseClusterState,
    ) -> Option<DatabaseClusterState> {
        let target = target(&state.namespace, &state.name);
        let ctx = ctx.with_timeout(self.settings.timeouts.read());
        let fetched =
            found(ctx.guard(self.client.get_cluster(&state.namespace, &state.name)).await)
                .and_then(|cluster| cluster.map(DatabaseClusterState::from_remote).transpose())
                .report(diags, Operation::Read, &target.to_string())?;
        match fetched {
            Some(state) => Some(state),
            None => gone(&target),
        }
    }

    async fn update(
        &self,
        ctx: &OperationContext,
        diags: &mut Diagnostics,
        prior: DatabaseClusterState,
        planned: DatabaseClusterState,
    ) -> Option<DatabaseClusterState> {
        let label = target(&prior.namespace, &prior.name).to_string();
        let ctx = ctx.with_timeout(self.settings.timeouts.mutate());
        self.modify(&ctx, &prior, &planned)
            .await
            .report(diags, Operation::Update, &label)
    }

    async fn delete(
        &self,
        ctx: &OperationContext,
        diags: &mut Diagnostics,
        state: DatabaseClusterState,
    ) -> Option<()> {
        let target = target(&state.namespace, &state.name);
        let ctx = ctx.with_timeout(self.settings.timeouts.delete());
        let client = self.client.as_ref();
        delete_with_retry(&ctx, &self.settings.delete_retry, &target, || {
            client.delete_cluster(&state.namespace, &state.name)
        })
        .await
        .map(|_| ())
        .report(diags, Operation::Delete, &target.to_string())
    }
}
