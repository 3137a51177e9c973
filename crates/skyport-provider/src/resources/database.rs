//! `skyport_database`
//!
//! A logical database inside a database cluster. The cluster rejects new
//! databases while it is locked, so create waits for it first.

use super::{ensure_same_identity, ensure_unchanged, found, gone};
use crate::import_id::parse_import_id;
use crate::resource::Resource;
use crate::settings::Settings;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use skyport_api::{ClusterLock, ControlPlane, CreateDatabaseInput, Database};
use skyport_cloud::{
    CloudError, Diagnostics, LockedMutation, Operation, OperationContext, ReportExt, ResourceRef,
    delete_with_retry,
};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseState {
    pub namespace: String,
    pub cluster: String,
    pub name: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub status: String,
}

impl From<Database> for DatabaseState {
    fn from(db: Database) -> Self {
        Self {
            namespace: db.namespace,
            cluster: db.cluster,
            name: db.name,
            owner: db.owner,
            status: db.state,
        }
    }
}

fn target(state: &DatabaseState) -> ResourceRef {
    ResourceRef::new(
        "database",
        &state.namespace,
        format!("{}/{}", state.cluster, state.name),
    )
}

pub struct DatabaseResource {
    client: Arc<dyn ControlPlane>,
    settings: Settings,
}

impl DatabaseResource {
    pub fn new(client: Arc<dyn ControlPlane>, settings: Settings) -> Self {
        Self { client, settings }
    }

    async fn provision(
        &self,
        ctx: &OperationContext,
        planned: &DatabaseState,
    ) -> Result<DatabaseState, CloudError> {
        let cluster = ResourceRef::new("database cluster", &planned.namespace, &planned.cluster);
        let input = CreateDatabaseInput {
            name: planned.name.clone(),
            owner: planned.owner.clone(),
        };

        let client = self.client.as_ref();
        let database = LockedMutation::PRECHECK
            .run(
                ctx,
                &self.settings.lock_wait,
                &ClusterLock(client),
                &cluster,
                || client.create_database(&planned.namespace, &planned.cluster, &input),
            )
            .await?;
        tracing::info!(resource = %target(planned), "database created");
        Ok(database.into())
    }
}

#[async_trait]
impl Resource for DatabaseResource {
    type State = DatabaseState;

    fn type_name(&self) -> &'static str {
        "skyport_database"
    }

    fn import_format(&self) -> &'static str {
        "<namespace>/<cluster>/<name>"
    }

    fn state_from_import_id(&self, id: &str) -> Result<DatabaseState, CloudError> {
        let [namespace, cluster, name] = parse_import_id::<3>(id, self.import_format())?;
        Ok(DatabaseState {
            namespace,
            cluster,
            name,
            ..Default::default()
        })
    }

    async fn create(
        &self,
        ctx: &OperationContext,
        diags: &mut Diagnostics,
        planned: DatabaseState,
    ) -> Option<DatabaseState> {
        let label = target(&planned).to_string();
        let ctx = ctx.with_timeout(self.settings.timeouts.mutate());
        self.provision(&ctx, &planned)
            .await
            .report(diags, Operation::Create, &label)
    }

    async fn read(
        &self,
        ctx: &OperationContext,
        diags: &mut Diagnostics,
        state: DatabaseState,
    ) -> Option<DatabaseState> {
        let target = target(&state);
        let ctx = ctx.with_timeout(self.settings.timeouts.read());
        let fetched = ctx
            .guard(
                self.client
                    .get_database(&state.namespace, &state.cluster, &state.name),
            )
            .await;
        match found(fetched).report(diags, Operation::Read, &target.to_string())? {
            Some(db) => Some(db.into()),
            None => gone(&target),
        }
    }

    async fn update(
        &self,
        _ctx: &OperationContext,
        diags: &mut Diagnostics,
        prior: DatabaseState,
        planned: DatabaseState,
    ) -> Option<DatabaseState> {
        let target = target(&prior);
        let planned_path = format!("{}/{}", planned.cluster, planned.name);
        ensure_same_identity(&target, &planned.namespace, &planned_path)
            .and_then(|()| ensure_unchanged(&target, "owner", &prior.owner, &planned.owner))
            .report(diags, Operation::Update, &target.to_string())?;
        Some(prior)
    }

    async fn delete(
        &self,
        ctx: &OperationContext,
        diags: &mut Diagnostics,
        state: DatabaseState,
    ) -> Option<()> {
        let target = target(&state);
        let ctx = ctx.with_timeout(self.settings.timeouts.delete());
        let client = self.client.as_ref();
        delete_with_retry(&ctx, &self.settings.delete_retry, &target, || {
            client.delete_database(&state.namespace, &state.cluster, &state.name)
        })
        .await
        .map(|_| ())
        .report(diags, Operation::Delete, &target.to_string())
    }
}
