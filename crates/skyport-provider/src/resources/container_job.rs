//! `skyport_container_job`

use super::{changed, ensure_same_identity, found, gone};
use crate::import_id::parse_import_id;
use crate::resource::Resource;
use crate::resource_class::ResourceClass;
use crate::settings::Settings;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use skyport_api::{
    ContainerJob, ControlPlane, CreateJobInput, EnvVar, JobLock, ModifyJobInput, Mount,
};
use skyport_cloud::{
    CloudError, Diagnostics, LockedMutation, Operation, OperationContext, ReportExt, ResourceRef,
    delete_with_retry, reconcile_by_key,
};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerJobState {
    pub namespace: String,
    pub name: String,
    pub image: String,
    pub cpu: f64,
    pub memory_gb: f64,
    /// Cron expression; `None` runs the job on demand only
    #[serde(default)]
    pub schedule: Option<String>,
    #[serde(default)]
    pub command: Vec<String>,
    #[serde(default)]
    pub env: Vec<EnvVar>,
    #[serde(default)]
    pub mounts: Vec<Mount>,
    #[serde(default)]
    pub status: String,
}

impl ContainerJobState {
    fn from_remote(job: ContainerJob) -> Result<Self, CloudError> {
        let class: ResourceClass = job.resource_class.parse()?;
        Ok(Self {
            namespace: job.namespace,
            name: job.name,
            image: job.image,
            cpu: class.cpu,
            memory_gb: class.memory_gb,
            schedule: job.schedule,
            command: job.command,
            env: job.env,
            mounts: job.mounts,
            status: job.state,
        })
    }

    fn resource_class(&self) -> Result<ResourceClass, CloudError> {
        ResourceClass::new(self.cpu, self.memory_gb)
    }

    fn diff(&self, planned: &Self) -> Result<Option<ModifyJobInput>, CloudError> {
        let planned_class = planned.resource_class()?;
        let input = ModifyJobInput {
            image: changed(&self.image, &planned.image),
            resource_class: (planned_class != self.resource_class()?)
                .then(|| planned_class.to_string()),
            schedule: changed(&self.schedule, &planned.schedule),
            command: changed(&self.command, &planned.command),
            env: reconcile_by_key(&planned.env, &self.env),
            mounts: reconcile_by_key(&planned.mounts, &self.mounts),
        };

        let untouched = input.image.is_none()
            && input.resource_class.is_none()
            && input.schedule.is_none()
            && input.command.is_none()
            && self.env == planned.env
            && self.mounts == planned.mounts;
        Ok((!untouched).then_some(input))
    }
}

fn target(namespace: &str, name: &str) -> ResourceRef {
    ResourceRef::new("container job", namespace, name)
}

pub struct ContainerJobResource {
    client: Arc<dyn ControlPlane>,
    settings: Settings,
}

impl ContainerJobResource {
    pub fn new(client: Arc<dyn ControlPlane>, settings: Settings) -> Self {
        Self { client, settings }
    }

    async fn provision(
        &self,
        ctx: &OperationContext,
        planned: ContainerJobState,
    ) -> Result<ContainerJobState, CloudError> {
        let target = target(&planned.namespace, &planned.name);
        let input = CreateJobInput {
            name: planned.name.clone(),
            image: planned.image.clone(),
            resource_class: planned.resource_class()?.to_string(),
            schedule: planned.schedule.clone(),
            command: planned.command.clone(),
            env: planned.env.clone(),
            mounts: planned.mounts.clone(),
        };

        let client = self.client.as_ref();
        let job = LockedMutation::SETTLE
            .run_then_refetch(
                ctx,
                &self.settings.lock_wait,
                &JobLock(client),
                &target,
                || client.create_job(&planned.namespace, &input),
                || client.get_job(&planned.namespace, &planned.name),
            )
            .await?;
        ContainerJobState::from_remote(job)
    }

    async fn modify(
        &self,
        ctx: &OperationContext,
        prior: &ContainerJobState,
        planned: &ContainerJobState,
    ) -> Result<ContainerJobState, CloudError> {
        let target = target(&prior.namespace, &prior.name);
        ensure_same_identity(&target, &planned.namespace, &planned.name)?;

        let Some(input) = prior.diff(planned)? else {
            return Ok(prior.clone());
        };

        let client = self.client.as_ref();
        let job = LockedMutation::GUARDED
            .run_then_refetch(
                ctx,
                &self.settings.lock_wait,
                &JobLock(client),
                &target,
                || client.modify_job(&prior.namespace, &prior.name, &input),
                || client.get_job(&prior.namespace, &prior.name),
            )
            .await?;
        ContainerJobState::from_remote(job)
    }
}

#[async_trait]
impl Resource for ContainerJobResource {
    type State = ContainerJobState;

    fn type_name(&self) -> &'static str {
        "skyport_container_job"
    }

    fn state_from_import_id(&self, id: &str) -> Result<ContainerJobState, CloudError> {
        let [namespace, name] = parse_import_id::<2>(id, self.import_format())?;
        Ok(ContainerJobState {
            namespace,
            name,
            image: String::new(),
            cpu: 0.0,
            memory_gb: 0.0,
            schedule: None,
            command: Vec::new(),
            env: Vec::new(),
            mounts: Vec::new(),
            status: String::new(),
        })
    }

    async fn create(
        &self,
        ctx: &OperationContext,
        diags: &mut Diagnostics,
        planned: ContainerJobState,
    ) -> Option<ContainerJobState> {
        let label = target(&planned.namespace, &planned.name).to_string();
        let ctx = ctx.with_timeout(self.settings.timeouts.container());
        self.provision(&ctx, planned)
            .await
            .report(diags, Operation::Create, &label)
    }

    async fn read(
        &self,
        ctx: &OperationContext,
        diags: &mut Diagnostics,
        state: ContainerJobState,
    ) -> Option<ContainerJobState> {
        let target = target(&state.namespace, &state.name);
        let ctx = ctx.with_timeout(self.settings.timeouts.read());
        let fetched = found(ctx.guard(self.client.get_job(&state.namespace, &state.name)).await)
            .and_then(|job| job.map(ContainerJobState::from_remote).transpose())
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
        prior: ContainerJobState,
        planned: ContainerJobState,
    ) -> Option<ContainerJobState> {
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
        state: ContainerJobState,
    ) -> Option<()> {
        let target = target(&state.namespace, &state.name);
        let ctx = ctx.with_timeout(self.settings.timeouts.delete());
        let client = self.client.as_ref();
        delete_with_retry(&ctx, &self.settings.delete_retry, &target, || {
            client.delete_job(&state.namespace, &state.name)
        })
        .await
        .map(|_| ())
        .report(diags, Operation::Delete, &target.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeControlPlane;
    use skyport_cloud::{Desired, RemoteError};

    fn nightly() -> ContainerJobState {
        ContainerJobState {
            namespace: "prod".to_string(),
            name: "backup".to_string(),
            image: "acme/backup:3".to_string(),
            cpu: 1.0,
            memory_gb: 2.0,
            schedule: Some("0 3 * * *".to_string()),
            command: vec!["backup".to_string(), "--all".to_string()],
            env: vec![EnvVar {
                name: "BUCKET".to_string(),
                value: "s3://backups".to_string(),
                secret: false,
            }],
            mounts: vec![],
            status: String::new(),
        }
    }

    fn handler(fake: &FakeControlPlane) -> ContainerJobResource {
        ContainerJobResource::new(Arc::new(fake.clone()), Settings::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_settles() {
        let fake = FakeControlPlane::new();
        fake.lock_sequence("job", "prod/backup", &[true, false]);
        let jobs = handler(&fake);
        let mut diags = Diagnostics::new();

        let state = jobs
            .create(&OperationContext::background(), &mut diags, nightly())
            .await
            .unwrap();

        assert_eq!(state.status, "idle");
        assert_eq!(state.schedule.as_deref(), Some("0 3 * * *"));
        assert_eq!(fake.calls_to("get_job"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_schedule_and_drop_env() {
        let fake = FakeControlPlane::new();
        let jobs = handler(&fake);
        let ctx = OperationContext::background();
        let mut diags = Diagnostics::new();
        let prior = jobs.create(&ctx, &mut diags, nightly()).await.unwrap();

        let mut planned = prior.clone();
        planned.schedule = None;
        planned.env.clear();

        let updated = jobs.update(&ctx, &mut diags, prior.clone(), planned).await.unwrap();

        let input = &fake.job_modifications()[0];
        assert_eq!(input.schedule, Some(None));
        assert_eq!(input.command, None);
        assert_eq!(input.env, vec![Desired::absent(prior.env[0].clone())]);
        assert!(updated.schedule.is_none());
        assert!(updated.env.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_probe_failure_aborts() {
        let fake = FakeControlPlane::new();
        let jobs = handler(&fake);
        let ctx = OperationContext::background();
        let mut diags = Diagnostics::new();
        let prior = jobs.create(&ctx, &mut diags, nightly()).await.unwrap();

        fake.fail(
            "get_job",
            vec![RemoteError::Other("upstream unavailable".to_string())],
        );
        let mut planned = prior.clone();
        planned.image = "acme/backup:4".to_string();

        let result = jobs.update(&ctx, &mut diags, prior, planned).await;

        assert!(result.is_none());
        assert_eq!(fake.calls_to("modify_job"), 0);
        let err = diags.errors().next().unwrap();
        assert_eq!(err.summary, "Failed to update container job prod/backup");
        assert_eq!(err.detail, "upstream unavailable");
    }

    #[tokio::test]
    async fn test_read_missing_job_is_gone() {
        let fake = FakeControlPlane::new();
        let jobs = handler(&fake);
        let mut diags = Diagnostics::new();

        let result = jobs
            .read(&OperationContext::background(), &mut diags, nightly())
            .await;

        assert!(result.is_none());
        assert!(!diags.has_errors());
    }
}
