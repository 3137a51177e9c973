//! `skyport_message_queue`

use super::{ensure_same_identity, ensure_unchanged, found, gone};
use crate::import_id::parse_import_id;
use crate::resource::Resource;
use crate::settings::Settings;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use skyport_api::{ControlPlane, CreateQueueInput, MessageQueue};
use skyport_cloud::{
    CloudError, Diagnostics, Operation, OperationContext, ReportExt, ResourceRef,
    delete_with_retry, mutate_with_retry,
};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageQueueState {
    pub namespace: String,
    pub name: String,
    /// Queue flavour, e.g. `standard` or `fifo`
    pub kind: String,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub status: String,
}

impl From<MessageQueue> for MessageQueueState {
    fn from(q: MessageQueue) -> Self {
        Self {
            namespace: q.namespace,
            name: q.name,
            kind: q.kind,
            endpoint: q.endpoint,
            status: q.state,
        }
    }
}

fn target(namespace: &str, name: &str) -> ResourceRef {
    ResourceRef::new("message queue", namespace, name)
}

pub struct MessageQueueResource {
    client: Arc<dyn ControlPlane>,
    settings: Settings,
}

impl MessageQueueResource {
    pub fn new(client: Arc<dyn ControlPlane>, settings: Settings) -> Self {
        Self { client, settings }
    }
}

#[async_trait]
impl Resource for MessageQueueResource {
    type State = MessageQueueState;

    fn type_name(&self) -> &'static str {
        "skyport_message_queue"
    }

    fn state_from_import_id(&self, id: &str) -> Result<MessageQueueState, CloudError> {
        let [namespace, name] = parse_import_id::<2>(id, self.import_format())?;
        Ok(MessageQueueState {
            namespace,
            name,
            ..Default::default()
        })
    }

    async fn create(
        &self,
        ctx: &OperationContext,
        diags: &mut Diagnostics,
        planned: MessageQueueState,
    ) -> Option<MessageQueueState> {
        let target = target(&planned.namespace, &planned.name);
        let ctx = ctx.with_timeout(self.settings.timeouts.mutate());
        let input = CreateQueueInput {
            name: planned.name.clone(),
            kind: planned.kind.clone(),
        };
        mutate_with_retry(&ctx, &self.settings.lock_wait, &target, || {
            self.client.create_queue(&planned.namespace, &input)
        })
        .await
        .map(MessageQueueState::from)
        .report(diags, Operation::Create, &target.to_string())
    }

    async fn read(
        &self,
        ctx: &OperationContext,
        diags: &mut Diagnostics,
        state: MessageQueueState,
    ) -> Option<MessageQueueState> {
        let target = target(&state.namespace, &state.name);
        let ctx = ctx.with_timeout(self.settings.timeouts.read());
        match found(ctx.guard(self.client.get_queue(&state.namespace, &state.name)).await)
            .report(diags, Operation::Read, &target.to_string())?
        {
            Some(queue) => Some(queue.into()),
            None => gone(&target),
        }
    }

    async fn update(
        &self,
        _ctx: &OperationContext,
        diags: &mut Diagnostics,
        prior: MessageQueueState,
        planned: MessageQueueState,
    ) -> Option<MessageQueueState> {
        let target = target(&prior.namespace, &prior.name);
        ensure_same_identity(&target, &planned.namespace, &planned.name)
            .and_then(|()| ensure_unchanged(&target, "kind", &prior.kind, &planned.kind))
            .report(diags, Operation::Update, &target.to_string())?;
        Some(prior)
    }

    async fn delete(
        &self,
        ctx: &OperationContext,
        diags: &mut Diagnostics,
        state: MessageQueueState,
    ) -> Option<()> {
        let target = target(&state.namespace, &state.name);
        let ctx = ctx.with_timeout(self.settings.timeouts.delete());
        let client = self.client.as_ref();
        delete_with_retry(&ctx, &self.settings.delete_retry, &target, || {
            client.delete_queue(&state.namespace, &state.name)
        })
        .await
        .map(|_| ())
        .report(diags, Operation::Delete, &target.to_string())
    }
}
