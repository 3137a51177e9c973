//! Resource lifecycle traits
//!
//! Every managed resource implements [`Resource`] with a typed state. Hosts
//! that only deal in JSON (the CLI, a plugin server) drive resources through
//! the object-safe [`DynamicResource`] view.
//!
//! Operations report failures through the [`Diagnostics`] sink and return
//! `None`. A `read` returning `None` without error diagnostics means the
//! remote object is gone and should be dropped from tracked state.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use skyport_cloud::{CloudError, Diagnostics, Operation, OperationContext};

#[async_trait]
pub trait Resource: Send + Sync {
    type State: Serialize + DeserializeOwned + Clone + Send + Sync;

    /// Resource type name, e.g. `skyport_container`
    fn type_name(&self) -> &'static str;

    /// Expected import identifier format
    fn import_format(&self) -> &'static str {
        "<namespace>/<name>"
    }

    /// Minimal state identifying the object named by an import identifier
    fn state_from_import_id(&self, id: &str) -> Result<Self::State, CloudError>;

    async fn create(
        &self,
        ctx: &OperationContext,
        diags: &mut Diagnostics,
        planned: Self::State,
    ) -> Option<Self::State>;

    async fn read(
        &self,
        ctx: &OperationContext,
        diags: &mut Diagnostics,
        state: Self::State,
    ) -> Option<Self::State>;

    async fn update(
        &self,
        ctx: &OperationContext,
        diags: &mut Diagnostics,
        prior: Self::State,
        planned: Self::State,
    ) -> Option<Self::State>;

    async fn delete(
        &self,
        ctx: &OperationContext,
        diags: &mut Diagnostics,
        state: Self::State,
    ) -> Option<()>;

    async fn import(
        &self,
        ctx: &OperationContext,
        diags: &mut Diagnostics,
        id: &str,
    ) -> Option<Self::State> {
        let state = match self.state_from_import_id(id) {
            Ok(state) => state,
            Err(e) => {
                diags.operation_failed(Operation::Import, Resource::type_name(self), &e);
                return None;
            }
        };

        let imported = Resource::read(self, ctx, diags, state).await;
        if imported.is_none() && !diags.has_errors() {
            diags.error(
                format!("Failed to import {} {:?}", Resource::type_name(self), id),
                "The object does not exist in the control plane",
            );
        }
        imported
    }
}

/// JSON view of a [`Resource`]
#[async_trait]
pub trait DynamicResource: Send + Sync {
    fn type_name(&self) -> &'static str;

    async fn create(
        &self,
        ctx: &OperationContext,
        diags: &mut Diagnostics,
        planned: Value,
    ) -> Option<Value>;

    async fn read(
        &self,
        ctx: &OperationContext,
        diags: &mut Diagnostics,
        state: Value,
    ) -> Option<Value>;

    async fn update(
        &self,
        ctx: &OperationContext,
        diags: &mut Diagnostics,
        prior: Value,
        planned: Value,
    ) -> Option<Value>;

    async fn delete(
        &self,
        ctx: &OperationContext,
        diags: &mut Diagnostics,
        state: Value,
    ) -> Option<()>;

    async fn import(
        &self,
        ctx: &OperationContext,
        diags: &mut Diagnostics,
        id: &str,
    ) -> Option<Value>;
}

fn decode<T: DeserializeOwned>(
    diags: &mut Diagnostics,
    type_name: &str,
    operation: Operation,
    value: Value,
) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(state) => Some(state),
        Err(e) => {
            diags.error(
                format!("Failed to {} {}", operation, type_name),
                format!("Invalid {} state: {}", type_name, e),
            );
            None
        }
    }
}

fn encode<T: Serialize>(diags: &mut Diagnostics, type_name: &str, state: T) -> Option<Value> {
    match serde_json::to_value(state) {
        Ok(value) => Some(value),
        Err(e) => {
            diags.error(
                format!("Failed to encode {} state", type_name),
                e.to_string(),
            );
            None
        }
    }
}

#[async_trait]
impl<R> DynamicResource for R
where
    R: Resource,
{
    fn type_name(&self) -> &'static str {
        Resource::type_name(self)
    }

    async fn create(
        &self,
        ctx: &OperationContext,
        diags: &mut Diagnostics,
        planned: Value,
    ) -> Option<Value> {
        let name = Resource::type_name(self);
        let planned = decode(diags, name, Operation::Create, planned)?;
        let state = Resource::create(self, ctx, diags, planned).await?;
        encode(diags, name, state)
    }

    async fn read(
        &self,
        ctx: &OperationContext,
        diags: &mut Diagnostics,
        state: Value,
    ) -> Option<Value> {
        let name = Resource::type_name(self);
        let state = decode(diags, name, Operation::Read, state)?;
        let state = Resource::read(self, ctx, diags, state).await?;
        encode(diags, name, state)
    }

    async fn update(
        &self,
        ctx: &OperationContext,
        diags: &mut Diagnostics,
        prior: Value,
        planned: Value,
    ) -> Option<Value> {
        let name = Resource::type_name(self);
        let prior = decode(diags, name, Operation::Update, prior)?;
        let planned = decode(diags, name, Operation::Update, planned)?;
        let state = Resource::update(self, ctx, diags, prior, planned).await?;
        encode(diags, name, state)
    }

    async fn delete(
        &self,
        ctx: &OperationContext,
        diags: &mut Diagnostics,
        state: Value,
    ) -> Option<()> {
        let name = Resource::type_name(self);
        let state = decode(diags, name, Operation::Delete, state)?;
        Resource::delete(self, ctx, diags, state).await
    }

    async fn import(
        &self,
        ctx: &OperationContext,
        diags: &mut Diagnostics,
        id: &str,
    ) -> Option<Value> {
        let state = Resource::import(self, ctx, diags, id).await?;
        encode(diags, Resource::type_name(self), state)
    }
}
