//! Lifecycle handlers, one per managed resource type

pub mod container;
pub mod container_job;
pub mod database;
pub mod database_cluster;
pub mod message_queue;
pub mod namespace;
pub mod registry;
pub mod volume;

pub use container::{ContainerResource, ContainerState};
pub use container_job::{ContainerJobResource, ContainerJobState};
pub use database::{DatabaseResource, DatabaseState};
pub use database_cluster::{DatabaseClusterResource, DatabaseClusterState};
pub use message_queue::{MessageQueueResource, MessageQueueState};
pub use namespace::{NamespaceResource, NamespaceState};
pub use registry::{RegistryResource, RegistryState};
pub use volume::{VolumeResource, VolumeState};

use skyport_cloud::{CloudError, ResourceRef};

/// Map a not-found fetch to `None`.
pub(crate) fn found<T>(result: Result<T, CloudError>) -> Result<Option<T>, CloudError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Log a vanished object; the host drops it from state.
pub(crate) fn gone<T>(target: &ResourceRef) -> Option<T> {
    tracing::warn!(resource = %target, "resource no longer exists, removing from state");
    None
}

/// Reject a change to a field the control plane cannot modify in place.
pub(crate) fn ensure_unchanged<T: PartialEq>(
    target: &ResourceRef,
    field: &str,
    prior: &T,
    planned: &T,
) -> Result<(), CloudError> {
    if prior == planned {
        Ok(())
    } else {
        Err(CloudError::immutable(target.to_string(), field))
    }
}

/// Reject a namespace or name change.
pub(crate) fn ensure_same_identity(
    target: &ResourceRef,
    planned_namespace: &str,
    planned_name: &str,
) -> Result<(), CloudError> {
    ensure_unchanged(target, "namespace", &target.namespace.as_str(), &planned_namespace)?;
    ensure_unchanged(target, "name", &target.name.as_str(), &planned_name)
}

/// `Some(planned)` when it differs from `prior`.
pub(crate) fn changed<T: PartialEq + Clone>(prior: &T, planned: &T) -> Option<T> {
    (prior != planned).then(|| planned.clone())
}
