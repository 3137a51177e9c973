//! Control plane client abstraction

use crate::model::*;
use async_trait::async_trait;
use skyport_cloud::RemoteError;

pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Remote control plane operations used by the resource handlers.
///
/// Every call hits the control plane; implementations keep no cache.
/// Failures are classified into [`RemoteError`] so callers can tell a
/// vanished object from a locked one.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    // Namespaces
    async fn create_namespace(&self, input: &CreateNamespaceInput) -> RemoteResult<Namespace>;
    async fn get_namespace(&self, name: &str) -> RemoteResult<Namespace>;
    async fn delete_namespace(&self, name: &str) -> RemoteResult<()>;

    // Volumes
    async fn create_volume(&self, namespace: &str, input: &CreateVolumeInput)
    -> RemoteResult<Volume>;
    async fn get_volume(&self, namespace: &str, name: &str) -> RemoteResult<Volume>;
    async fn modify_volume(
        &self,
        namespace: &str,
        name: &str,
        input: &ModifyVolumeInput,
    ) -> RemoteResult<Volume>;
    async fn delete_volume(&self, namespace: &str, name: &str) -> RemoteResult<()>;

    // Message queues
    async fn create_queue(
        &self,
        namespace: &str,
        input: &CreateQueueInput,
    ) -> RemoteResult<MessageQueue>;
    async fn get_queue(&self, namespace: &str, name: &str) -> RemoteResult<MessageQueue>;
    async fn delete_queue(&self, namespace: &str, name: &str) -> RemoteResult<()>;

    // Registries
    async fn create_registry(
        &self,
        namespace: &str,
        input: &CreateRegistryInput,
    ) -> RemoteResult<Registry>;
    async fn get_registry(&self, namespace: &str, name: &str) -> RemoteResult<Registry>;
    async fn modify_registry(
        &self,
        namespace: &str,
        name: &str,
        input: &ModifyRegistryInput,
    ) -> RemoteResult<Registry>;
    async fn delete_registry(&self, namespace: &str, name: &str) -> RemoteResult<()>;

    // Containers
    async fn create_container(
        &self,
        namespace: &str,
        input: &CreateContainerInput,
    ) -> RemoteResult<Container>;
    async fn get_container(&self, namespace: &str, name: &str) -> RemoteResult<Container>;
    async fn modify_container(
        &self,
        namespace: &str,
        name: &str,
        input: &ModifyContainerInput,
    ) -> RemoteResult<Container>;
    async fn delete_container(&self, namespace: &str, name: &str) -> RemoteResult<()>;

    // Container jobs
    async fn create_job(&self, namespace: &str, input: &CreateJobInput)
    -> RemoteResult<ContainerJob>;
    async fn get_job(&self, namespace: &str, name: &str) -> RemoteResult<ContainerJob>;
    async fn modify_job(
        &self,
        namespace: &str,
        name: &str,
        input: &ModifyJobInput,
    ) -> RemoteResult<ContainerJob>;
    async fn delete_job(&self, namespace: &str, name: &str) -> RemoteResult<()>;

    // Database clusters
    async fn create_cluster(
        &self,
        namespace: &str,
        input: &CreateClusterInput,
    ) -> RemoteResult<DatabaseCluster>;
    async fn get_cluster(&self, namespace: &str, name: &str) -> RemoteResult<DatabaseCluster>;
    async fn modify_cluster(
        &self,
        namespace: &str,
        name: &str,
        input: &ModifyClusterInput,
    ) -> RemoteResult<DatabaseCluster>;
    async fn delete_cluster(&self, namespace: &str, name: &str) -> RemoteResult<()>;

    // Databases inside a cluster
    async fn create_database(
        &self,
        namespace: &str,
        cluster: &str,
        input: &CreateDatabaseInput,
    ) -> RemoteResult<Database>;
    async fn get_database(
        &self,
        namespace: &str,
        cluster: &str,
        name: &str,
    ) -> RemoteResult<Database>;
    async fn delete_database(&self, namespace: &str, cluster: &str, name: &str)
    -> RemoteResult<()>;
}
