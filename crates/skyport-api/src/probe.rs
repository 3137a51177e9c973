//! Lock probes backed by the control plane client

use crate::client::ControlPlane;
use async_trait::async_trait;
use skyport_cloud::{LockProbe, RemoteError};

/// Reads the lock flag of a container
pub struct ContainerLock<'a>(pub &'a dyn ControlPlane);

/// Reads the lock flag of a container job
pub struct JobLock<'a>(pub &'a dyn ControlPlane);

/// Reads the lock flag of a database cluster
pub struct ClusterLock<'a>(pub &'a dyn ControlPlane);

#[async_trait]
impl LockProbe for ContainerLock<'_> {
    async fn is_locked(&self, namespace: &str, name: &str) -> Result<bool, RemoteError> {
        Ok(self.0.get_container(namespace, name).await?.locked)
    }
}

#[async_trait]
impl LockProbe for JobLock<'_> {
    async fn is_locked(&self, namespace: &str, name: &str) -> Result<bool, RemoteError> {
        Ok(self.0.get_job(namespace, name).await?.locked)
    }
}

#[async_trait]
impl LockProbe for ClusterLock<'_> {
    async fn is_locked(&self, namespace: &str, name: &str) -> Result<bool, RemoteError> {
        Ok(self.0.get_cluster(namespace, name).await?.locked)
    }
}
