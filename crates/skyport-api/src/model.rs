//! Control plane resource representations and request payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skyport_cloud::{Desired, ReconcileKey, composite_key};

// ============ Nested entries ============

/// Environment variable of a container or job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub secret: bool,
}

impl ReconcileKey for EnvVar {
    fn reconcile_key(&self) -> String {
        self.name.clone()
    }
}

/// Volume mounted into a container or job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mount {
    pub path: String,
    #[serde(rename = "volumeName")]
    pub volume_name: String,
}

impl ReconcileKey for Mount {
    fn reconcile_key(&self) -> String {
        composite_key(&[&self.path, &self.volume_name])
    }
}

/// Public domain routed to a container port
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingress {
    #[serde(rename = "domainName")]
    pub domain_name: String,
    pub port: u16,
}

impl ReconcileKey for Ingress {
    fn reconcile_key(&self) -> String {
        self.domain_name.clone()
    }
}

// ============ Resources ============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Namespace {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub state: String,
    #[serde(default, rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    pub namespace: String,
    pub name: String,
    #[serde(rename = "sizeGb")]
    pub size_gb: u32,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageQueue {
    pub namespace: String,
    pub name: String,
    pub kind: String,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registry {
    pub namespace: String,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub namespace: String,
    pub name: String,
    pub image: String,
    /// Combined CPU/RAM class, e.g. `"0.5core-1gb"`
    #[serde(rename = "resourceClass")]
    pub resource_class: String,
    #[serde(default = "default_instances")]
    pub instances: u32,
    #[serde(default)]
    pub env: Vec<EnvVar>,
    #[serde(default)]
    pub mounts: Vec<Mount>,
    #[serde(default)]
    pub ingresses: Vec<Ingress>,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub state: String,
}

fn default_instances() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerJob {
    pub namespace: String,
    pub name: String,
    pub image: String,
    #[serde(rename = "resourceClass")]
    pub resource_class: String,
    #[serde(default)]
    pub schedule: Option<String>,
    #[serde(default)]
    pub command: Vec<String>,
    #[serde(default)]
    pub env: Vec<EnvVar>,
    #[serde(default)]
    pub mounts: Vec<Mount>,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseCluster {
    pub namespace: String,
    pub name: String,
    pub engine: String,
    pub version: String,
    #[serde(rename = "resourceClass")]
    pub resource_class: String,
    pub nodes: u32,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Database {
    pub namespace: String,
    pub cluster: String,
    pub name: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub state: String,
}

// ============ Requests ============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateNamespaceInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateVolumeInput {
    pub name: String,
    #[serde(rename = "sizeGb")]
    pub size_gb: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifyVolumeInput {
    #[serde(rename = "sizeGb")]
    pub size_gb: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateQueueInput {
    pub name: String,
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRegistryInput {
    pub name: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifyRegistryInput {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateContainerInput {
    pub name: String,
    pub image: String,
    #[serde(rename = "resourceClass")]
    pub resource_class: String,
    pub instances: u32,
    pub env: Vec<EnvVar>,
    pub mounts: Vec<Mount>,
    pub ingresses: Vec<Ingress>,
}

/// Partial update; nested collections are sent as present/absent deltas
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModifyContainerInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(rename = "resourceClass", skip_serializing_if = "Option::is_none")]
    pub resource_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instances: Option<u32>,
    pub env: Vec<Desired<EnvVar>>,
    pub mounts: Vec<Desired<Mount>>,
    pub ingresses: Vec<Desired<Ingress>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateJobInput {
    pub name: String,
    pub image: String,
    #[serde(rename = "resourceClass")]
    pub resource_class: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    pub command: Vec<String>,
    pub env: Vec<EnvVar>,
    pub mounts: Vec<Mount>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModifyJobInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(rename = "resourceClass", skip_serializing_if = "Option::is_none")]
    pub resource_class: Option<String>,
    /// `Some(None)` clears the schedule
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<Vec<String>>,
    pub env: Vec<Desired<EnvVar>>,
    pub mounts: Vec<Desired<Mount>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateClusterInput {
    pub name: String,
    pub engine: String,
    pub version: String,
    #[serde(rename = "resourceClass")]
    pub resource_class: String,
    pub nodes: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModifyClusterInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(rename = "resourceClass", skip_serializing_if = "Option::is_none")]
    pub resource_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateDatabaseInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}
