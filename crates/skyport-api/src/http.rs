//! REST implementation of [`ControlPlane`]
//!
//! JSON over HTTPS with bearer token authentication. Resources live under
//! `/v1/namespaces/{namespace}/{kind}/{name}`.

use crate::client::{ControlPlane, RemoteResult};
use crate::error::{ApiError, Result};
use crate::model::*;
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

const API_VERSION: &str = "v1";

/// HTTP control plane client
#[derive(Debug, Clone)]
pub struct HttpControlPlane {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpControlPlane {
    pub fn new(endpoint: &str, token: Option<String>) -> Result<Self> {
        let invalid = || ApiError::InvalidEndpoint(endpoint.to_string());
        let base_url = Url::parse(endpoint).map_err(|_| invalid())?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(invalid());
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("skyport/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Versioned API URL with every path segment percent-encoded
    fn url(&self, path: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(API_VERSION).extend(path);
        }
        url
    }

    fn request(&self, method: Method, path: &[&str]) -> RequestBuilder {
        let url = self.url(path);
        tracing::debug!("{} {}", method, url.path());
        let req = self.client.request(method, url);
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn execute(&self, req: RequestBuilder) -> Result<reqwest::Response> {
        let response = req.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            message: error_message(status, &body),
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &[&str]) -> Result<T> {
        let response = self.execute(self.request(Method::GET, path)).await?;
        Ok(response.json().await?)
    }

    async fn send<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &[&str],
        body: &B,
    ) -> Result<T> {
        let response = self
            .execute(self.request(method, path).json(body))
            .await?;
        Ok(response.json().await?)
    }

    async fn delete(&self, path: &[&str]) -> Result<()> {
        self.execute(self.request(Method::DELETE, path)).await?;
        Ok(())
    }
}

/// Error body shapes the control plane is known to return
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(alias = "message")]
    error: String,
}

fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed.error;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    } else {
        trimmed.to_string()
    }
}

fn namespace_path(namespace: &str) -> Vec<&str> {
    vec!["namespaces", namespace]
}

fn collection_path<'a>(namespace: &'a str, kind: &'a str) -> Vec<&'a str> {
    vec!["namespaces", namespace, kind]
}

fn item_path<'a>(namespace: &'a str, kind: &'a str, name: &'a str) -> Vec<&'a str> {
    vec!["namespaces", namespace, kind, name]
}

fn database_path<'a>(namespace: &'a str, cluster: &'a str) -> Vec<&'a str> {
    vec!["namespaces", namespace, "clusters", cluster, "databases"]
}

#[async_trait]
impl ControlPlane for HttpControlPlane {
    async fn create_namespace(&self, input: &CreateNamespaceInput) -> RemoteResult<Namespace> {
        Ok(self.send(Method::POST, &["namespaces"], input).await?)
    }

    async fn get_namespace(&self, name: &str) -> RemoteResult<Namespace> {
        Ok(self.get(&namespace_path(name)).await?)
    }

    async fn delete_namespace(&self, name: &str) -> RemoteResult<()> {
        Ok(self.delete(&namespace_path(name)).await?)
    }

    async fn create_volume(
        &self,
        namespace: &str,
        input: &CreateVolumeInput,
    ) -> RemoteResult<Volume> {
        let path = collection_path(namespace, "volumes");
        Ok(self.send(Method::POST, &path, input).await?)
    }

    async fn get_volume(&self, namespace: &str, name: &str) -> RemoteResult<Volume> {
        Ok(self.get(&item_path(namespace, "volumes", name)).await?)
    }

    async fn modify_volume(
        &self,
        namespace: &str,
        name: &str,
        input: &ModifyVolumeInput,
    ) -> RemoteResult<Volume> {
        let path = item_path(namespace, "volumes", name);
        Ok(self.send(Method::PATCH, &path, input).await?)
    }

    async fn delete_volume(&self, namespace: &str, name: &str) -> RemoteResult<()> {
        Ok(self.delete(&item_path(namespace, "volumes", name)).await?)
    }

    async fn create_queue(
        &self,
        namespace: &str,
        input: &CreateQueueInput,
    ) -> RemoteResult<MessageQueue> {
        let path = collection_path(namespace, "queues");
        Ok(self.send(Method::POST, &path, input).await?)
    }

    async fn get_queue(&self, namespace: &str, name: &str) -> RemoteResult<MessageQueue> {
        Ok(self.get(&item_path(namespace, "queues", name)).await?)
    }

    async fn delete_queue(&self, namespace: &str, name: &str) -> RemoteResult<()> {
        Ok(self.delete(&item_path(namespace, "queues", name)).await?)
    }

    async fn create_registry(
        &self,
        namespace: &str,
        input: &CreateRegistryInput,
    ) -> RemoteResult<Registry> {
        let path = collection_path(namespace, "registries");
        Ok(self.send(Method::POST, &path, input).await?)
    }

    async fn get_registry(&self, namespace: &str, name: &str) -> RemoteResult<Registry> {
        Ok(self.get(&item_path(namespace, "registries", name)).await?)
    }

    async fn modify_registry(
        &self,
        namespace: &str,
        name: &str,
        input: &ModifyRegistryInput,
    ) -> RemoteResult<Registry> {
        let path = item_path(namespace, "registries", name);
        Ok(self.send(Method::PATCH, &path, input).await?)
    }

    async fn delete_registry(&self, namespace: &str, name: &str) -> RemoteResult<()> {
        Ok(self.delete(&item_path(namespace, "registries", name)).await?)
    }

    async fn create_container(
        &self,
        namespace: &str,
        input: &CreateContainerInput,
    ) -> RemoteResult<Container> {
        let path = collection_path(namespace, "containers");
        Ok(self.send(Method::POST, &path, input).await?)
    }

    async fn get_container(&self, namespace: &str, name: &str) -> RemoteResult<Container> {
        Ok(self.get(&item_path(namespace, "containers", name)).await?)
    }

    async fn modify_container(
        &self,
        namespace: &str,
        name: &str,
        input: &ModifyContainerInput,
    ) -> RemoteResult<Container> {
        let path = item_path(namespace, "containers", name);
        Ok(self.send(Method::PATCH, &path, input).await?)
    }

    async fn delete_container(&self, namespace: &str, name: &str) -> RemoteResult<()> {
        Ok(self.delete(&item_path(namespace, "containers", name)).await?)
    }

    async fn create_job(
        &self,
        namespace: &str,
        input: &CreateJobInput,
    ) -> RemoteResult<ContainerJob> {
        let path = collection_path(namespace, "jobs");
        Ok(self.send(Method::POST, &path, input).await?)
    }

    async fn get_job(&self, namespace: &str, name: &str) -> RemoteResult<ContainerJob> {
        Ok(self.get(&item_path(namespace, "jobs", name)).await?)
    }

    async fn modify_job(
        &self,
        namespace: &str,
        name: &str,
        input: &ModifyJobInput,
    ) -> RemoteResult<ContainerJob> {
        let path = item_path(namespace, "jobs", name);
        Ok(self.send(Method::PATCH, &path, input).await?)
    }

    async fn delete_job(&self, namespace: &str, name: &str) -> RemoteResult<()> {
        Ok(self.delete(&item_path(namespace, "jobs", name)).await?)
    }

    async fn create_cluster(
        &self,
        namespace: &str,
        input: &CreateClusterInput,
    ) -> RemoteResult<DatabaseCluster> {
        let path = collection_path(namespace, "clusters");
        Ok(self.send(Method::POST, &path, input).await?)
    }

    async fn get_cluster(&self, namespace: &str, name: &str) -> RemoteResult<DatabaseCluster> {
        Ok(self.get(&item_path(namespace, "clusters", name)).await?)
    }

    async fn modify_cluster(
        &self,
        namespace: &str,
        name: &str,
        input: &ModifyClusterInput,
    ) -> RemoteResult<DatabaseCluster> {
        let path = item_path(namespace, "clusters", name);
        Ok(self.send(Method::PATCH, &path, input).await?)
    }

    async fn delete_cluster(&self, namespace: &str, name: &str) -> RemoteResult<()> {
        Ok(self.delete(&item_path(namespace, "clusters", name)).await?)
    }

    async fn create_database(
        &self,
        namespace: &str,
        cluster: &str,
        input: &CreateDatabaseInput,
    ) -> RemoteResult<Database> {
        let path = database_path(namespace, cluster);
        Ok(self.send(Method::POST, &path, input).await?)
    }

    async fn get_database(
        &self,
        namespace: &str,
        cluster: &str,
        name: &str,
    ) -> RemoteResult<Database> {
        let mut path = database_path(namespace, cluster);
        path.push(name);
        Ok(self.get(&path).await?)
    }

    async fn delete_database(
        &self,
        namespace: &str,
        cluster: &str,
        name: &str,
    ) -> RemoteResult<()> {
        let mut path = database_path(namespace, cluster);
        path.push(name);
        Ok(self.delete(&path).await?)
    }
}
