//! In-memory control plane for handler tests

use async_trait::async_trait;
use skyport_api::*;
use skyport_cloud::{Desired, ReconcileKey, RemoteError};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex};

type Key = (String, String);

fn key(namespace: &str, name: &str) -> Key {
    (namespace.to_string(), name.to_string())
}

fn not_found(kind: &str, path: &str) -> RemoteError {
    RemoteError::NotFound(format!("{kind} {path} not found"))
}

/// Apply present/absent deltas to a collection, keyed like the reconciler.
fn apply<T: Clone + ReconcileKey>(current: &mut Vec<T>, deltas: &[Desired<T>]) {
    for delta in deltas {
        let k = delta.payload.reconcile_key();
        let pos = current.iter().position(|e| e.reconcile_key() == k);
        match (delta.is_present(), pos) {
            (true, Some(i)) => current[i] = delta.payload.clone(),
            (true, None) => current.push(delta.payload.clone()),
            (false, Some(i)) => {
                current.remove(i);
            }
            (false, None) => {}
        }
    }
}

#[derive(Default)]
struct Store {
    namespaces: BTreeMap<String, Namespace>,
    volumes: BTreeMap<Key, Volume>,
    queues: BTreeMap<Key, MessageQueue>,
    registries: BTreeMap<Key, Registry>,
    containers: BTreeMap<Key, Container>,
    jobs: BTreeMap<Key, ContainerJob>,
    clusters: BTreeMap<Key, DatabaseCluster>,
    databases: BTreeMap<(String, String, String), Database>,

    /// Lock flags returned by successive fetches, per `kind:path`
    locks: HashMap<String, VecDeque<bool>>,
    /// Errors returned by successive calls, per method name
    failures: HashMap<String, VecDeque<RemoteError>>,

    calls: Vec<String>,
    registry_modifications: Vec<ModifyRegistryInput>,
    container_modifications: Vec<ModifyContainerInput>,
    job_modifications: Vec<ModifyJobInput>,
    cluster_modifications: Vec<ModifyClusterInput>,
}

impl Store {
    fn enter(&mut self, method: &str, path: &str) -> RemoteResult<()> {
        self.calls.push(format!("{method} {path}"));
        match self.failures.get_mut(method).and_then(VecDeque::pop_front) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn take_lock(&mut self, kind: &str, path: &str) -> bool {
        self.locks
            .get_mut(&format!("{kind}:{path}"))
            .and_then(VecDeque::pop_front)
            .unwrap_or(false)
    }
}

#[derive(Default, Clone)]
pub struct FakeControlPlane {
    store: Arc<Mutex<Store>>,
}

impl FakeControlPlane {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the `locked` flag seen by successive fetches of
    /// `kind` (`container`, `job`, `cluster`) at `namespace/name`.
    pub fn lock_sequence(&self, kind: &str, path: &str, flags: &[bool]) {
        self.store
            .lock()
            .unwrap()
            .locks
            .insert(format!("{kind}:{path}"), flags.iter().copied().collect());
    }

    /// Script errors returned by the next calls of `method`.
    pub fn fail(&self, method: &str, errors: Vec<RemoteError>) {
        self.store
            .lock()
            .unwrap()
            .failures
            .insert(method.to_string(), errors.into());
    }

    /// Calls recorded so far, as `method path`
    pub fn calls(&self) -> Vec<String> {
        self.store.lock().unwrap().calls.clone()
    }

    pub fn calls_to(&self, method: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.split(' ').next() == Some(method))
            .count()
    }

    pub fn registry_modifications(&self) -> Vec<ModifyRegistryInput> {
        self.store.lock().unwrap().registry_modifications.clone()
    }

    pub fn container_modifications(&self) -> Vec<ModifyContainerInput> {
        self.store.lock().unwrap().container_modifications.clone()
    }

    pub fn job_modifications(&self) -> Vec<ModifyJobInput> {
        self.store.lock().unwrap().job_modifications.clone()
    }

    pub fn cluster_modifications(&self) -> Vec<ModifyClusterInput> {
        self.store.lock().unwrap().cluster_modifications.clone()
    }

    pub fn insert_namespace(&self, name: &str) {
        self.store.lock().unwrap().namespaces.insert(
            name.to_string(),
            Namespace {
                name: name.to_string(),
                description: None,
                state: "active".to_string(),
                created_at: None,
            },
        );
    }

    pub fn insert_container(&self, container: Container) {
        let k = key(&container.namespace, &container.name);
        self.store.lock().unwrap().containers.insert(k, container);
    }

    pub fn insert_cluster(&self, cluster: DatabaseCluster) {
        let k = key(&cluster.namespace, &cluster.name);
        self.store.lock().unwrap().clusters.insert(k, cluster);
    }

    pub fn container(&self, namespace: &str, name: &str) -> Option<Container> {
        self.store
            .lock()
            .unwrap()
            .containers
            .get(&key(namespace, name))
            .cloned()
    }
}

#[async_trait]
impl ControlPlane for FakeControlPlane {
    async fn create_namespace(&self, input: &CreateNamespaceInput) -> RemoteResult<Namespace> {
        let mut store = self.store.lock().unwrap();
        store.enter("create_namespace", &input.name)?;
        let namespace = Namespace {
            name: input.name.clone(),
            description: input.description.clone(),
            state: "active".to_string(),
            created_at: None,
        };
        store.namespaces.insert(input.name.clone(), namespace.clone());
        Ok(namespace)
    }

    async fn get_namespace(&self, name: &str) -> RemoteResult<Namespace> {
        let mut store = self.store.lock().unwrap();
        store.enter("get_namespace", name)?;
        store
            .namespaces
            .get(name)
            .cloned()
            .ok_or_else(|| not_found("namespace", name))
    }

    async fn delete_namespace(&self, name: &str) -> RemoteResult<()> {
        let mut store = self.store.lock().unwrap();
        store.enter("delete_namespace", name)?;
        store
            .namespaces
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| not_found("namespace", name))
    }

    async fn create_volume(
        &self,
        namespace: &str,
        input: &CreateVolumeInput,
    ) -> RemoteResult<Volume> {
        let mut store = self.store.lock().unwrap();
        store.enter("create_volume", &format!("{namespace}/{}", input.name))?;
        let volume = Volume {
            namespace: namespace.to_string(),
            name: input.name.clone(),
            size_gb: input.size_gb,
            locked: false,
            state: "available".to_string(),
        };
        store.volumes.insert(key(namespace, &input.name), volume.clone());
        Ok(volume)
    }

    async fn get_volume(&self, namespace: &str, name: &str) -> RemoteResult<Volume> {
        let mut store = self.store.lock().unwrap();
        let path = format!("{namespace}/{name}");
        store.enter("get_volume", &path)?;
        store
            .volumes
            .get(&key(namespace, name))
            .cloned()
            .ok_or_else(|| not_found("volume", &path))
    }

    async fn modify_volume(
        &self,
        namespace: &str,
        name: &str,
        input: &ModifyVolumeInput,
    ) -> RemoteResult<Volume> {
        let mut store = self.store.lock().unwrap();
        let path = format!("{namespace}/{name}");
        store.enter("modify_volume", &path)?;
        let volume = store
            .volumes
            .get_mut(&key(namespace, name))
            .ok_or_else(|| not_found("volume", &path))?;
        volume.size_gb = input.size_gb;
        Ok(volume.clone())
    }

    async fn delete_volume(&self, namespace: &str, name: &str) -> RemoteResult<()> {
        let mut store = self.store.lock().unwrap();
        let path = format!("{namespace}/{name}");
        store.enter("delete_volume", &path)?;
        store
            .volumes
            .remove(&key(namespace, name))
            .map(|_| ())
            .ok_or_else(|| not_found("volume", &path))
    }

    async fn create_queue(
        &self,
        namespace: &str,
        input: &CreateQueueInput,
    ) -> RemoteResult<MessageQueue> {
        let mut store = self.store.lock().unwrap();
        store.enter("create_queue", &format!("{namespace}/{}", input.name))?;
        let queue = MessageQueue {
            namespace: namespace.to_string(),
            name: input.name.clone(),
            kind: input.kind.clone(),
            endpoint: Some(format!("amqp://{namespace}.queues.internal/{}", input.name)),
            state: "ready".to_string(),
        };
        store.queues.insert(key(namespace, &input.name), queue.clone());
        Ok(queue)
    }

    async fn get_queue(&self, namespace: &str, name: &str) -> RemoteResult<MessageQueue> {
        let mut store = self.store.lock().unwrap();
        let path = format!("{namespace}/{name}");
        store.enter("get_queue", &path)?;
        store
            .queues
            .get(&key(namespace, name))
            .cloned()
            .ok_or_else(|| not_found("queue", &path))
    }

    async fn delete_queue(&self, namespace: &str, name: &str) -> RemoteResult<()> {
        let mut store = self.store.lock().unwrap();
        let path = format!("{namespace}/{name}");
        store.enter("delete_queue", &path)?;
        store
            .queues
            .remove(&key(namespace, name))
            .map(|_| ())
            .ok_or_else(|| not_found("queue", &path))
    }

    async fn create_registry(
        &self,
        namespace: &str,
        input: &CreateRegistryInput,
    ) -> RemoteResult<Registry> {
        let mut store = self.store.lock().unwrap();
        store.enter("create_registry", &format!("{namespace}/{}", input.name))?;
        let registry = Registry {
            namespace: namespace.to_string(),
            name: input.name.clone(),
            url: input.url.clone(),
            username: input.username.clone(),
            state: "ready".to_string(),
        };
        store.registries.insert(key(namespace, &input.name), registry.clone());
        Ok(registry)
    }

    async fn get_registry(&self, namespace: &str, name: &str) -> RemoteResult<Registry> {
        let mut store = self.store.lock().unwrap();
        let path = format!("{namespace}/{name}");
        store.enter("get_registry", &path)?;
        store
            .registries
            .get(&key(namespace, name))
            .cloned()
            .ok_or_else(|| not_found("registry", &path))
    }

    async fn modify_registry(
        &self,
        namespace: &str,
        name: &str,
        input: &ModifyRegistryInput,
    ) -> RemoteResult<Registry> {
        let mut store = self.store.lock().unwrap();
        let path = format!("{namespace}/{name}");
        store.enter("modify_registry", &path)?;
        store.registry_modifications.push(input.clone());
        let registry = store
            .registries
            .get_mut(&key(namespace, name))
            .ok_or_else(|| not_found("registry", &path))?;
        registry.url = input.url.clone();
        registry.username = input.username.clone();
        Ok(registry.clone())
    }

    async fn delete_registry(&self, namespace: &str, name: &str) -> RemoteResult<()> {
        let mut store = self.store.lock().unwrap();
        let path = format!("{namespace}/{name}");
        store.enter("delete_registry", &path)?;
        store
            .registries
            .remove(&key(namespace, name))
            .map(|_| ())
            .ok_or_else(|| not_found("registry", &path))
    }

    async fn create_container(
        &self,
        namespace: &str,
        input: &CreateContainerInput,
    ) -> RemoteResult<Container> {
        let mut store = self.store.lock().unwrap();
        store.enter("create_container", &format!("{namespace}/{}", input.name))?;
        let container = Container {
            namespace: namespace.to_string(),
            name: input.name.clone(),
            image: input.image.clone(),
            resource_class: input.resource_class.clone(),
            instances: input.instances,
            env: input.env.clone(),
            mounts: input.mounts.clone(),
            ingresses: input.ingresses.clone(),
            locked: true,
            state: "deploying".to_string(),
        };
        store.containers.insert(key(namespace, &input.name), container.clone());
        Ok(container)
    }

    async fn get_container(&self, namespace: &str, name: &str) -> RemoteResult<Container> {
        let mut store = self.store.lock().unwrap();
        let path = format!("{namespace}/{name}");
        store.enter("get_container", &path)?;
        let locked = store.take_lock("container", &path);
        let container = store
            .containers
            .get_mut(&key(namespace, name))
            .ok_or_else(|| not_found("container", &path))?;
        container.locked = locked;
        if !locked {
            container.state = "running".to_string();
        }
        Ok(container.clone())
    }

    async fn modify_container(
        &self,
        namespace: &str,
        name: &str,
        input: &ModifyContainerInput,
    ) -> RemoteResult<Container> {
        let mut store = self.store.lock().unwrap();
        let path = format!("{namespace}/{name}");
        store.enter("modify_container", &path)?;
        store.container_modifications.push(input.clone());
        let container = store
            .containers
            .get_mut(&key(namespace, name))
            .ok_or_else(|| not_found("container", &path))?;
        if let Some(image) = &input.image {
            container.image = image.clone();
        }
        if let Some(class) = &input.resource_class {
            container.resource_class = class.clone();
        }
        if let Some(instances) = input.instances {
            container.instances = instances;
        }
        apply(&mut container.env, &input.env);
        apply(&mut container.mounts, &input.mounts);
        apply(&mut container.ingresses, &input.ingresses);
        Ok(container.clone())
    }

    async fn delete_container(&self, namespace: &str, name: &str) -> RemoteResult<()> {
        let mut store = self.store.lock().unwrap();
        let path = format!("{namespace}/{name}");
        store.enter("delete_container", &path)?;
        store
            .containers
            .remove(&key(namespace, name))
            .map(|_| ())
            .ok_or_else(|| not_found("container", &path))
    }

    async fn create_job(
        &self,
        namespace: &str,
        input: &CreateJobInput,
    ) -> RemoteResult<ContainerJob> {
        let mut store = self.store.lock().unwrap();
        store.enter("create_job", &format!("{namespace}/{}", input.name))?;
        let job = ContainerJob {
            namespace: namespace.to_string(),
            name: input.name.clone(),
            image: input.image.clone(),
            resource_class: input.resource_class.clone(),
            schedule: input.schedule.clone(),
            command: input.command.clone(),
            env: input.env.clone(),
            mounts: input.mounts.clone(),
            locked: true,
            state: "provisioning".to_string(),
        };
        store.jobs.insert(key(namespace, &input.name), job.clone());
        Ok(job)
    }

    async fn get_job(&self, namespace: &str, name: &str) -> RemoteResult<ContainerJob> {
        let mut store = self.store.lock().unwrap();
        let path = format!("{namespace}/{name}");
        store.enter("get_job", &path)?;
        let locked = store.take_lock("job", &path);
        let job = store
            .jobs
            .get_mut(&key(namespace, name))
            .ok_or_else(|| not_found("job", &path))?;
        job.locked = locked;
        if !locked {
            job.state = "idle".to_string();
        }
        Ok(job.clone())
    }

    async fn modify_job(
        &self,
        namespace: &str,
        name: &str,
        input: &ModifyJobInput,
    ) -> RemoteResult<ContainerJob> {
        let mut store = self.store.lock().unwrap();
        let path = format!("{namespace}/{name}");
        store.enter("modify_job", &path)?;
        store.job_modifications.push(input.clone());
        let job = store
            .jobs
            .get_mut(&key(namespace, name))
            .ok_or_else(|| not_found("job", &path))?;
        if let Some(image) = &input.image {
            job.image = image.clone();
        }
        if let Some(class) = &input.resource_class {
            job.resource_class = class.clone();
        }
        if let Some(schedule) = &input.schedule {
            job.schedule = schedule.clone();
        }
        if let Some(command) = &input.command {
            job.command = command.clone();
        }
        apply(&mut job.env, &input.env);
        apply(&mut job.mounts, &input.mounts);
        Ok(job.clone())
    }

    async fn delete_job(&self, namespace: &str, name: &str) -> RemoteResult<()> {
        let mut store = self.store.lock().unwrap();
        let path = format!("{namespace}/{name}");
        store.enter("delete_job", &path)?;
        store
            .jobs
            .remove(&key(namespace, name))
            .map(|_| ())
            .ok_or_else(|| not_found("job", &path))
    }

    async fn create_cluster(
        &self,
        namespace: &str,
        input: &CreateClusterInput,
    ) -> RemoteResult<DatabaseCluster> {
        let mut store = self.store.lock().unwrap();
        store.enter("create_cluster", &format!("{namespace}/{}", input.name))?;
        let cluster = DatabaseCluster {
            namespace: namespace.to_string(),
            name: input.name.clone(),
            engine: input.engine.clone(),
            version: input.version.clone(),
            resource_class: input.resource_class.clone(),
            nodes: input.nodes,
            endpoint: Some(format!("{}.{namespace}.db.internal:5432", input.name)),
            locked: true,
            state: "provisioning".to_string(),
        };
        store.clusters.insert(key(namespace, &input.name), cluster.clone());
        Ok(cluster)
    }

    async fn get_cluster(&self, namespace: &str, name: &str) -> RemoteResult<DatabaseCluster> {
        let mut store = self.store.lock().unwrap();
        let path = format!("{namespace}/{name}");
        store.enter("get_cluster", &path)?;
        let locked = store.take_lock("cluster", &path);
        let cluster = store
            .clusters
            .get_mut(&key(namespace, name))
            .ok_or_else(|| not_found("cluster", &path))?;
        cluster.locked = locked;
        if !locked {
            cluster.state = "available".to_string();
        }
        Ok(cluster.clone())
    }

    async fn modify_cluster(
        &self,
        namespace: &str,
        name: &str,
        input: &ModifyClusterInput,
    ) -> RemoteResult<DatabaseCluster> {
        let mut store = self.store.lock().unwrap();
        let path = format!("{namespace}/{name}");
        store.enter("modify_cluster", &path)?;
        store.cluster_modifications.push(input.clone());
        let cluster = store
            .clusters
            .get_mut(&key(namespace, name))
            .ok_or_else(|| not_found("cluster", &path))?;
        if let Some(version) = &input.version {
            cluster.version = version.clone();
        }
        if let Some(class) = &input.resource_class {
            cluster.resource_class = class.clone();
        }
        if let Some(nodes) = input.nodes {
            cluster.nodes = nodes;
        }
        Ok(cluster.clone())
    }

    async fn delete_cluster(&self, namespace: &str, name: &str) -> RemoteResult<()> {
        let mut store = self.store.lock().unwrap();
        let path = format!("{namespace}/{name}");
        store.enter("delete_cluster", &path)?;
        store
            .clusters
            .remove(&key(namespace, name))
            .map(|_| ())
            .ok_or_else(|| not_found("cluster", &path))
    }

    async fn create_database(
        &self,
        namespace: &str,
        cluster: &str,
        input: &CreateDatabaseInput,
    ) -> RemoteResult<Database> {
        let mut store = self.store.lock().unwrap();
        store.enter("create_database", &format!("{namespace}/{cluster}/{}", input.name))?;
        if !store.clusters.contains_key(&key(namespace, cluster)) {
            return Err(not_found("cluster", &format!("{namespace}/{cluster}")));
        }
        let database = Database {
            namespace: namespace.to_string(),
            cluster: cluster.to_string(),
            name: input.name.clone(),
            owner: input.owner.clone(),
            state: "ready".to_string(),
        };
        store.databases.insert(
            (namespace.to_string(), cluster.to_string(), input.name.clone()),
            database.clone(),
        );
        Ok(database)
    }

    async fn get_database(
        &self,
        namespace: &str,
        cluster: &str,
        name: &str,
    ) -> RemoteResult<Database> {
        let mut store = self.store.lock().unwrap();
        let path = format!("{namespace}/{cluster}/{name}");
        store.enter("get_database", &path)?;
        store
            .databases
            .get(&(namespace.to_string(), cluster.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| not_found("database", &path))
    }

    async fn delete_database(
        &self,
        namespace: &str,
        cluster: &str,
        name: &str,
    ) -> RemoteResult<()> {
        let mut store = self.store.lock().unwrap();
        let path = format!("{namespace}/{cluster}/{name}");
        store.enter("delete_database", &path)?;
        store
            .databases
            .remove(&(namespace.to_string(), cluster.to_string(), name.to_string()))
            .map(|_| ())
            .ok_or_else(|| not_found("database", &path))
    }
}
