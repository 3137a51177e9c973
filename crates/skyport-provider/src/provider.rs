//! Resource registry

use crate::resource::DynamicResource;
use crate::resources::*;
use crate::settings::Settings;
use skyport_api::ControlPlane;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Type names registered by [`Provider::new`], sorted
pub const RESOURCE_TYPES: [&str; 8] = [
    "skyport_container",
    "skyport_container_job",
    "skyport_database",
    "skyport_database_cluster",
    "skyport_message_queue",
    "skyport_namespace",
    "skyport_registry",
    "skyport_volume",
];

/// Every managed resource type, addressable by its type name.
pub struct Provider {
    resources: BTreeMap<&'static str, Box<dyn DynamicResource>>,
}

impl Provider {
    pub fn new(client: Arc<dyn ControlPlane>, settings: Settings) -> Self {
        let handlers: Vec<Box<dyn DynamicResource>> = vec![
            Box::new(NamespaceResource::new(client.clone(), settings.clone())),
            Box::new(VolumeResource::new(client.clone(), settings.clone())),
            Box::new(MessageQueueResource::new(client.clone(), settings.clone())),
            Box::new(RegistryResource::new(client.clone(), settings.clone())),
            Box::new(ContainerResource::new(client.clone(), settings.clone())),
            Box::new(ContainerJobResource::new(client.clone(), settings.clone())),
            Box::new(DatabaseClusterResource::new(client.clone(), settings.clone())),
            Box::new(DatabaseResource::new(client, settings)),
        ];

        let resources = handlers
            .into_iter()
            .map(|handler| (handler.type_name(), handler))
            .collect();
        Self { resources }
    }

    pub fn resource(&self, type_name: &str) -> Option<&dyn DynamicResource> {
        self.resources.get(type_name).map(|r| r.as_ref())
    }

    /// Registered type names, sorted
    pub fn resource_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.resources.keys().copied()
    }
}
