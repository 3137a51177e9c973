//! Skyport resource handlers
//!
//! Maps declarative resource states onto control plane calls. Each resource
//! type implements [`Resource`]; [`Provider`] exposes all of them by type
//! name as JSON-speaking [`DynamicResource`]s.
//!
//! | type name                  | import id                        |
//! |----------------------------|----------------------------------|
//! | `skyport_namespace`        | `<name>`                         |
//! | `skyport_volume`           | `<namespace>/<name>`             |
//! | `skyport_message_queue`    | `<namespace>/<name>`             |
//! | `skyport_registry`         | `<namespace>/<name>`             |
//! | `skyport_container`        | `<namespace>/<name>`             |
//! | `skyport_container_job`    | `<namespace>/<name>`             |
//! | `skyport_database_cluster` | `<namespace>/<name>`             |
//! | `skyport_database`         | `<namespace>/<cluster>/<name>`   |

pub mod import_id;
pub mod provider;
pub mod resource;
pub mod resource_class;
pub mod resources;
pub mod settings;

#[cfg(test)]
pub(crate) mod testing;

pub use import_id::parse_import_id;
pub use provider::{Provider, RESOURCE_TYPES};
pub use resource::{DynamicResource, Resource};
pub use resource_class::{ResourceClass, format_resource_class};
pub use settings::Settings;
