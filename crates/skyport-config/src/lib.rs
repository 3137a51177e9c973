pub mod error;

pub use error::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_CONFIG_PATH: &str = "SKYPORT_CONFIG_PATH";
pub const ENV_ENDPOINT: &str = "SKYPORT_ENDPOINT";
pub const ENV_TOKEN: &str = "SKYPORT_TOKEN";

/// Provider configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Control plane base URL
    #[serde(default)]
    pub endpoint: Option<String>,

    /// API token
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default)]
    pub timeouts: Timeouts,
}

/// Operation timeouts in seconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeouts {
    /// Container and container job create/update
    #[serde(default = "default_container_secs")]
    pub container_secs: u64,

    /// Create/update of every other resource
    #[serde(default = "default_mutate_secs")]
    pub mutate_secs: u64,

    #[serde(default = "default_read_secs")]
    pub read_secs: u64,

    #[serde(default = "default_delete_secs")]
    pub delete_secs: u64,

    /// Namespace delete waits for every child resource to go away
    #[serde(default = "default_namespace_delete_secs")]
    pub namespace_delete_secs: u64,

    #[serde(default = "default_cluster_create_secs")]
    pub cluster_create_secs: u64,
}

fn default_container_secs() -> u64 {
    30
}
fn default_mutate_secs() -> u64 {
    120
}
fn default_read_secs() -> u64 {
    60
}
fn default_delete_secs() -> u64 {
    120
}
fn default_namespace_delete_secs() -> u64 {
    300
}
fn default_cluster_create_secs() -> u64 {
    600
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            container_secs: default_container_secs(),
            mutate_secs: default_mutate_secs(),
            read_secs: default_read_secs(),
            delete_secs: default_delete_secs(),
            namespace_delete_secs: default_namespace_delete_secs(),
            cluster_create_secs: default_cluster_create_secs(),
        }
    }
}

impl Timeouts {
    pub fn container(&self) -> Duration {
        Duration::from_secs(self.container_secs)
    }

    pub fn mutate(&self) -> Duration {
        Duration::from_secs(self.mutate_secs)
    }

    pub fn read(&self) -> Duration {
        Duration::from_secs(self.read_secs)
    }

    pub fn delete(&self) -> Duration {
        Duration::from_secs(self.delete_secs)
    }

    pub fn namespace_delete(&self) -> Duration {
        Duration::from_secs(self.namespace_delete_secs)
    }

    pub fn cluster_create(&self) -> Duration {
        Duration::from_secs(self.cluster_create_secs)
    }
}

impl ProviderConfig {
    /// Endpoint, or an error explaining where to set it
    pub fn require_endpoint(&self) -> Result<&str> {
        self.endpoint
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .ok_or(ConfigError::MissingEndpoint)
    }

    /// Override file values with SKYPORT_ENDPOINT / SKYPORT_TOKEN
    pub fn apply_env(&mut self) {
        if let Ok(endpoint) = std::env::var(ENV_ENDPOINT) {
            self.endpoint = Some(endpoint);
        }
        if let Ok(token) = std::env::var(ENV_TOKEN) {
            self.token = Some(token);
        }
    }
}

/// Locate the provider config file
///
/// Search order:
/// 1. SKYPORT_CONFIG_PATH (must exist when set)
/// 2. Current directory: skyport.yaml, .skyport.yaml
/// 3. ~/.config/skyport/config.yaml
pub fn find_config_file() -> Result<Option<PathBuf>> {
    if let Ok(config_path) = std::env::var(ENV_CONFIG_PATH) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(Some(path));
        }
        return Err(ConfigError::FileNotFound(path));
    }

    let current_dir = std::env::current_dir()?;
    for filename in ["skyport.yaml", ".skyport.yaml"] {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(Some(path));
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global = config_dir.join("skyport").join("config.yaml");
        if global.exists() {
            return Ok(Some(global));
        }
    }

    Ok(None)
}

/// Parse a config file
pub fn load_from(path: &Path) -> Result<ProviderConfig> {
    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(ProviderConfig::default());
    }
    serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Discover, parse and apply environment overrides
pub fn load() -> Result<ProviderConfig> {
    let mut config = match find_config_file()? {
        Some(path) => {
            tracing::debug!("Loading config from {}", path.display());
            load_from(&path)?
        }
        None => ProviderConfig::default(),
    };
    config.apply_env();
    Ok(config)
}
