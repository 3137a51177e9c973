use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "No control plane endpoint configured. Set one of:\n\
        - SKYPORT_ENDPOINT environment variable\n\
        - `endpoint` in ./skyport.yaml, ./.skyport.yaml or ~/.config/skyport/config.yaml\n\
        - a file pointed to by SKYPORT_CONFIG_PATH"
    )]
    MissingEndpoint,

    #[error("Config file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Invalid config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
