//! Per-operation timeouts and backoff parameters

use skyport_cloud::RetryConfig;
use skyport_config::{ProviderConfig, Timeouts};

#[derive(Debug, Clone)]
pub struct Settings {
    pub timeouts: Timeouts,

    /// Lock polling around container, job and cluster mutations
    pub lock_wait: RetryConfig,

    /// Delete calls rejected while locked
    pub delete_retry: RetryConfig,

    /// Namespace delete, bounded by the namespace delete timeout rather
    /// than a retry count
    pub namespace_delete_retry: RetryConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(Timeouts::default())
    }
}

impl Settings {
    pub fn new(timeouts: Timeouts) -> Self {
        Self {
            timeouts,
            lock_wait: RetryConfig::lock_wait(),
            delete_retry: RetryConfig::delete(),
            namespace_delete_retry: RetryConfig::lock_wait(),
        }
    }

    pub fn from_config(config: &ProviderConfig) -> Self {
        Self::new(config.timeouts.clone())
    }
}
