//! Skyport lifecycle core
//!
//! Resource-type independent building blocks used by the Skyport resource
//! handlers:
//!
//! - **Lock polling**: wait for the control plane to release a resource
//!   lock, with capped exponential backoff ([`wait_for_unlocked`])
//! - **Locked retry**: retry mutations and deletes rejected while locked
//!   ([`mutate_with_retry`], [`delete_with_retry`])
//! - **Reconciliation**: turn prior/planned nested collections into
//!   present/absent entries ([`reconcile`])
//! - **Diagnostics**: user-facing error collection ([`Diagnostics`])
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │            skyport (CLI host / plugin)          │
//! └─────────────────┬───────────────────────────────┘
//!                   │ OperationContext + Diagnostics
//! ┌─────────────────▼───────────────────────────────┐
//! │                skyport-provider                  │
//! │   container, job, cluster, volume, ... handlers  │
//! └───────┬─────────────────────────┬───────────────┘
//!         │                         │
//! ┌───────▼───────────┐     ┌───────▼───────────────┐
//! │   skyport-cloud   │     │      skyport-api      │
//! │ poll / reconcile  │◄────│ ControlPlane + HTTP   │
//! └───────────────────┘     └───────────────────────┘
//! ```

pub mod backoff;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod lifecycle;
pub mod poll;
pub mod reconcile;
pub mod resource;
pub mod retry;

// Re-exports
pub use backoff::{Backoff, RetryConfig};
pub use context::OperationContext;
pub use diagnostics::{Diagnostic, Diagnostics, Operation, ReportExt, Severity};
pub use error::{CloudError, RemoteError, Result};
pub use lifecycle::LockedMutation;
pub use poll::{LockProbe, wait_for_unlocked};
pub use reconcile::{Desired, Presence, ReconcileKey, composite_key, reconcile, reconcile_by_key};
pub use resource::ResourceRef;
pub use retry::{DeleteOutcome, delete_with_retry, mutate_with_retry};
