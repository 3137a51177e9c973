//! Skyport control plane client
//!
//! This crate defines the [`ControlPlane`] trait consumed by the Skyport
//! resource handlers, the remote resource models, and an HTTP
//! implementation.
//!
//! # Example
//!
//! ```ignore
//! use skyport_api::{ControlPlane, HttpControlPlane};
//!
//! let client = HttpControlPlane::new("https://api.skyport.dev", Some(token))?;
//! let container = client.get_container("prod", "web").await?;
//! if container.locked {
//!     // an operation is still in flight
//! }
//! ```

pub mod client;
pub mod error;
pub mod http;
pub mod model;
pub mod probe;

pub use client::{ControlPlane, RemoteResult};
pub use error::{ApiError, Result};
pub use http::HttpControlPlane;
pub use model::*;
pub use probe::{ClusterLock, ContainerLock, JobLock};
