//! Present/Absent reconciliation of nested collections
//!
//! The control plane updates nested collections (mounts, ingresses,
//! environment variables) from a list of entries tagged `present` or
//! `absent` instead of replacing the whole collection. [`reconcile`] builds
//! that list from the prior and planned snapshots.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Desired remote state of a nested entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    Present,
    Absent,
}

impl std::fmt::Display for Presence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Presence::Present => write!(f, "present"),
            Presence::Absent => write!(f, "absent"),
        }
    }
}

/// An entry together with the state the remote side should converge it to.
///
/// Serializes flat: `{"path": "/data", "volume": "v1", "state": "present"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Desired<T> {
    #[serde(flatten)]
    pub payload: T,
    pub state: Presence,
}

impl<T> Desired<T> {
    pub fn present(payload: T) -> Self {
        Self {
            payload,
            state: Presence::Present,
        }
    }

    pub fn absent(payload: T) -> Self {
        Self {
            payload,
            state: Presence::Absent,
        }
    }

    pub fn is_present(&self) -> bool {
        self.state == Presence::Present
    }
}

/// Natural key of a nested entry used to match it across snapshots.
pub trait ReconcileKey {
    fn reconcile_key(&self) -> String;
}

/// Join key parts with `|`.
pub fn composite_key(parts: &[&str]) -> String {
    parts.join("|")
}

/// Merge `planned` and `previous` into Present/Absent entries.
///
/// Every planned entry is emitted as present, in planned order, followed by
/// every previous entry whose key is no longer planned, as absent, in
/// previous order.
pub fn reconcile<T, K>(planned: &[T], previous: &[T], key_of: K) -> Vec<Desired<T>>
where
    T: Clone,
    K: Fn(&T) -> String,
{
    let planned_keys: HashSet<String> = planned.iter().map(&key_of).collect();

    planned
        .iter()
        .cloned()
        .map(Desired::present)
        .chain(
            previous
                .iter()
                .filter(|entry| !planned_keys.contains(&key_of(*entry)))
                .cloned()
                .map(Desired::absent),
        )
        .collect()
}

/// [`reconcile`] using the entry's [`ReconcileKey`].
pub fn reconcile_by_key<T>(planned: &[T], previous: &[T]) -> Vec<Desired<T>>
where
    T: Clone + ReconcileKey,
{
    reconcile(planned, previous, ReconcileKey::reconcile_key)
}
