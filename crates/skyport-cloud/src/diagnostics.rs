//! Diagnostics sink
//!
//! Lifecycle handlers never return errors to the host directly. They push
//! user-facing diagnostics into a [`Diagnostics`] collection and bail out
//! as soon as a terminal error has been recorded.

use crate::error::CloudError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Error => "Error",
            Severity::Warning => "Warning",
        };
        if self.detail.is_empty() {
            write!(f, "{}: {}", label, self.summary)
        } else {
            write!(f, "{}: {}\n\n{}", label, self.summary, self.detail)
        }
    }
}

/// Lifecycle operation, used to prefix diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    Import,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Create => write!(f, "create"),
            Operation::Read => write!(f, "read"),
            Operation::Update => write!(f, "update"),
            Operation::Delete => write!(f, "delete"),
            Operation::Import => write!(f, "import"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    pub items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        self.items.push(Diagnostic {
            severity: Severity::Error,
            summary: summary.into(),
            detail: detail.into(),
        });
    }

    pub fn warning(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        self.items.push(Diagnostic {
            severity: Severity::Warning,
            summary: summary.into(),
            detail: detail.into(),
        });
    }

    /// Record `err` as a terminal error of `operation` on `resource`.
    pub fn operation_failed(&mut self, operation: Operation, resource: &str, err: &CloudError) {
        tracing::error!(%operation, resource, error = %err, "operation failed");
        self.error(
            format!("Failed to {} {}", operation, resource),
            err.to_string(),
        );
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| d.severity == Severity::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Unwrap a core result into the sink, returning `None` on failure.
pub trait ReportExt<T> {
    fn report(self, diags: &mut Diagnostics, operation: Operation, resource: &str) -> Option<T>;
}

impl<T, E> ReportExt<T> for std::result::Result<T, E>
where
    E: Into<CloudError>,
{
    fn report(self, diags: &mut Diagnostics, operation: Operation, resource: &str) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(e) => {
                diags.operation_failed(operation, resource, &e.into());
                None
            }
        }
    }
}
