//! Combined CPU/RAM resource class
//!
//! The control plane expresses compute size as a single string such as
//! `"0.5core-1gb"`. Resource states keep CPU and memory as separate numbers.

use skyport_cloud::CloudError;
use std::fmt;
use std::str::FromStr;

const EXPECTED: &str = "\"<cpu>core-<memory>gb\" (e.g. \"0.5core-1gb\")";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceClass {
    pub cpu: f64,
    pub memory_gb: f64,
}

impl ResourceClass {
    pub fn new(cpu: f64, memory_gb: f64) -> Result<Self, CloudError> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(cpu) || !valid(memory_gb) {
            return Err(CloudError::validation(
                "resource class",
                "positive cpu and memory_gb",
                format!("cpu={cpu}, memory_gb={memory_gb}"),
            ));
        }
        Ok(Self { cpu, memory_gb })
    }
}

/// Format CPU and memory as the control plane's combined class string.
pub fn format_resource_class(cpu: f64, memory_gb: f64) -> Result<String, CloudError> {
    Ok(ResourceClass::new(cpu, memory_gb)?.to_string())
}

impl FromStr for ResourceClass {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CloudError::validation("resource class", EXPECTED, s);

        let (cpu, memory) = s.trim().split_once('-').ok_or_else(invalid)?;
        let cpu = cpu
            .strip_suffix("core")
            .and_then(|v| v.parse::<f64>().ok())
            .ok_or_else(invalid)?;
        let memory = memory
            .strip_suffix("gb")
            .and_then(|v| v.parse::<f64>().ok())
            .ok_or_else(invalid)?;

        Self::new(cpu, memory).map_err(|_| invalid())
    }
}

impl fmt::Display for ResourceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}core-{}gb", self.cpu, self.memory_gb)
    }
}
