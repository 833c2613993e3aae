//! Baseline manifest documents.

use crate::error::{ApiToolsError, Result};
use crate::model::{Baseline, BaselineBuilder, Component};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Serialized form of a baseline, as written by the bytecode reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineManifest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_environment: Option<String>,
    #[serde(default)]
    pub components: Vec<Component>,
}

impl BaselineManifest {
    /// Capture a populated baseline. Resolution errors recorded by the
    /// resolution phase are kept.
    pub fn from_baseline(baseline: &Baseline) -> Result<Self> {
        Ok(Self {
            name: baseline.name().to_string(),
            execution_environment: baseline.execution_environment().map(ToString::to_string),
            components: baseline.components()?.to_vec(),
        })
    }

    /// Populate and resolve a baseline from this manifest.
    ///
    /// Every component needs a symbolic name and a version.
    pub fn into_baseline(self, location: Option<PathBuf>) -> Result<Baseline> {
        for (idx, component) in self.components.iter().enumerate() {
            if component.symbolic_name.trim().is_empty() {
                return Err(ApiToolsError::missing_field("symbolic_name", format!("component #{idx}")));
            }
            if component.version.trim().is_empty() {
                return Err(ApiToolsError::missing_field("version", component.symbolic_name.clone()));
            }
        }
        let mut builder = BaselineBuilder::new(self.name);
        if let Some(environment) = self.execution_environment {
            builder = builder.execution_environment(environment);
        }
        if let Some(location) = location {
            builder = builder.location(location);
        }
        for component in self.components {
            builder.add_component(component);
        }
        builder.build()
    }
}
