use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Hierarchical location of a component: processing plant → workshop →
/// work-unit processor. All three names are required; tags carry optional
/// deployment metadata (site, version).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TopologyPath {
    pub plant: String,
    pub workshop: String,
    pub processor: String,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl TopologyPath {
    pub fn new(
        plant: impl Into<String>,
        workshop: impl Into<String>,
        processor: impl Into<String>,
    ) -> Self {
        Self {
            plant: plant.into(),
            workshop: workshop.into(),
            processor: processor.into(),
            tags: BTreeMap::new(),
        }
    }

    /// A path only resolves when all three topology names are present.
    pub fn is_resolved(&self) -> bool {
        !self.plant.trim().is_empty()
            && !self.workshop.trim().is_empty()
            && !self.processor.trim().is_empty()
    }

    pub fn dn(&self) -> DistinguishedName {
        DistinguishedName::new()
            .segment(&self.plant)
            .segment(&self.workshop)
            .segment(&self.processor)
    }
}

/// Reference to a topology function: which kind of work-unit processor may
/// fulfill a task.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FunctionRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl FunctionRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

/// Generic dotted-path value type. Identifier flavors are built by dedicated
/// builder functions appending segments, not by subtyping.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct DistinguishedName {
    segments: Vec<String>,
}

impl DistinguishedName {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one segment; empty segments are dropped so a partially filled
    /// source never produces `a..b`.
    pub fn segment(mut self, value: &str) -> Self {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            self.segments.push(trimmed.to_string());
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for DistinguishedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}
