use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::topology::{DistinguishedName, FunctionRef, TopologyPath};

/// Content descriptor attached to an episode identifier. Every field is
/// independently optional; only present fields contribute a segment to the
/// minted token.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContentDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator_value: Option<String>,
}

impl ContentDescriptor {
    /// Segments in minting order. The definer has whitespace stripped; the
    /// remaining fields are carried verbatim.
    fn ordered_segments(&self) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(definer) = &self.definer {
            out.push(definer.split_whitespace().collect::<String>());
        }
        for field in [
            &self.category,
            &self.sub_category,
            &self.resource,
            &self.segment,
            &self.attribute,
            &self.discriminator_type,
            &self.discriminator_value,
        ] {
            if let Some(value) = field {
                out.push(value.clone());
            }
        }
        out
    }
}

/// Cluster-unique episode identifier. Immutable once minted; carries its
/// creation instant.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskId {
    pub token: String,
    pub created_at: DateTime<Utc>,
}

impl TaskId {
    pub fn token(&self) -> &str {
        &self.token
    }
}

/// Identifier correlating one fulfillment attempt back to the node that
/// performed it. A distinguished-name token built once at creation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FulfillmentId {
    pub dn: DistinguishedName,
    pub created_at: DateTime<Utc>,
}

impl FulfillmentId {
    pub fn token(&self) -> String {
        self.dn.to_string()
    }
}

/// Mint a globally unique episode identifier from a topology position and a
/// content descriptor.
///
/// Returns `None` when either input is absent or the path does not resolve to
/// all three topology names; callers must check before use. The token is a
/// deterministic `plant.workshop.processor(.segments…)` prefix followed by
/// `::` and a random 64-bit hex suffix.
pub fn mint_episode_id(
    path: Option<&TopologyPath>,
    descriptor: Option<&ContentDescriptor>,
) -> Option<TaskId> {
    let path = path?;
    let descriptor = descriptor?;
    if !path.is_resolved() {
        return None;
    }
    let mut token = format!("{}.{}.{}(", path.plant, path.workshop, path.processor);
    for segment in descriptor.ordered_segments() {
        token.push('.');
        token.push_str(&segment);
    }
    token.push(')');
    token.push_str(&format!("::{:016x}", rand::random::<u64>()));
    Some(TaskId {
        token,
        created_at: Utc::now(),
    })
}

/// Build the fulfillment tracking identifier for a work-unit processor's
/// topology function path.
pub fn mint_fulfillment_id(path: &TopologyPath, function: &FunctionRef) -> FulfillmentId {
    let mut dn = path.dn().segment(&function.name);
    if let Some(version) = &function.version {
        dn = dn.segment(version);
    }
    FulfillmentId {
        dn,
        created_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn sample_path() -> TopologyPath {
        TopologyPath::new("P1", "W1", "U1")
    }

    #[test]
    fn prefix_is_deterministic() {
        let descriptor = ContentDescriptor {
            category: Some("Obs".to_string()),
            ..Default::default()
        };
        let id = mint_episode_id(Some(&sample_path()), Some(&descriptor)).unwrap();
        let (prefix, suffix) = id.token.split_once("::").unwrap();
        assert_eq!(prefix, "P1.W1.U1(.Obs)");
        assert_eq!(suffix.len(), 16);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn descriptor_segments_keep_fixed_order() {
        let descriptor = ContentDescriptor {
            definer: Some("HL 7".to_string()),
            category: Some("Obs".to_string()),
            resource: Some("Bundle".to_string()),
            discriminator_value: Some("x".to_string()),
            ..Default::default()
        };
        let id = mint_episode_id(Some(&sample_path()), Some(&descriptor)).unwrap();
        // definer whitespace stripped, remaining fields verbatim
        assert!(id.token.starts_with("P1.W1.U1(.HL7.Obs.Bundle.x)::"));
    }

    #[test]
    fn absent_inputs_cannot_mint() {
        assert!(mint_episode_id(None, Some(&ContentDescriptor::default())).is_none());
        assert!(mint_episode_id(Some(&sample_path()), None).is_none());
        let unresolved = TopologyPath::new("P1", "", "U1");
        assert!(mint_episode_id(Some(&unresolved), Some(&ContentDescriptor::default())).is_none());
    }

    #[test]
    fn ten_thousand_mints_are_distinct() {
        let descriptor = ContentDescriptor {
            category: Some("Obs".to_string()),
            ..Default::default()
        };
        let path = sample_path();
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            let id = mint_episode_id(Some(&path), Some(&descriptor)).unwrap();
            assert!(seen.insert(id.token), "identifier collision");
        }
    }

    #[test]
    fn fulfillment_id_follows_function_path() {
        let function = FunctionRef::new("transformer").with_version("1.0.0");
        let id = mint_fulfillment_id(&sample_path(), &function);
        assert_eq!(id.token(), "P1.W1.U1.transformer.1.0.0");
    }
}
