use anyhow::Result;
use serde::{Deserialize, Serialize};
use spindle_task::TopologyPath;

/// Where this process sits in the plant → workshop → processor topology.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct NodeIdentity {
    #[serde(default)]
    pub plant: Option<String>,
    #[serde(default)]
    pub workshop: Option<String>,
    #[serde(default)]
    pub processor: Option<String>,
    /// Optional site tag carried on minted identifiers' topology paths.
    #[serde(default)]
    pub site: Option<String>,
    /// Optional explicit instance id used as the job-card holder name
    /// (defaults to hostname at the call site).
    #[serde(default)]
    pub instance: Option<String>,
}

impl NodeIdentity {
    /// Resolve to a topology path when all three names are configured.
    pub fn topology_path(&self) -> Option<TopologyPath> {
        let mut path = TopologyPath::new(
            self.plant.clone()?,
            self.workshop.clone()?,
            self.processor.clone()?,
        );
        if let Some(site) = &self.site {
            path.tags.insert("site".to_string(), site.clone());
        }
        path.is_resolved().then_some(path)
    }
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct CoordinatorConfig {
    #[serde(default)]
    pub node: NodeIdentity,
}

/// Load configuration from a TOML file, then apply `SPINDLE_*` environment
/// overrides. The result is plain data handed to constructors; nothing here
/// installs global state.
pub fn load_config(path: &str) -> Result<CoordinatorConfig> {
    let content = std::fs::read_to_string(path)?;
    let mut cfg: CoordinatorConfig = toml::from_str(&content)?;
    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

fn apply_env_overrides(cfg: &mut CoordinatorConfig) {
    for (var, field) in [
        ("SPINDLE_PLANT", &mut cfg.node.plant),
        ("SPINDLE_WORKSHOP", &mut cfg.node.workshop),
        ("SPINDLE_PROCESSOR", &mut cfg.node.processor),
        ("SPINDLE_SITE", &mut cfg.node.site),
        ("SPINDLE_INSTANCE", &mut cfg.node.instance),
    ] {
        if let Ok(value) = std::env::var(var) {
            let value = value.trim().to_string();
            if !value.is_empty() {
                *field = Some(value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_node_identity() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[node]\nplant = \"P1\"\nworkshop = \"W1\"\nprocessor = \"U1\"\nsite = \"dc-east\""
        )
        .unwrap();
        let cfg = load_config(file.path().to_str().unwrap()).unwrap();
        let path = cfg.node.topology_path().expect("path resolves");
        assert_eq!(path.plant, "P1");
        assert_eq!(path.tags.get("site").map(String::as_str), Some("dc-east"));
    }

    #[test]
    fn incomplete_identity_does_not_resolve() {
        let identity = NodeIdentity {
            plant: Some("P1".into()),
            ..Default::default()
        };
        assert!(identity.topology_path().is_none());
    }
}
