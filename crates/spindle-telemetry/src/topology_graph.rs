use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Level of a node within the processing topology.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    Plant,
    Workshop,
    Processor,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GraphNode {
    pub id: String,
    pub role: NodeRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default)]
    pub children: BTreeSet<String>,
}

impl GraphNode {
    pub fn new(id: impl Into<String>, role: NodeRole) -> Self {
        Self {
            id: id.into(),
            role,
            parent: None,
            children: BTreeSet::new(),
        }
    }
}

/// The topology graph reported to the observability layer. Every mutation
/// bumps `epoch`, so reporting code can compare graphs cheaply.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TopologyGraph {
    pub epoch: u64,
    pub nodes: BTreeMap<String, GraphNode>,
}

impl TopologyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert_node(&mut self, node: GraphNode) {
        self.nodes.insert(node.id.clone(), node);
        self.epoch = self.epoch.saturating_add(1);
    }

    /// Record a parent→child edge. Both sides are updated; missing nodes are
    /// left to a later `upsert_node`.
    pub fn link(&mut self, parent_id: &str, child_id: &str) {
        if let Some(parent) = self.nodes.get_mut(parent_id) {
            parent.children.insert(child_id.to_string());
        }
        if let Some(child) = self.nodes.get_mut(child_id) {
            child.parent = Some(parent_id.to_string());
        }
        self.epoch = self.epoch.saturating_add(1);
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Topology report payload for the pull interface.
    pub fn report(&self) -> serde_json::Value {
        serde_json::json!({
            "kind": spindle_topics::REPORT_KIND_TOPOLOGY,
            "epoch": self.epoch,
            "nodes": serde_json::to_value(&self.nodes).unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::SnapshotCell;

    #[test]
    fn mutations_bump_epoch() {
        let mut graph = TopologyGraph::new();
        graph.upsert_node(GraphNode::new("P1", NodeRole::Plant));
        graph.upsert_node(GraphNode::new("P1.W1", NodeRole::Workshop));
        graph.link("P1", "P1.W1");
        assert_eq!(graph.epoch, 3);
        assert_eq!(
            graph.node("P1.W1").and_then(|n| n.parent.as_deref()),
            Some("P1")
        );
        assert!(graph.node("P1").unwrap().children.contains("P1.W1"));
    }

    #[test]
    fn graph_flows_through_snapshot_cell() {
        let cell = SnapshotCell::new(TopologyGraph::new());

        let mut graph = cell.current();
        graph.upsert_node(GraphNode::new("P1", NodeRole::Plant));
        cell.set_current(graph);
        assert!(cell.is_stale());

        cell.mark_reported();
        assert!(!cell.is_stale());
        assert_eq!(cell.reported().len(), 1);
    }
}
