//! Graph export
//!
//! The node/edge pair handed to rendering and JSON export collaborators.

use serde::{Deserialize, Serialize};

use crate::{Edge, EdgeSet, EntityGroup, EntityMap, Result, RkgError};

/// A graph node keyed by the entity string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    /// `None` for edge endpoints that belong to no visible group
    pub group: Option<EntityGroup>,
}

/// Nodes and edges ready for rendering or download
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphExport {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<Edge>,
}

impl GraphExport {
    /// Build the export from an entity map and an edge set.
    ///
    /// Nodes are unique by id. A value listed in several groups keeps the
    /// group visited last. Edge endpoints missing from every group are
    /// added as ungrouped nodes.
    pub fn build(entities: &EntityMap, edges: &EdgeSet) -> Self {
        let mut nodes: Vec<GraphNode> = Vec::new();

        for (group, values) in entities.iter() {
            for value in values {
                match nodes.iter_mut().find(|n| &n.id == value) {
                    Some(node) => node.group = Some(group),
                    None => nodes.push(GraphNode {
                        id: value.clone(),
                        group: Some(group),
                    }),
                }
            }
        }

        for edge in edges {
            for endpoint in [&edge.source, &edge.target] {
                if !nodes.iter().any(|n| &n.id == endpoint) {
                    nodes.push(GraphNode {
                        id: endpoint.clone(),
                        group: None,
                    });
                }
            }
        }

        Self {
            nodes,
            edges: edges.iter().cloned().collect(),
        }
    }

    /// Pretty-printed JSON document
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| RkgError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RelationType;

    #[test]
    fn test_build_nodes_and_edges() {
        let entities = EntityMap::new()
            .with_group(EntityGroup::People, vec!["Jane Doe".into()])
            .with_group(EntityGroup::Orgs, vec!["Acme Corp".into()]);
        let mut edges = EdgeSet::new();
        edges.insert(Edge::new("Jane Doe", RelationType::WorkedAt, "Acme Corp"));

        let graph = GraphExport::build(&entities, &edges);
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.edges.len(), 1);
        assert!(graph
            .nodes
            .iter()
            .any(|n| n.id == "Jane Doe" && n.group == Some(EntityGroup::People)));
    }

    #[test]
    fn test_later_group_overwrites_node_group() {
        let entities = EntityMap::new()
            .with_group(EntityGroup::Orgs, vec!["Atlas".into()])
            .with_group(EntityGroup::Projects, vec!["Atlas".into()]);
        let graph = GraphExport::build(&entities, &EdgeSet::new());
        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.nodes[0].group, Some(EntityGroup::Projects));
    }

    #[test]
    fn test_hidden_endpoint_becomes_ungrouped_node() {
        let entities = EntityMap::new().with_group(EntityGroup::People, vec!["Jane Doe".into()]);
        let mut edges = EdgeSet::new();
        edges.insert(Edge::new("Jane Doe", RelationType::BasedIn, "Berlin"));

        let graph = GraphExport::build(&entities, &edges);
        let berlin = graph.nodes.iter().find(|n| n.id == "Berlin").unwrap();
        assert_eq!(berlin.group, None);
    }

    #[test]
    fn test_json_shape() {
        let entities = EntityMap::new().with_group(EntityGroup::Skills, vec!["python".into()]);
        let json = GraphExport::build(&entities, &EdgeSet::new())
            .to_json_pretty()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["nodes"][0]["id"], "python");
        assert_eq!(value["nodes"][0]["group"], "SKILLS");
        assert_eq!(value["edges"], serde_json::json!([]));
    }
}
