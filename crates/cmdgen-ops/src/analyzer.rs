//! Connection resolution: from a board node to the relationships generators need.

use std::collections::HashMap;

use cmdgen_core::{
    AnalysisSnapshot, BoardGraph, Connection, ModelNode, NodeId, NodeKind,
};
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::Direction;
use serde_json::Value;
use tracing::debug;

use crate::error::{OpsError, OpsResult};

/// Turns a model node into a connection plus analysis snapshot.
///
/// Implementations must not touch the filesystem.
pub trait ConnectionResolver: Send + Sync {
    /// Resolve the relationships of `node`.
    fn resolve(&self, node: &ModelNode) -> OpsResult<(Connection, AnalysisSnapshot)>;
}

/// Resolver backed by a board snapshot.
#[derive(Debug, Clone)]
pub struct BoardAnalyzer {
    graph: StableDiGraph<ModelNode, ()>,
    index: HashMap<NodeId, NodeIndex>,
}

impl BoardAnalyzer {
    /// Index a board for analysis.
    pub fn new(board: &BoardGraph) -> Self {
        let (graph, index) = board.to_petgraph();
        Self { graph, index }
    }

    fn neighbours(&self, idx: NodeIndex, direction: Direction) -> Vec<ModelNode> {
        let mut found: Vec<NodeIndex> = self.graph.neighbors_directed(idx, direction).collect();
        // petgraph yields neighbours newest-first; keep board order instead
        found.sort_by_key(|i| i.index());
        found.dedup();
        found
            .into_iter()
            .filter_map(|i| self.graph.node_weight(i).cloned())
            .collect()
    }
}

impl ConnectionResolver for BoardAnalyzer {
    fn resolve(&self, node: &ModelNode) -> OpsResult<(Connection, AnalysisSnapshot)> {
        let idx = *self
            .index
            .get(&node.id)
            .ok_or_else(|| OpsError::resolution(&node.name, "node is not on the board"))?;

        let board_node = &self.graph[idx];
        if !board_node.is(NodeKind::Command) {
            return Err(OpsError::resolution(
                &node.name,
                format!("expected a command, found {}", board_node.kind),
            ));
        }

        let connection = Connection {
            node: board_node.clone(),
            from: self.neighbours(idx, Direction::Incoming),
            to: self.neighbours(idx, Direction::Outgoing),
        };

        let aggregates: Vec<&ModelNode> = connection.targets_of(NodeKind::Aggregate).collect();
        if aggregates.len() > 1 {
            let names: Vec<&str> = aggregates.iter().map(|a| a.name.as_str()).collect();
            return Err(OpsError::resolution(
                &node.name,
                format!(
                    "a command is handled by at most one aggregate, found {}",
                    names.join(", ")
                ),
            ));
        }
        let aggregate = aggregates.first().map(|a| (*a).clone());

        let events = match &aggregate {
            Some(agg) => match self.index.get(&agg.id) {
                Some(&agg_idx) => self
                    .neighbours(agg_idx, Direction::Outgoing)
                    .into_iter()
                    .filter(|n| n.is(NodeKind::Event))
                    .collect(),
                None => Vec::new(),
            },
            None => Vec::new(),
        };

        let schema = match board_node.meta("schema") {
            None | Some(Value::Null) => None,
            Some(Value::Object(map)) => Some(Value::Object(map.clone())),
            Some(other) => {
                return Err(OpsError::resolution(
                    &node.name,
                    format!("schema metadata must be a JSON object, got {}", other),
                ));
            }
        };

        debug!(
            node = %connection.node.name,
            incoming = connection.from.len(),
            outgoing = connection.to.len(),
            aggregate = aggregate.as_ref().map(|a| a.name.as_str()).unwrap_or("-"),
            events = events.len(),
            "Resolved connection"
        );

        let snapshot = AnalysisSnapshot {
            aggregate,
            events,
            schema,
        };

        Ok((connection, snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdgen_core::BoardEdge;
    use serde_json::json;

    fn board() -> BoardGraph {
        BoardGraph {
            nodes: vec![
                ModelNode::new("c1", "PlaceOrder", NodeKind::Command)
                    .with_metadata(json!({"schema": {"orderId": "string|format:uuid"}})),
                ModelNode::new("a1", "Order", NodeKind::Aggregate),
                ModelNode::new("e1", "OrderPlaced", NodeKind::Event),
                ModelNode::new("e2", "OrderRejected", NodeKind::Event),
                ModelNode::new("d1", "OrderList", NodeKind::Document),
                ModelNode::new("p1", "Checkout", NodeKind::Policy),
            ],
            edges: vec![
                BoardEdge::new("p1", "c1"),
                BoardEdge::new("c1", "a1"),
                BoardEdge::new("a1", "e2"),
                BoardEdge::new("a1", "e1"),
                BoardEdge::new("a1", "d1"),
            ],
            metadata: Default::default(),
        }
    }

    #[test]
    fn test_resolves_aggregate_events_and_schema() {
        let board = board();
        let analyzer = BoardAnalyzer::new(&board);
        let node = board.find("PlaceOrder").unwrap();

        let (connection, snapshot) = analyzer.resolve(node).unwrap();

        assert_eq!(connection.from.len(), 1);
        assert_eq!(connection.from[0].name, "Checkout");
        assert_eq!(snapshot.aggregate.unwrap().name, "Order");
        let events: Vec<&str> = snapshot.events.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(events, vec!["OrderPlaced", "OrderRejected"]);
        assert_eq!(snapshot.schema, Some(json!({"orderId": "string|format:uuid"})));
    }

    #[test]
    fn test_rejects_non_command() {
        let board = board();
        let analyzer = BoardAnalyzer::new(&board);
        let err = analyzer.resolve(board.find("Order").unwrap()).unwrap_err();
        assert!(matches!(err, OpsError::Resolution { .. }));
    }

    #[test]
    fn test_rejects_unknown_node() {
        let analyzer = BoardAnalyzer::new(&board());
        let stranger = ModelNode::new("zz", "Ghost", NodeKind::Command);
        assert!(matches!(
            analyzer.resolve(&stranger),
            Err(OpsError::Resolution { .. })
        ));
    }

    #[test]
    fn test_rejects_two_aggregates() {
        let mut board = board();
        board
            .nodes
            .push(ModelNode::new("a2", "Cart", NodeKind::Aggregate));
        board.edges.push(BoardEdge::new("c1", "a2"));

        let analyzer = BoardAnalyzer::new(&board);
        let err = analyzer.resolve(board.find("c1").unwrap()).unwrap_err();
        assert!(err.to_string().contains("Order, Cart"));
    }

    #[test]
    fn test_rejects_non_object_schema() {
        let mut board = board();
        board.nodes[0].metadata = json!({"schema": "orderId"});
        let analyzer = BoardAnalyzer::new(&board);
        assert!(analyzer.resolve(&board.nodes[0]).is_err());
    }

    #[test]
    fn test_command_without_aggregate_resolves() {
        let board = BoardGraph {
            nodes: vec![ModelNode::new("c1", "Ping", NodeKind::Command)],
            edges: vec![],
            metadata: Default::default(),
        };
        let (connection, snapshot) = BoardAnalyzer::new(&board)
            .resolve(&board.nodes[0])
            .unwrap();
        assert!(connection.to.is_empty());
        assert!(snapshot.aggregate.is_none());
        assert!(snapshot.schema.is_none());
    }
}
