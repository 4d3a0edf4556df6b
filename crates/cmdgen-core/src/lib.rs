//! Core domain types shared across the entire cmdgen workspace.

use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

// =============================================================================
// Board Model Types
// =============================================================================

/// Identifier for nodes on a modeling board.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    /// Create a node id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Enumerates the kinds of elements that can populate a modeling board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    /// An intention to change state, handled by an aggregate.
    Command,
    /// A consistency boundary that handles commands and records events.
    Aggregate,
    /// A fact recorded by an aggregate.
    Event,
    /// A read model or information document.
    Document,
    /// A reaction to events.
    Policy,
    /// A grouping frame around related elements.
    Feature,
    /// Any other kind that does not fit the curated list.
    #[default]
    #[serde(other)]
    Other,
}

impl NodeKind {
    /// Get a display label for the node kind.
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Command => "command",
            NodeKind::Aggregate => "aggregate",
            NodeKind::Event => "event",
            NodeKind::Document => "document",
            NodeKind::Policy => "policy",
            NodeKind::Feature => "feature",
            NodeKind::Other => "other",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single element on the modeling board.
///
/// The node that triggers a generation run is a `ModelNode` of kind
/// [`NodeKind::Command`]; its neighbours are plain `ModelNode`s as well.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelNode {
    /// Unique identifier for this node.
    pub id: NodeId,
    /// Human readable name, e.g. `PlaceOrder`.
    pub name: String,
    /// Category associated with the node.
    #[serde(default)]
    pub kind: NodeKind,
    /// Free-form metadata attached on the board (schema, flags, ...).
    #[serde(default)]
    pub metadata: Value,
}

impl ModelNode {
    /// Create a node without metadata.
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: NodeId::new(id),
            name: name.into(),
            kind,
            metadata: Value::Null,
        }
    }

    /// Attach metadata to the node.
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// Check the node kind.
    pub fn is(&self, kind: NodeKind) -> bool {
        self.kind == kind
    }

    /// Look up a metadata entry, if the metadata is an object.
    pub fn meta(&self, key: &str) -> Option<&Value> {
        self.metadata.as_object().and_then(|m| m.get(key))
    }
}

/// Directed relationship between two board elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardEdge {
    /// Originating node identifier.
    pub from: NodeId,
    /// Destination node identifier.
    pub to: NodeId,
}

impl BoardEdge {
    /// Create an edge between two node ids.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: NodeId::new(from),
            to: NodeId::new(to),
        }
    }
}

/// Snapshot of a modeling board: elements plus the arrows between them.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct BoardGraph {
    /// All elements on the board, in board order.
    pub nodes: Vec<ModelNode>,
    /// All arrows connecting elements.
    #[serde(default)]
    pub edges: Vec<BoardEdge>,
    /// Arbitrary metadata about the board.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl BoardGraph {
    /// Creates an empty board.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the number of elements.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of arrows.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Get a node by id.
    pub fn node(&self, id: &NodeId) -> Option<&ModelNode> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    /// Find a node by id, falling back to an exact name match.
    pub fn find(&self, id_or_name: &str) -> Option<&ModelNode> {
        self.nodes
            .iter()
            .find(|n| n.id.as_str() == id_or_name)
            .or_else(|| self.nodes.iter().find(|n| n.name == id_or_name))
    }

    /// Elements an arrow leads to from `id`, in board order.
    pub fn successors(&self, id: &NodeId) -> Vec<&ModelNode> {
        self.nodes
            .iter()
            .filter(|n| self.edges.iter().any(|e| &e.from == id && e.to == n.id))
            .collect()
    }

    /// Elements with an arrow leading to `id`, in board order.
    pub fn predecessors(&self, id: &NodeId) -> Vec<&ModelNode> {
        self.nodes
            .iter()
            .filter(|n| self.edges.iter().any(|e| &e.to == id && e.from == n.id))
            .collect()
    }

    /// Convert to petgraph StableDiGraph for analysis.
    ///
    /// Nodes are inserted in board order, so `NodeIndex::index()` equals the
    /// node's position in [`BoardGraph::nodes`]. Arrows pointing at unknown
    /// ids are dropped.
    pub fn to_petgraph(&self) -> (StableDiGraph<ModelNode, ()>, HashMap<NodeId, NodeIndex>) {
        let mut graph = StableDiGraph::new();
        let mut id_to_index = HashMap::new();

        for node in &self.nodes {
            let idx = graph.add_node(node.clone());
            id_to_index.entry(node.id.clone()).or_insert(idx);
        }

        for edge in &self.edges {
            if let (Some(&from_idx), Some(&to_idx)) =
                (id_to_index.get(&edge.from), id_to_index.get(&edge.to))
            {
                graph.add_edge(from_idx, to_idx, ());
            }
        }

        (graph, id_to_index)
    }
}

// =============================================================================
// Analysis Types
// =============================================================================

/// Relationships of a triggering node, as resolved from the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    /// The node the run was triggered for.
    pub node: ModelNode,
    /// Nodes with an arrow pointing at `node`.
    pub from: Vec<ModelNode>,
    /// Nodes `node` points at.
    pub to: Vec<ModelNode>,
}

impl Connection {
    /// Create a connection without neighbours.
    pub fn new(node: ModelNode) -> Self {
        Self {
            node,
            from: Vec::new(),
            to: Vec::new(),
        }
    }

    /// Outgoing neighbours of the given kind.
    pub fn targets_of(&self, kind: NodeKind) -> impl Iterator<Item = &ModelNode> {
        self.to.iter().filter(move |n| n.is(kind))
    }
}

/// Derived state generators need besides the connection.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSnapshot {
    /// Aggregate handling the command, if any.
    pub aggregate: Option<ModelNode>,
    /// Events recorded by that aggregate, in board order.
    pub events: Vec<ModelNode>,
    /// Payload schema attached to the command (full or shorthand JSON Schema).
    pub schema: Option<Value>,
}

// =============================================================================
// Artifact Types
// =============================================================================

/// The artifact family members a command run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// JSON Schema of the command payload. Possibly hand-edited.
    Schema,
    /// API description fragment registering the command.
    ApiDescription,
    /// Command definition file.
    CommandFile,
}

impl ArtifactKind {
    /// Get a display label for the artifact kind.
    pub fn label(&self) -> &'static str {
        match self {
            ArtifactKind::Schema => "command schema",
            ArtifactKind::ApiDescription => "API description",
            ArtifactKind::CommandFile => "command file",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Generated content addressed to a target path, not yet on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactDescriptor {
    /// What this artifact is.
    pub kind: ArtifactKind,
    /// Absolute path the content is written to.
    pub target_path: PathBuf,
    /// Generated file content.
    pub content: String,
}

impl ArtifactDescriptor {
    /// Create a descriptor.
    pub fn new(kind: ArtifactKind, target_path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            kind,
            target_path: target_path.into(),
            content: content.into(),
        }
    }

    /// Target path as a borrowed path.
    pub fn path(&self) -> &Path {
        &self.target_path
    }
}

// =============================================================================
// Run Report
// =============================================================================

/// First line(s) of every report.
pub const REPORT_HEADER: &str = "Checklist\n\n";

/// Line recorded when the user declines to overwrite the schema file.
pub const SKIPPED_SCHEMA_LINE: &str = "⬤ Skipped: Command schema file written\n";

/// Ordered, append-only log of what a single run did.
///
/// The elapsed-time summary is kept apart from the status lines so it always
/// renders last, no matter when it was recorded.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    lines: Vec<String>,
    summary: Option<String>,
}

impl RunReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful write.
    pub fn record_written(&mut self, path: &Path) {
        self.lines
            .push(format!("✔️ File {} updated\n", path.display()));
    }

    /// Record that the schema file was left untouched.
    pub fn record_skipped(&mut self) {
        self.lines.push(SKIPPED_SCHEMA_LINE.to_string());
    }

    /// Record the elapsed-time summary. Recording again replaces it.
    pub fn finish(&mut self, elapsed: Duration) {
        self.summary = Some(format!(
            "Time elapsed: {:.3}s\n",
            elapsed.as_secs_f64()
        ));
    }

    /// Status lines in the order they were recorded.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The elapsed-time summary, once recorded.
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Whether the summary has been recorded.
    pub fn is_finished(&self) -> bool {
        self.summary.is_some()
    }

    /// Render header, status lines and summary.
    pub fn render(&self) -> String {
        let mut out = String::from(REPORT_HEADER);
        for line in &self.lines {
            out.push_str(line);
        }
        if let Some(summary) = &self.summary {
            out.push_str(summary);
        }
        out
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

// =============================================================================
// Naming Helpers
// =============================================================================

/// Convert a board name to `snake_case` (`PlaceOrder` → `place_order`).
pub fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            continue;
        }

        if c.is_uppercase() && i > 0 && !out.is_empty() && !out.ends_with('_') {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).map(|n| n.is_lowercase()).unwrap_or(false);
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower)
            {
                out.push('_');
            }
        }

        out.extend(c.to_lowercase());
    }

    out.trim_end_matches('_').to_string()
}

/// Convert a board name to `CONSTANT_CASE` (`PlaceOrder` → `PLACE_ORDER`).
pub fn constant_case(name: &str) -> String {
    snake_case(name).to_uppercase()
}

/// Convert a board name to a class name (`place order` → `PlaceOrder`).
pub fn class_name(name: &str) -> String {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}
