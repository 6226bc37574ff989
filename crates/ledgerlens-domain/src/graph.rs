//! Graph model (nodes, relationships, per-chunk and merged graphs)

use std::collections::HashSet;

/// Node type used when a relationship endpoint has no extracted node metadata
pub const UNKNOWN_NODE_TYPE: &str = "Unknown";

/// A typed entity extracted from a filing.
///
/// Identity is the `id` alone (the entity name). Two nodes with the same id
/// and different types are the same node; which type survives is decided by
/// the merger, never by aliasing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Node {
    /// Entity name, e.g. "Acme Corp"
    pub id: String,

    /// Entity type, e.g. "Company"
    pub node_type: String,
}

impl Node {
    /// Create a new node
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
        }
    }

    /// Create a placeholder node of type [`UNKNOWN_NODE_TYPE`]
    pub fn unknown(id: impl Into<String>) -> Self {
        Self::new(id, UNKNOWN_NODE_TYPE)
    }
}

/// A directed, typed edge between two node ids.
///
/// Relationships are never deduplicated: the same (source, target, type)
/// triple extracted twice yields two relationships.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Relationship {
    /// Source node id
    pub source: String,

    /// Target node id
    pub target: String,

    /// Relationship label, e.g. "HAS_SEGMENT"
    pub rel_type: String,
}

impl Relationship {
    /// Create a new relationship
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        rel_type: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            rel_type: rel_type.into(),
        }
    }
}

/// Nodes and relationships extracted from a single chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphDocument {
    /// Nodes in extraction order
    pub nodes: Vec<Node>,

    /// Relationships in extraction order
    pub relationships: Vec<Relationship>,
}

impl GraphDocument {
    /// Create a graph document from its parts
    pub fn new(nodes: Vec<Node>, relationships: Vec<Relationship>) -> Self {
        Self {
            nodes,
            relationships,
        }
    }

    /// The empty contribution of a failed chunk
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when the chunk contributed nothing
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.relationships.is_empty()
    }
}

/// The final, bounded graph for one document.
///
/// Invariant: every relationship endpoint resolves to a node in `nodes`.
/// Construct it through [`KnowledgeGraph::new`], which enforces this by
/// adding [`UNKNOWN_NODE_TYPE`] placeholders for endpoints that lack a node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnowledgeGraph {
    nodes: Vec<Node>,
    relationships: Vec<Relationship>,
}

impl KnowledgeGraph {
    /// Build a graph from already-pruned nodes and relationships.
    ///
    /// Node order is preserved. Endpoints with no matching node get an
    /// `Unknown` placeholder, appended in order of first appearance.
    pub fn new(mut nodes: Vec<Node>, relationships: Vec<Relationship>) -> Self {
        let mut known: HashSet<String> = nodes.iter().map(|n| n.id.clone()).collect();

        for rel in &relationships {
            for endpoint in [&rel.source, &rel.target] {
                if known.insert(endpoint.clone()) {
                    nodes.push(Node::unknown(endpoint.clone()));
                }
            }
        }

        Self {
            nodes,
            relationships,
        }
    }

    /// Nodes in first-seen order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Relationships in chunk-then-extraction order
    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    /// Look up a node by id
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Type of a node, or [`UNKNOWN_NODE_TYPE`] when absent
    pub fn node_type(&self, id: &str) -> &str {
        self.node(id)
            .map(|n| n.node_type.as_str())
            .unwrap_or(UNKNOWN_NODE_TYPE)
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of relationships
    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }

    /// True when the graph has neither nodes nor relationships
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.relationships.is_empty()
    }

    /// Distinct node types, in first-seen order
    pub fn node_types(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.nodes
            .iter()
            .map(|n| n.node_type.as_str())
            .filter(|t| seen.insert(*t))
            .collect()
    }
}
