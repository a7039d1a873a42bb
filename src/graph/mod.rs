//! Product knowledge graph: typed nodes, undirected typed edges, BFS discovery.
//!
//! Products link to exactly one category (`IS_A`) and to each of their tags
//! (`HAS_TAG`). Node keys are qualified by kind, so a tag and a product that share a
//! name are still distinct nodes. Neighbor lists keep edge-insertion order; BFS
//! discovery order (and therefore ranking tie-breaks) depends on it.

mod builder;
mod traversal;

pub use builder::{build, build_with, BuildOptions, BuildReport, GraphBuilder};
pub use traversal::discover_products;

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::ingest::ProductRecord;

/// Kind-qualified node identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "lowercase")]
pub enum NodeKey {
    Product(String),
    Category(String),
    Tag(String),
}

impl NodeKey {
    pub fn product(id: impl Into<String>) -> Self {
        NodeKey::Product(id.into())
    }

    pub fn category(name: impl Into<String>) -> Self {
        NodeKey::Category(name.into())
    }

    pub fn tag(name: impl Into<String>) -> Self {
        NodeKey::Tag(name.into())
    }

    /// The unqualified identifier (product id, category name or tag name).
    pub fn name(&self) -> &str {
        match self {
            NodeKey::Product(s) | NodeKey::Category(s) | NodeKey::Tag(s) => s,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            NodeKey::Product(_) => NodeKind::Product,
            NodeKey::Category(_) => NodeKind::Category,
            NodeKey::Tag(_) => NodeKind::Tag,
        }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Product,
    Category,
    Tag,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeKind::Product => "product",
            NodeKind::Category => "category",
            NodeKind::Tag => "tag",
        };
        f.write_str(s)
    }
}

/// Edge label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Relation {
    /// product ↔ category
    #[serde(rename = "IS_A")]
    IsA,
    /// product ↔ tag
    #[serde(rename = "HAS_TAG")]
    HasTag,
}

impl Relation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::IsA => "IS_A",
            Relation::HasTag => "HAS_TAG",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A graph vertex. Categories and tags carry nothing beyond their name.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Product(ProductRecord),
    Category { name: String },
    Tag { name: String },
}

impl Node {
    pub fn key(&self) -> NodeKey {
        match self {
            Node::Product(p) => NodeKey::Product(p.id.clone()),
            Node::Category { name } => NodeKey::Category(name.clone()),
            Node::Tag { name } => NodeKey::Tag(name.clone()),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Product(_) => NodeKind::Product,
            Node::Category { .. } => NodeKind::Category,
            Node::Tag { .. } => NodeKind::Tag,
        }
    }

    pub fn as_product(&self) -> Option<&ProductRecord> {
        match self {
            Node::Product(p) => Some(p),
            _ => None,
        }
    }
}

/// Node and edge counts by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub products: usize,
    pub categories: usize,
    pub tags: usize,
    pub is_a_edges: usize,
    pub has_tag_edges: usize,
}

/// Immutable product graph. Built once by [`GraphBuilder`], then shared by reference
/// with every query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    nodes: Vec<Node>,
    index: HashMap<NodeKey, usize>,
    /// Per-node neighbors in edge-insertion order.
    adjacency: Vec<Vec<(usize, Relation)>>,
}

impl Graph {
    pub fn contains(&self, key: &NodeKey) -> bool {
        self.index.contains_key(key)
    }

    pub fn node(&self, key: &NodeKey) -> Option<&Node> {
        self.index.get(key).map(|&i| &self.nodes[i])
    }

    pub fn product(&self, id: &str) -> Option<&ProductRecord> {
        self.node(&NodeKey::product(id)).and_then(Node::as_product)
    }

    /// All products in first-insertion order.
    pub fn products(&self) -> impl Iterator<Item = &ProductRecord> {
        self.nodes.iter().filter_map(Node::as_product)
    }

    /// Product ids sorted ascending.
    pub fn product_ids_sorted(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.products().map(|p| p.id.as_str()).collect();
        ids.sort_unstable();
        ids
    }

    /// Neighbors of `key` in edge-insertion order. Empty for unknown keys.
    pub fn neighbors<'g>(&'g self, key: &NodeKey) -> impl Iterator<Item = (&'g Node, Relation)> + 'g {
        self.index
            .get(key)
            .into_iter()
            .flat_map(move |&i| self.adjacency[i].iter())
            .map(move |&(j, relation)| (&self.nodes[j], relation))
    }

    /// True when an edge joins `a` and `b` directly.
    pub fn are_adjacent(&self, a: &NodeKey, b: &NodeKey) -> bool {
        match (self.index.get(a), self.index.get(b)) {
            (Some(&i), Some(&j)) => self.adjacency[i].iter().any(|&(n, _)| n == j),
            _ => false,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }

    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats::default();
        for node in &self.nodes {
            match node.kind() {
                NodeKind::Product => stats.products += 1,
                NodeKind::Category => stats.categories += 1,
                NodeKind::Tag => stats.tags += 1,
            }
        }
        // Every edge has a product endpoint; count from that side only.
        for (i, neighbors) in self.adjacency.iter().enumerate() {
            if self.nodes[i].kind() != NodeKind::Product {
                continue;
            }
            for &(_, relation) in neighbors {
                match relation {
                    Relation::IsA => stats.is_a_edges += 1,
                    Relation::HasTag => stats.has_tag_edges += 1,
                }
            }
        }
        stats
    }

    pub(crate) fn index_of(&self, key: &NodeKey) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub(crate) fn node_at(&self, idx: usize) -> &Node {
        &self.nodes[idx]
    }

    pub(crate) fn neighbor_indices(&self, idx: usize) -> &[(usize, Relation)] {
        &self.adjacency[idx]
    }

    /// Insert a product node, or replace the attributes of an existing one in place.
    pub(crate) fn upsert_product(&mut self, product: ProductRecord) -> usize {
        let key = NodeKey::Product(product.id.clone());
        match self.index.get(&key) {
            Some(&idx) => {
                self.nodes[idx] = Node::Product(product);
                idx
            }
            None => self.push_node(key, Node::Product(product)),
        }
    }

    /// Return the index of a category node, creating it on first use.
    pub(crate) fn ensure_category(&mut self, name: &str) -> usize {
        self.ensure(NodeKey::category(name), || Node::Category {
            name: name.to_string(),
        })
    }

    /// Return the index of a tag node, creating it on first use.
    pub(crate) fn ensure_tag(&mut self, name: &str) -> usize {
        self.ensure(NodeKey::tag(name), || Node::Tag {
            name: name.to_string(),
        })
    }

    fn ensure(&mut self, key: NodeKey, make: impl FnOnce() -> Node) -> usize {
        match self.index.get(&key) {
            Some(&idx) => idx,
            None => self.push_node(key, make()),
        }
    }

    fn push_node(&mut self, key: NodeKey, node: Node) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(node);
        self.adjacency.push(Vec::new());
        self.index.insert(key, idx);
        idx
    }

    /// Add an undirected edge unless `a` and `b` are already joined.
    pub(crate) fn add_edge(&mut self, a: usize, b: usize, relation: Relation) {
        if self.adjacency[a].iter().any(|&(n, _)| n == b) {
            return;
        }
        self.adjacency[a].push((b, relation));
        self.adjacency[b].push((a, relation));
    }

    pub(crate) fn remove_edge(&mut self, a: usize, b: usize) {
        self.adjacency[a].retain(|&(n, _)| n != b);
        self.adjacency[b].retain(|&(n, _)| n != a);
    }
}
