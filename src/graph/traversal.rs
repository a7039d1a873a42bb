//! BFS product discovery over the product graph.

use std::collections::{HashSet, VecDeque};

use crate::graph::{Graph, NodeKey};
use crate::{AltgraphError, Result};

/// Breadth-first discovery of every product reachable from `start`.
///
/// All edge types are walked alike. Category and tag nodes are passed through but
/// never returned, and `start` itself is excluded. Output follows discovery order,
/// which is fixed by the graph's edge-insertion order.
pub fn discover_products<'g>(graph: &'g Graph, start: &str) -> Result<Vec<&'g str>> {
    let start_key = NodeKey::product(start);
    let start_idx = graph
        .index_of(&start_key)
        .ok_or_else(|| AltgraphError::UnknownNode(start_key.to_string()))?;

    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    let mut result = Vec::new();

    queue.push_back(start_idx);
    visited.insert(start_idx);

    while let Some(idx) = queue.pop_front() {
        if idx != start_idx {
            if let Some(product) = graph.node_at(idx).as_product() {
                result.push(product.id.as_str());
            }
        }

        for &(neighbor, _) in graph.neighbor_indices(idx) {
            if visited.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }

    log::debug!("Discovered {} products from {}", result.len(), start);
    Ok(result)
}
