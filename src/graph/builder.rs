//! Graph construction from product records.

use crate::config::{IngestConfig, MalformedPolicy};
use crate::error::{AltgraphError, Result};
use crate::graph::{Graph, Node, Relation};
use crate::ingest::{ProductRecord, RawRecord};

/// Incremental builder. Consumed by [`GraphBuilder::finish`]; the resulting graph
/// has no mutating API.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: Graph,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a product with its `IS_A` edge and one `HAS_TAG` edge per tag.
    ///
    /// A repeated id overwrites the earlier attributes. Edges that still hold keep
    /// their position in every neighbor list; edges to the old category or dropped
    /// tags are removed; new ones are appended.
    pub fn add_product(&mut self, product: ProductRecord) -> &mut Self {
        let existed = self.graph.product(&product.id).is_some();
        let category = product.category.clone();
        let tags = product.tags.clone();
        let p = self.graph.upsert_product(product);

        if existed {
            let stale: Vec<usize> = self
                .graph
                .neighbor_indices(p)
                .iter()
                .filter(|&&(n, _)| match self.graph.node_at(n) {
                    Node::Category { name } => *name != category,
                    Node::Tag { name } => !tags.contains(name),
                    Node::Product(_) => true,
                })
                .map(|&(n, _)| n)
                .collect();
            for n in stale {
                self.graph.remove_edge(p, n);
            }
        }

        let c = self.graph.ensure_category(&category);
        self.graph.add_edge(p, c, Relation::IsA);

        for tag in &tags {
            let t = self.graph.ensure_tag(tag);
            self.graph.add_edge(p, t, Relation::HasTag);
        }

        self
    }

    pub fn finish(self) -> Graph {
        self.graph
    }
}

/// How [`build_with`] treats rows and tags.
#[derive(Debug, Clone, Copy)]
pub struct BuildOptions {
    pub on_malformed: MalformedPolicy,
    pub tag_delimiter: char,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            on_malformed: MalformedPolicy::Abort,
            tag_delimiter: ';',
        }
    }
}

impl From<&IngestConfig> for BuildOptions {
    fn from(config: &IngestConfig) -> Self {
        Self {
            on_malformed: config.on_malformed,
            tag_delimiter: config.tag_delimiter.chars().next().unwrap_or(';'),
        }
    }
}

/// A built graph plus the rows that were left out under [`MalformedPolicy::Skip`].
#[derive(Debug)]
pub struct BuildReport {
    pub graph: Graph,
    pub skipped: Vec<AltgraphError>,
}

/// Build a graph from raw rows, aborting on the first malformed row.
pub fn build(records: &[RawRecord]) -> Result<Graph> {
    build_with(records, &BuildOptions::default()).map(|report| report.graph)
}

/// Build a graph from raw rows in input order.
///
/// With [`MalformedPolicy::Abort`] the first bad row fails the whole build and no
/// graph is returned. With [`MalformedPolicy::Skip`] bad rows are logged, collected
/// into the report, and the remaining rows are still added.
pub fn build_with(records: &[RawRecord], options: &BuildOptions) -> Result<BuildReport> {
    let mut builder = GraphBuilder::new();
    let mut skipped = Vec::new();

    for raw in records {
        match raw.parse(options.tag_delimiter) {
            Ok(product) => {
                if builder.graph.product(&product.id).is_some() {
                    log::warn!(
                        "Product {} repeated at row {}; later row overrides",
                        product.id,
                        raw.row
                    );
                }
                builder.add_product(product);
            }
            Err(e) => match options.on_malformed {
                MalformedPolicy::Abort => return Err(e),
                MalformedPolicy::Skip => {
                    log::warn!("Skipping row: {}", e);
                    skipped.push(e);
                }
            },
        }
    }

    let graph = builder.finish();
    let stats = graph.stats();
    log::info!(
        "Built graph: {} products, {} categories, {} tags, {} edges ({} rows skipped)",
        stats.products,
        stats.categories,
        stats.tags,
        graph.edge_count(),
        skipped.len()
    );
    debug_assert_eq!(stats.is_a_edges, stats.products);

    Ok(BuildReport { graph, skipped })
}
