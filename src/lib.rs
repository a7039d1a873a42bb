pub mod config;
pub mod error;
pub mod graph;
pub mod ingest;
pub mod search;

pub use config::Config;
pub use error::{AltgraphError, Result};
pub use graph::{build, discover_products, Graph, GraphBuilder, Node, NodeKey, Relation};
pub use ingest::{load_records, ProductRecord, RawRecord};
pub use search::{explain, find_alternatives, satisfies, score, Alternative, Finder, Outcome, Query};
