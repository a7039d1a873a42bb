//! Product file ingestion: read a `.csv` or `.json` file into raw rows, then
//! validate rows into [`ProductRecord`]s.

pub mod parsers;
pub mod record;

pub use parsers::{Parser, ParserRegistry};
pub use record::{parse_tag_list, ProductRecord, RawRecord, RawTags};

use std::path::Path;

use crate::error::{AltgraphError, Result};

/// Read a product file and split it into raw rows.
///
/// The parser is picked by file extension (case-insensitive). Row values are not
/// validated here; the graph builder does that under its malformed-row policy.
pub fn load_records(path: &Path) -> Result<Vec<RawRecord>> {
    let content = std::fs::read_to_string(path).map_err(AltgraphError::Io)?;

    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase();

    let registry = ParserRegistry::new();
    let records = registry.parse(&content, &path.to_string_lossy(), &extension)?;

    log::info!("Loaded {} product rows from {}", records.len(), path.display());
    Ok(records)
}
