pub mod csv;
pub mod json;

use crate::error::{AltgraphError, Result};
use crate::ingest::RawRecord;

/// Column names every product source must provide.
pub const REQUIRED_FIELDS: [&str; 6] = ["id", "category", "brand", "price", "stock", "tags"];

/// Trait for product file parsers
pub trait Parser {
    /// Check if this parser can handle the given file extension
    fn can_parse(&self, extension: &str) -> bool;

    /// Parse file content into raw product rows
    fn parse(&self, content: &str, path: &str) -> Result<Vec<RawRecord>>;
}

/// Parser registry that selects appropriate parser by extension
pub struct ParserRegistry {
    parsers: Vec<Box<dyn Parser>>,
}

impl ParserRegistry {
    /// Create a new parser registry with all built-in parsers
    pub fn new() -> Self {
        let mut registry = Self {
            parsers: Vec::new(),
        };

        registry.register(Box::new(csv::CsvParser));
        registry.register(Box::new(json::JsonParser));

        registry
    }

    /// Register a parser
    pub fn register(&mut self, parser: Box<dyn Parser>) {
        self.parsers.push(parser);
    }

    /// Find a parser that can handle the given extension
    pub fn find_parser(&self, extension: &str) -> Option<&dyn Parser> {
        self.parsers
            .iter()
            .find(|p| p.can_parse(extension))
            .map(|p| p.as_ref())
    }

    /// Parse content using the appropriate parser for the extension
    pub fn parse(&self, content: &str, path: &str, extension: &str) -> Result<Vec<RawRecord>> {
        let parser = self.find_parser(extension).ok_or_else(|| {
            AltgraphError::Parse(format!("No parser found for extension: {}", extension))
        })?;

        let records = parser.parse(content, path)?;
        log::debug!("Parsed {} rows from {}", records.len(), path);
        Ok(records)
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}
