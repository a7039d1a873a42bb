use thiserror::Error;

/// Main error type for altgraph
#[derive(Error, Debug)]
pub enum AltgraphError {
    /// A source row could not be turned into a product record
    #[error("Malformed record at row {row}: {reason}")]
    MalformedRecord { row: usize, reason: String },

    /// Node not present in the graph
    #[error("Unknown node: {0}")]
    UnknownNode(String),

    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Parse errors (file structure, not individual field values)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl AltgraphError {
    pub(crate) fn malformed(row: usize, reason: impl Into<String>) -> Self {
        AltgraphError::MalformedRecord {
            row,
            reason: reason.into(),
        }
    }
}

/// Convenient Result type using AltgraphError
pub type Result<T> = std::result::Result<T, AltgraphError>;
