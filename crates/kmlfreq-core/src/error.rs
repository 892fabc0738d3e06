//! Error types for KML frequency aggregation

use std::io;
use thiserror::Error;

/// Errors that can occur while transforming a KML document
#[derive(Debug, Error)]
pub enum KmlFreqError {
    /// I/O error (file not found, permission denied, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// XML parsing or writing error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Exclusion table could not be read
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Invalid document structure (missing required elements)
    #[error("Invalid KML structure: {0}")]
    InvalidStructure(String),
}

/// Result type for KML frequency operations
pub type Result<T> = std::result::Result<T, KmlFreqError>;
