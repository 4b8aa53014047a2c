//! Error types for clinmatch.

use thiserror::Error;

/// Main error type for clinmatch operations.
#[derive(Error, Debug)]
pub enum ClinMatchError {
    /// A VCF line could not be parsed into the expected column set.
    #[error("parse error at line {line}: {msg}")]
    Parse { line: u64, msg: String },

    /// A chromosome name has no code in the configured chromosome map.
    #[error("unknown chromosome: {name}")]
    UnknownChromosome { name: String },

    /// A non-null variant identifier was inserted twice during index build.
    ///
    /// The index retains every record inserted before the offending one;
    /// there is no rollback. A partially built index must be discarded and
    /// rebuilt from scratch.
    #[error("duplicate variant identifier: {id}")]
    DuplicateIdentifier { id: String },

    /// A coordinate+allele combination has no genomic HGVS rendering.
    #[error("cannot derive nomenclature key: {msg}")]
    KeyDerivation { msg: String },

    /// An external annotation lookup failed (network, service error,
    /// malformed reply). Non-fatal at the matcher layer.
    #[error("annotation lookup failed: {msg}")]
    Annotation { msg: String },

    /// A retrieval request to the genotype data-sharing platform failed.
    #[error("retrieval failed: {msg}")]
    Retrieval { msg: String },

    /// Configuration file error.
    #[error("configuration error: {msg}")]
    Config { msg: String },

    /// Underlying SQLite error from the reference index or cache.
    #[error("index error: {0}")]
    Index(#[from] rusqlite::Error),

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ClinMatchError {
    /// Create a parse error for a given input line number.
    pub fn parse(line: u64, msg: impl Into<String>) -> Self {
        ClinMatchError::Parse {
            line,
            msg: msg.into(),
        }
    }

    /// True if this error is non-fatal at the enrichment layer.
    ///
    /// Lookup and key-derivation failures leave an enrichment slot null and
    /// processing continues; everything else propagates.
    pub fn is_enrichment_error(&self) -> bool {
        matches!(
            self,
            ClinMatchError::Annotation { .. }
                | ClinMatchError::KeyDerivation { .. }
                | ClinMatchError::Http(_)
        )
    }
}
