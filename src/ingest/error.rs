use crate::news::NewsProviderError;
use crate::record::MissingField;
use crate::stream::PublishError;

/// Ingestion error types
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Lookup failed for {symbol}: {source}")]
    Lookup {
        symbol: String,
        source: NewsProviderError,
    },

    #[error("Mapping failed for {symbol}: {source}")]
    Mapping { symbol: String, source: MissingField },

    #[error("Serialization failed for {symbol}: {source}")]
    Serialization {
        symbol: String,
        source: serde_json::Error,
    },

    #[error("Publish failed for batch {batch}: {source}")]
    Publish { batch: usize, source: PublishError },

    #[error("Record {partition_key} in batch {batch} rejected ({code}): {message}")]
    RecordRejected {
        batch: usize,
        partition_key: String,
        code: String,
        message: String,
    },
}

impl IngestError {
    /// Stable tag for reporting
    pub fn kind(&self) -> &'static str {
        match self {
            IngestError::Configuration(_) => "configuration",
            IngestError::Lookup { .. } => "lookup",
            IngestError::Mapping { .. } => "mapping",
            IngestError::Serialization { .. } => "serialization",
            IngestError::Publish { .. } => "publish",
            IngestError::RecordRejected { .. } => "record_rejected",
        }
    }

    /// Symbol the failure belongs to, for per-symbol errors
    pub fn symbol(&self) -> Option<&str> {
        match self {
            IngestError::Lookup { symbol, .. }
            | IngestError::Mapping { symbol, .. }
            | IngestError::Serialization { symbol, .. } => Some(symbol),
            _ => None,
        }
    }
}
