
use crate::record::KinesisRecord;

/// Destination stream, addressed by both name and ARN
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamTarget {
    pub name: String,
    pub arn: String,
}

/// A record the stream refused while the rest of its batch went through
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRecord {
    pub partition_key: String,
    pub error_code: String,
    pub error_message: String,
}

/// Per-record result of one publish call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishOutcome {
    pub accepted: usize,
    pub rejected: Vec<RejectedRecord>,
}

impl PublishOutcome {
    #[cfg(test)]
    pub fn all_accepted(count: usize) -> Self {
        Self {
            accepted: count,
            rejected: Vec::new(),
        }
    }
}

/// Stream publish error types
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Stream service error: {0}")]
    Service(String),
}

/// Batched writes to an append-only stream
#[async_trait::async_trait]
pub trait RecordPublisher: Send + Sync {
    /// Submit one batch as a single call
    async fn publish(
        &self,
        target: &StreamTarget,
        records: &[KinesisRecord],
    ) -> Result<PublishOutcome, PublishError>;
}
