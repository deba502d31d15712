/// Stream publishing
pub mod kinesis;
pub mod publisher;

pub use kinesis::KinesisPublisher;
pub use publisher::{PublishError, PublishOutcome, RecordPublisher, RejectedRecord, StreamTarget};
