use super::publisher::{PublishError, PublishOutcome, RecordPublisher, RejectedRecord, StreamTarget};
use crate::record::KinesisRecord;
use aws_config::BehaviorVersion;
use aws_sdk_kinesis::{
    error::DisplayErrorContext,
    primitives::Blob,
    types::{PutRecordsRequestEntry, PutRecordsResultEntry},
    Client as KinesisClient,
};

/// Kinesis implementation of RecordPublisher
pub struct KinesisPublisher {
    client: KinesisClient,
}

impl KinesisPublisher {
    pub fn new(client: KinesisClient) -> Self {
        Self { client }
    }

    /// Build a client from the default AWS credential and region chain
    pub async fn from_env() -> Self {
        let config = aws_config::defaults(BehaviorVersion::v2025_01_17())
            .load()
            .await;

        let client = KinesisClient::new(&config);

        log::info!("🌊 Kinesis client initialized");

        Self::new(client)
    }

    fn to_entry(record: &KinesisRecord) -> Result<PutRecordsRequestEntry, PublishError> {
        PutRecordsRequestEntry::builder()
            .data(Blob::new(record.data.clone().into_bytes()))
            .partition_key(record.partition_key.clone())
            .build()
            .map_err(|e| PublishError::InvalidRecord(e.to_string()))
    }
}

/// Error code recorded for a submitted record that has no result entry
pub(crate) const MISSING_RESULT_CODE: &str = "MissingResult";

/// Pair each submitted record with its result entry. Kinesis answers in
/// request order; an entry with an error code was not written, and a record
/// past the end of the results is treated as not written.
pub(crate) fn outcome_from_results(
    records: &[KinesisRecord],
    results: &[PutRecordsResultEntry],
) -> PublishOutcome {
    let mut outcome = PublishOutcome::default();

    for (record, result) in records.iter().zip(results) {
        match result.error_code() {
            Some(code) => outcome.rejected.push(RejectedRecord {
                partition_key: record.partition_key.clone(),
                error_code: code.to_string(),
                error_message: result.error_message().unwrap_or_default().to_string(),
            }),
            None => outcome.accepted += 1,
        }
    }

    if records.len() > results.len() {
        log::warn!(
            "Kinesis returned {} results for {} records",
            results.len(),
            records.len()
        );
        outcome
            .rejected
            .extend(records[results.len()..].iter().map(|record| RejectedRecord {
                partition_key: record.partition_key.clone(),
                error_code: MISSING_RESULT_CODE.to_string(),
                error_message: "no result entry returned".to_string(),
            }));
    }

    outcome
}

#[async_trait::async_trait]
impl RecordPublisher for KinesisPublisher {
    async fn publish(
        &self,
        target: &StreamTarget,
        records: &[KinesisRecord],
    ) -> Result<PublishOutcome, PublishError> {
        let entries = records
            .iter()
            .map(Self::to_entry)
            .collect::<Result<Vec<_>, _>>()?;

        let result = self
            .client
            .put_records()
            .stream_name(&target.name)
            .stream_arn(&target.arn)
            .set_records(Some(entries))
            .send()
            .await;

        match result {
            Ok(output) => {
                let outcome = outcome_from_results(records, output.records());
                if let Some(failed) = output.failed_record_count().filter(|n| *n > 0) {
                    log::warn!(
                        "Kinesis rejected {} of {} records on {}",
                        failed,
                        records.len(),
                        target.name
                    );
                }
                Ok(outcome)
            }
            Err(e) => {
                log::error!("Failed to put records: {:?}", e);
                Err(PublishError::Service(DisplayErrorContext(&e).to_string()))
            }
        }
    }
}
