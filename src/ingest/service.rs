use chrono::{DateTime, Utc};
use futures::{StreamExt, stream};
use log::{error, info, warn};
use serde::Serialize;

use super::config::IngestConfig;
use super::error::IngestError;
use crate::news::{NewsProvider, NewsQuery, RawNewsItem, RecencyMode};
use crate::record::{self, KinesisRecord, MAX_BATCH_SIZE, NormalizedRecord, RecordSchema};
use crate::stream::RecordPublisher;

/// Overall outcome of one invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestStatus {
    Success,
    PartialFailure,
    Failure,
}

/// Counters and collected failures of one invocation
#[derive(Debug, Default)]
pub struct IngestReport {
    pub symbols: usize,
    pub symbols_succeeded: usize,
    pub items_fetched: usize,
    /// Items dropped by the local recency filter
    pub items_filtered: usize,
    pub records_built: usize,
    pub batches_sent: usize,
    pub records_published: usize,
    pub records_rejected: usize,
    pub errors: Vec<IngestError>,
}

impl IngestReport {
    /// Failure means nothing reached the stream and either every symbol
    /// failed or there were records that all went undelivered.
    pub fn status(&self) -> IngestStatus {
        if self.errors.is_empty() {
            IngestStatus::Success
        } else if self.records_published == 0
            && (self.symbols_succeeded == 0 || self.records_built > 0)
        {
            IngestStatus::Failure
        } else {
            IngestStatus::PartialFailure
        }
    }

    pub fn is_success(&self) -> bool {
        self.status() == IngestStatus::Success
    }
}

/// Records gathered for one symbol
struct SymbolNews {
    fetched: usize,
    filtered: usize,
    records: Vec<KinesisRecord>,
}

/// Keep items published at or after `cutoff`; undated items are dropped
pub fn filter_recent(items: Vec<RawNewsItem>, cutoff: DateTime<Utc>) -> Vec<RawNewsItem> {
    items
        .into_iter()
        .filter(|item| item.published_at.is_some_and(|published| published >= cutoff))
        .collect()
}

/// Fetch → filter → map → batch → publish
pub struct NewsIngestor {
    provider: Box<dyn NewsProvider>,
    publisher: Box<dyn RecordPublisher>,
}

impl NewsIngestor {
    pub fn new(provider: Box<dyn NewsProvider>, publisher: Box<dyn RecordPublisher>) -> Self {
        Self {
            provider,
            publisher,
        }
    }

    pub async fn run(&self, config: &IngestConfig) -> IngestReport {
        let schema = config
            .schema
            .unwrap_or_else(|| self.provider.native_schema());
        let query = NewsQuery {
            max_results: config.max_results,
            since: Utc::now()
                .checked_sub_signed(config.lookback)
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
        };

        info!(
            "📰 Ingesting news for {} symbols via {} (since {}, schema {:?})",
            config.symbols.len(),
            self.provider.name(),
            query.since,
            schema
        );

        let mut report = IngestReport {
            symbols: config.symbols.len(),
            ..Default::default()
        };

        let query = &query;
        let results: Vec<(&String, Result<SymbolNews, IngestError>)> =
            stream::iter(config.symbols.iter())
                .map(move |symbol| async move {
                    (symbol, self.collect_symbol(symbol, query, schema).await)
                })
                .buffered(config.fetch_concurrency.max(1))
                .collect()
                .await;

        let mut records = Vec::new();
        for (symbol, result) in results {
            match result {
                Ok(news) => {
                    info!(
                        "✅ {symbol}: {} fetched, {} filtered, {} records",
                        news.fetched,
                        news.filtered,
                        news.records.len()
                    );
                    report.symbols_succeeded += 1;
                    report.items_fetched += news.fetched;
                    report.items_filtered += news.filtered;
                    records.extend(news.records);
                }
                Err(e) => {
                    warn!("⚠️ Skipping {symbol}: {e}");
                    report.errors.push(e);
                }
            }
        }
        report.records_built = records.len();

        for (index, batch) in record::batches(&records, MAX_BATCH_SIZE).enumerate() {
            match self.publisher.publish(&config.stream, batch).await {
                Ok(outcome) => {
                    report.batches_sent += 1;
                    report.records_published += outcome.accepted;
                    report.records_rejected += outcome.rejected.len();
                    for rejected in outcome.rejected {
                        report.errors.push(IngestError::RecordRejected {
                            batch: index,
                            partition_key: rejected.partition_key,
                            code: rejected.error_code,
                            message: rejected.error_message,
                        });
                    }
                }
                Err(e) => {
                    error!("❌ Batch {index} ({} records) failed: {e}", batch.len());
                    report.errors.push(IngestError::Publish {
                        batch: index,
                        source: e,
                    });
                }
            }
        }

        info!(
            "📊 Published {}/{} records in {} batches, {} errors",
            report.records_published,
            report.records_built,
            report.batches_sent,
            report.errors.len()
        );

        report
    }

    async fn collect_symbol(
        &self,
        symbol: &str,
        query: &NewsQuery,
        schema: RecordSchema,
    ) -> Result<SymbolNews, IngestError> {
        let items = self
            .provider
            .lookup(symbol, query)
            .await
            .map_err(|source| IngestError::Lookup {
                symbol: symbol.to_string(),
                source,
            })?;

        let fetched = items.len();
        let items = match self.provider.recency_mode() {
            RecencyMode::Provider => items,
            RecencyMode::Local => filter_recent(items, query.since),
        };
        let filtered = fetched - items.len();

        let records = items
            .iter()
            .map(|item| {
                let normalized = NormalizedRecord::from_item(symbol, item, schema, Utc::now())
                    .map_err(|source| IngestError::Mapping {
                        symbol: symbol.to_string(),
                        source,
                    })?;
                KinesisRecord::from_normalized(&normalized).map_err(|source| {
                    IngestError::Serialization {
                        symbol: symbol.to_string(),
                        source,
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SymbolNews {
            fetched,
            filtered,
            records,
        })
    }
}
