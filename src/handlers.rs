use log::{error, info};
use serde::Serialize;

#[cfg(feature = "lambda")]
use lambda_runtime::{Error as LambdaError, LambdaEvent};
#[cfg(feature = "lambda")]
use serde_json::Value;

use crate::ingest::{IngestConfig, IngestError, IngestReport, IngestStatus, NewsIngestor};

#[derive(Debug, Serialize)]
pub struct ErrorEntry {
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    pub detail: String,
}

/// What an invocation returns to its caller
#[derive(Debug, Serialize)]
pub struct InvocationResponse {
    pub success: bool,
    pub status: IngestStatus,
    pub symbols: usize,
    pub items_fetched: usize,
    pub items_filtered: usize,
    pub records_built: usize,
    pub batches_sent: usize,
    pub records_published: usize,
    pub records_rejected: usize,
    pub errors: Vec<ErrorEntry>,
}

impl From<&IngestReport> for InvocationResponse {
    fn from(report: &IngestReport) -> Self {
        Self {
            success: report.is_success(),
            status: report.status(),
            symbols: report.symbols,
            items_fetched: report.items_fetched,
            items_filtered: report.items_filtered,
            records_built: report.records_built,
            batches_sent: report.batches_sent,
            records_published: report.records_published,
            records_rejected: report.records_rejected,
            errors: report
                .errors
                .iter()
                .map(|e| ErrorEntry {
                    kind: e.kind(),
                    symbol: e.symbol().map(str::to_string),
                    detail: e.to_string(),
                })
                .collect(),
        }
    }
}

/// Read this invocation's configuration, run the pipeline, summarize
pub async fn handle_invocation(ingestor: &NewsIngestor) -> Result<InvocationResponse, IngestError> {
    handle_invocation_with(ingestor, |key| std::env::var(key).ok()).await
}

/// Same as `handle_invocation`, with settings taken from `lookup`
pub async fn handle_invocation_with<F>(
    ingestor: &NewsIngestor,
    lookup: F,
) -> Result<InvocationResponse, IngestError>
where
    F: Fn(&str) -> Option<String>,
{
    info!("🚀 Invocation started");

    let config = IngestConfig::from_lookup(lookup).inspect_err(|e| error!("❌ {e}"))?;
    let report = ingestor.run(&config).await;
    let response = InvocationResponse::from(&report);

    if response.success {
        info!(
            "✅ Invocation succeeded: {} records published",
            response.records_published
        );
    } else {
        error!(
            "❌ Invocation finished with status {:?} and {} errors",
            response.status,
            report.errors.len()
        );
        for e in &report.errors {
            error!("   {e}");
        }
    }

    Ok(response)
}

#[cfg(feature = "lambda")]
pub async fn lambda_handler(
    ingestor: &NewsIngestor,
    event: LambdaEvent<Value>,
) -> Result<Value, LambdaError> {
    info!("🔗 Lambda received event: {:?}", event.payload);

    let response = handle_invocation(ingestor).await?;

    Ok(serde_json::to_value(response)?)
}
