use chrono::Duration;

use super::error::IngestError;
use crate::record::RecordSchema;
use crate::stream::StreamTarget;

pub const DEFAULT_LOOKBACK_MINUTES: u32 = 20;
pub const DEFAULT_MAX_RESULTS: u32 = 10;
pub const DEFAULT_FETCH_CONCURRENCY: usize = 1;
/// Longest accepted recency window, one week
pub const MAX_LOOKBACK_MINUTES: u32 = 7 * 24 * 60;

/// Per-invocation settings, re-read from the environment every time
#[derive(Debug, Clone, PartialEq)]
pub struct IngestConfig {
    /// Tickers in iteration order
    pub symbols: Vec<String>,
    pub stream: StreamTarget,
    /// Items published before `now - lookback` are dropped
    pub lookback: Duration,
    pub max_results: u32,
    /// Symbol lookups in flight at once
    pub fetch_concurrency: usize,
    /// Overrides the provider's native schema
    pub schema: Option<RecordSchema>,
}

impl IngestConfig {
    pub fn from_env() -> Result<Self, IngestError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, IngestError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            get(key).ok_or_else(|| {
                IngestError::Configuration(format!("{key} environment variable not set"))
            })
        };

        let symbols = parse_symbols(&required("STOCK_SYMBOLS")?);
        if symbols.is_empty() {
            return Err(IngestError::Configuration(
                "STOCK_SYMBOLS contains no symbols".to_string(),
            ));
        }

        let stream = StreamTarget {
            name: required("KINESIS_STREAM_NAME")?.trim().to_string(),
            arn: required("KINESIS_STREAM_ARN")?.trim().to_string(),
        };

        let lookback_minutes = match (get("NEWS_LOOKBACK_MINUTES"), get("NEWS_LOOKBACK_HOURS")) {
            (Some(minutes), _) => parse_number::<u32>("NEWS_LOOKBACK_MINUTES", &minutes)?,
            (None, Some(hours)) => parse_number::<u32>("NEWS_LOOKBACK_HOURS", &hours)?
                .checked_mul(60)
                .unwrap_or(u32::MAX),
            (None, None) => DEFAULT_LOOKBACK_MINUTES,
        };
        if lookback_minutes > MAX_LOOKBACK_MINUTES {
            return Err(IngestError::Configuration(format!(
                "news lookback of {lookback_minutes} minutes exceeds the {MAX_LOOKBACK_MINUTES} minute limit"
            )));
        }
        let lookback = Duration::minutes(lookback_minutes.into());

        let max_results = match get("NEWS_MAX_RESULTS") {
            Some(value) => parse_number("NEWS_MAX_RESULTS", &value)?,
            None => DEFAULT_MAX_RESULTS,
        };

        let fetch_concurrency = match get("NEWS_FETCH_CONCURRENCY") {
            Some(value) => parse_number::<usize>("NEWS_FETCH_CONCURRENCY", &value)?,
            None => DEFAULT_FETCH_CONCURRENCY,
        };
        if fetch_concurrency == 0 {
            return Err(IngestError::Configuration(
                "NEWS_FETCH_CONCURRENCY must be at least 1".to_string(),
            ));
        }

        let schema = match get("NEWS_RECORD_SCHEMA") {
            Some(value) => Some(RecordSchema::parse(&value).ok_or_else(|| {
                IngestError::Configuration(format!(
                    "NEWS_RECORD_SCHEMA must be 'summary' or 'headline', got '{value}'"
                ))
            })?),
            None => None,
        };

        Ok(Self {
            symbols,
            stream,
            lookback,
            max_results,
            fetch_concurrency,
            schema,
        })
    }
}

/// Split a comma-separated ticker list, dropping blank entries
pub fn parse_symbols(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, IngestError> {
    value.trim().parse().map_err(|_| {
        IngestError::Configuration(format!("{key} must be a non-negative number, got '{value}'"))
    })
}
