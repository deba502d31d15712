use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::error::Error;
use std::fmt;

use crate::record::RecordSchema;

pub const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";

/// Error types for news lookups
#[derive(Debug)]
pub enum NewsProviderError {
    /// Network request failed
    NetworkError(String),
    /// Provider answered with a non-success HTTP status
    Status { status: u16, url: String },
    /// Failed to parse response
    ParseError(String),
    /// Rate limit exceeded
    RateLimitExceeded,
    /// Configuration error
    ConfigError(String),
}

impl fmt::Display for NewsProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NewsProviderError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            NewsProviderError::Status { status, url } => {
                write!(f, "HTTP status {} from {}", status, url)
            }
            NewsProviderError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            NewsProviderError::RateLimitExceeded => write!(f, "Rate limit exceeded"),
            NewsProviderError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl Error for NewsProviderError {}

/// Convert reqwest failures to NewsProviderError
impl From<reqwest::Error> for NewsProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            NewsProviderError::ParseError(error.to_string())
        } else if let Some(status) = error.status() {
            if status.as_u16() == 429 {
                NewsProviderError::RateLimitExceeded
            } else {
                NewsProviderError::Status {
                    status: status.as_u16(),
                    url: error.url().map(|u| u.to_string()).unwrap_or_default(),
                }
            }
        } else {
            NewsProviderError::NetworkError(error.to_string())
        }
    }
}

/// News item as returned by a provider, before any schema is applied.
///
/// Providers fill in what their endpoint carries; the record schema decides
/// which fields are required.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawNewsItem {
    /// Article headline
    pub title: Option<String>,
    /// Link to the full article
    pub url: Option<String>,
    /// Publishing outlet (search endpoint)
    pub publisher: Option<String>,
    /// Long-form summary (windowed endpoint)
    pub summary: Option<String>,
    /// Article author (windowed endpoint)
    pub author_name: Option<String>,
    /// Syndication provider (windowed endpoint)
    pub provider_name: Option<String>,
    /// Publication time, second precision
    pub published_at: Option<DateTime<Utc>>,
}

/// Where the recency window is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecencyMode {
    /// The provider receives `since` and only returns recent items.
    Provider,
    /// The provider returns its default set; the ingestor filters by timestamp.
    Local,
}

/// Parameters of one per-symbol lookup
#[derive(Debug, Clone, PartialEq)]
pub struct NewsQuery {
    /// Maximum number of items to ask for
    pub max_results: u32,
    /// Oldest publication time of interest
    pub since: DateTime<Utc>,
}

/// Selects which provider implementation the ingestor talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    YahooNews,
    YahooSearch,
}

impl ProviderKind {
    pub fn parse(name: &str) -> Result<Self, NewsProviderError> {
        match name.trim().to_lowercase().as_str() {
            "yahoo_news" | "yahoonews" | "news" => Ok(ProviderKind::YahooNews),
            "yahoo_search" | "yahoosearch" | "search" => Ok(ProviderKind::YahooSearch),
            other => Err(NewsProviderError::ConfigError(format!(
                "Unknown provider type: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::YahooNews => write!(f, "yahoo_news"),
            ProviderKind::YahooSearch => write!(f, "yahoo_search"),
        }
    }
}

/// Configuration for news providers, read once at cold start
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Which provider to build
    pub kind: ProviderKind,
    /// Base URL for API requests
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::YahooNews,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: 30,
        }
    }
}

impl ProviderConfig {
    /// Build from process environment variables
    pub fn from_env() -> Result<Self, NewsProviderError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset or blank keys fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, NewsProviderError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(kind) = get("NEWS_PROVIDER") {
            config.kind = ProviderKind::parse(&kind)?;
        }
        if let Some(base_url) = get("NEWS_API_BASE_URL") {
            config.base_url = base_url.trim().trim_end_matches('/').to_string();
        }
        if let Some(timeout) = get("NEWS_API_TIMEOUT_SECS") {
            config.timeout = timeout.trim().parse().map_err(|_| {
                NewsProviderError::ConfigError(format!(
                    "NEWS_API_TIMEOUT_SECS must be a whole number of seconds, got '{timeout}'"
                ))
            })?;
        }

        Ok(config)
    }

    pub(crate) fn http_client(&self) -> Result<reqwest::Client, NewsProviderError> {
        reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(self.timeout))
            .user_agent(concat!("news_ingestor/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| NewsProviderError::ConfigError(format!("Failed to build HTTP client: {e}")))
    }
}

/// Trait for news-by-symbol providers
#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &str;

    /// Whether the provider honours `NewsQuery::since` itself
    fn recency_mode(&self) -> RecencyMode;

    /// Record shape this provider's fields map onto naturally
    fn native_schema(&self) -> RecordSchema;

    /// Fetch news items for a single symbol
    async fn lookup(
        &self,
        symbol: &str,
        query: &NewsQuery,
    ) -> Result<Vec<RawNewsItem>, NewsProviderError>;
}

/// Factory for creating news providers
pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a provider from configuration
    pub fn create(config: &ProviderConfig) -> Result<Box<dyn NewsProvider>, NewsProviderError> {
        match config.kind {
            ProviderKind::YahooNews => {
                use crate::news::yahoo::YahooNewsProvider;
                Ok(Box::new(YahooNewsProvider::new(config)?))
            }
            ProviderKind::YahooSearch => {
                use crate::news::search::YahooSearchProvider;
                Ok(Box::new(YahooSearchProvider::new(config)?))
            }
        }
    }
}
