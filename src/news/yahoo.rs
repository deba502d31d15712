use super::provider::{
    NewsProvider, NewsProviderError, NewsQuery, ProviderConfig, RawNewsItem, RecencyMode,
};
use crate::record::RecordSchema;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Deserialize)]
struct NewsEnvelope {
    #[serde(rename = "Content")]
    content: Option<NewsContent>,
}

#[derive(Deserialize)]
struct NewsContent {
    result: Option<Vec<WireArticle>>,
}

#[derive(Deserialize)]
struct WireArticle {
    title: Option<String>,
    summary: Option<String>,
    url: Option<String>,
    author_name: Option<String>,
    provider_name: Option<String>,
    provider_publish_time: Option<i64>,
}

impl From<WireArticle> for RawNewsItem {
    fn from(article: WireArticle) -> Self {
        RawNewsItem {
            title: article.title,
            url: article.url,
            publisher: None,
            summary: article.summary,
            author_name: article.author_name,
            provider_name: article.provider_name,
            published_at: article
                .provider_publish_time
                .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
        }
    }
}

/// Time-windowed news endpoint: the provider applies `count` and `start`.
pub struct YahooNewsProvider {
    client: reqwest::Client,
    base_url: String,
}

impl YahooNewsProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, NewsProviderError> {
        let client = config.http_client()?;
        log::info!("Yahoo news provider initialized against {}", config.base_url);
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }
}

#[async_trait]
impl NewsProvider for YahooNewsProvider {
    fn name(&self) -> &str {
        "Yahoo Finance news"
    }

    fn recency_mode(&self) -> RecencyMode {
        RecencyMode::Provider
    }

    fn native_schema(&self) -> RecordSchema {
        RecordSchema::Summary
    }

    async fn lookup(
        &self,
        symbol: &str,
        query: &NewsQuery,
    ) -> Result<Vec<RawNewsItem>, NewsProviderError> {
        let url = format!("{}/v2/finance/news", self.base_url);
        log::debug!(
            "Fetching up to {} articles for {} since {}",
            query.max_results,
            symbol,
            query.since
        );

        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbols", symbol.to_string()),
                ("count", query.max_results.to_string()),
                ("start", query.since.timestamp().to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(NewsProviderError::RateLimitExceeded);
        }
        if !status.is_success() {
            return Err(NewsProviderError::Status {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }

        let envelope: NewsEnvelope = response.json().await?;
        let articles = envelope
            .content
            .and_then(|c| c.result)
            .unwrap_or_default();

        Ok(articles.into_iter().map(RawNewsItem::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::GET, MockServer};
    use serde_json::json;

    fn provider_for(server: &MockServer) -> YahooNewsProvider {
        let config = ProviderConfig {
            base_url: server.base_url(),
            ..Default::default()
        };
        YahooNewsProvider::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_lookup_sends_window_and_decodes_articles() {
        let server = MockServer::start_async().await;
        let since = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();

        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v2/finance/news")
                    .query_param("symbols", "AAPL")
                    .query_param("count", "10")
                    .query_param("start", "1700000000");
                then.status(200).json_body(json!({
                    "Content": {
                        "result": [
                            {
                                "title": "Apple ships a thing",
                                "summary": "A long story about a thing.",
                                "url": "https://news.example/apple-thing",
                                "author_name": "Jane Doe",
                                "provider_name": "Reuters",
                                "provider_publish_time": 1_700_000_100
                            },
                            {
                                "title": "Apple ships another thing",
                                "url": "https://news.example/apple-other"
                            }
                        ]
                    }
                }));
            })
            .await;

        let provider = provider_for(&server);
        let query = NewsQuery {
            max_results: 10,
            since,
        };
        let items = provider.lookup("AAPL", &query).await.unwrap();

        mock.assert_async().await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title.as_deref(), Some("Apple ships a thing"));
        assert_eq!(items[0].provider_name.as_deref(), Some("Reuters"));
        assert_eq!(items[0].published_at.map(|t| t.timestamp()), Some(1_700_000_100));
        assert!(items[1].summary.is_none());
    }

    #[tokio::test]
    async fn test_lookup_empty_content_yields_no_items() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v2/finance/news");
                then.status(200).json_body(json!({ "Content": null }));
            })
            .await;

        let provider = provider_for(&server);
        let query = NewsQuery {
            max_results: 5,
            since: Utc::now(),
        };
        let items = provider.lookup("MSFT", &query).await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_lookup_maps_error_statuses() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).query_param("symbols", "BAD");
                then.status(500).body("boom");
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).query_param("symbols", "BUSY");
                then.status(429);
            })
            .await;

        let provider = provider_for(&server);
        let query = NewsQuery {
            max_results: 10,
            since: Utc::now(),
        };

        let err = provider.lookup("BAD", &query).await.unwrap_err();
        assert!(matches!(err, NewsProviderError::Status { status: 500, .. }));

        let err = provider.lookup("BUSY", &query).await.unwrap_err();
        assert!(matches!(err, NewsProviderError::RateLimitExceeded));
    }

    #[tokio::test]
    async fn test_lookup_malformed_body_is_parse_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v2/finance/news");
                then.status(200)
                    .header("content-type", "application/json")
                    .body("{not json");
            })
            .await;

        let provider = provider_for(&server);
        let query = NewsQuery {
            max_results: 10,
            since: Utc::now(),
        };
        let err = provider.lookup("AAPL", &query).await.unwrap_err();
        assert!(matches!(err, NewsProviderError::ParseError(_)));
    }
}
