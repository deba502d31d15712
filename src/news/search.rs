use super::provider::{
    NewsProvider, NewsProviderError, NewsQuery, ProviderConfig, RawNewsItem, RecencyMode,
};
use crate::record::RecordSchema;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Deserialize)]
struct SearchEnvelope {
    news: Option<Vec<SearchArticle>>,
}

#[derive(Deserialize)]
struct SearchArticle {
    title: Option<String>,
    publisher: Option<String>,
    link: Option<String>,
    #[serde(rename = "providerPublishTime")]
    provider_publish_time: Option<i64>,
}

/// Search endpoint news. It has no time window, so items come back with
/// `providerPublishTime` and the ingestor filters them.
pub struct YahooSearchProvider {
    client: reqwest::Client,
    base_url: String,
}

impl YahooSearchProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, NewsProviderError> {
        let client = config.http_client()?;
        log::info!("Yahoo search provider initialized against {}", config.base_url);
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }
}

#[async_trait]
impl NewsProvider for YahooSearchProvider {
    fn name(&self) -> &str {
        "Yahoo Finance search"
    }

    fn recency_mode(&self) -> RecencyMode {
        RecencyMode::Local
    }

    fn native_schema(&self) -> RecordSchema {
        RecordSchema::Headline
    }

    async fn lookup(
        &self,
        symbol: &str,
        query: &NewsQuery,
    ) -> Result<Vec<RawNewsItem>, NewsProviderError> {
        let url = format!("{}/v1/finance/search", self.base_url);
        log::debug!("Searching news for {}", symbol);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", symbol.to_string()),
                ("newsCount", query.max_results.to_string()),
                ("quotesCount", "0".to_string()),
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

        let envelope: SearchEnvelope = response.json().await?;

        Ok(envelope
            .news
            .unwrap_or_default()
            .into_iter()
            .map(|article| RawNewsItem {
                title: article.title,
                url: article.link,
                publisher: article.publisher,
                published_at: article
                    .provider_publish_time
                    .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
                ..Default::default()
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::GET, MockServer};
    use serde_json::json;

    #[tokio::test]
    async fn test_search_lookup_decodes_news_block() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v1/finance/search")
                    .query_param("q", "MSFT")
                    .query_param("newsCount", "8")
                    .query_param("quotesCount", "0");
                then.status(200).json_body(json!({
                    "quotes": [],
                    "news": [
                        {
                            "uuid": "0b8f",
                            "title": "Microsoft earnings beat",
                            "publisher": "Bloomberg",
                            "link": "https://news.example/msft",
                            "providerPublishTime": 1_700_000_500,
                            "type": "STORY"
                        }
                    ]
                }));
            })
            .await;

        let config = ProviderConfig {
            base_url: server.base_url(),
            ..Default::default()
        };
        let provider = YahooSearchProvider::new(&config).unwrap();
        let query = NewsQuery {
            max_results: 8,
            since: Utc::now(),
        };
        let items = provider.lookup("MSFT", &query).await.unwrap();

        mock.assert_async().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].publisher.as_deref(), Some("Bloomberg"));
        assert_eq!(items[0].url.as_deref(), Some("https://news.example/msft"));
        assert_eq!(items[0].published_at.map(|t| t.timestamp()), Some(1_700_000_500));
        assert!(items[0].summary.is_none());
    }

    #[tokio::test]
    async fn test_search_lookup_without_news_block() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/finance/search");
                then.status(200).json_body(json!({ "quotes": [] }));
            })
            .await;

        let config = ProviderConfig {
            base_url: server.base_url(),
            ..Default::default()
        };
        let provider = YahooSearchProvider::new(&config).unwrap();
        let query = NewsQuery {
            max_results: 10,
            since: Utc::now(),
        };
        assert!(provider.lookup("MSFT", &query).await.unwrap().is_empty());
    }
}
