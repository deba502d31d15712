use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::news::RawNewsItem;

/// Summaries are cut to this many whitespace-delimited words
pub const MAX_SUMMARY_WORDS: usize = 250;

/// Records per PutRecords call
pub const MAX_BATCH_SIZE: usize = 10;

/// Output shape of a normalized record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSchema {
    /// `{link, publisher}`
    Headline,
    /// `{summary, url, author_name, provider_name}`
    Summary,
}

impl RecordSchema {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "headline" => Some(RecordSchema::Headline),
            "summary" => Some(RecordSchema::Summary),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("news item is missing required field `{0}`")]
pub struct MissingField(pub &'static str);

/// Schema-specific part of a record, flattened next to the common fields
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RecordBody {
    Headline {
        link: String,
        publisher: String,
    },
    Summary {
        summary: String,
        url: String,
        author_name: String,
        provider_name: String,
    },
}

/// One news item, tagged with the symbol it was fetched for
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRecord {
    pub symbol: String,
    /// When the item was mapped, not when it was published
    pub collection_time: String,
    pub title: String,
    #[serde(flatten)]
    pub body: RecordBody,
}

impl NormalizedRecord {
    pub fn from_item(
        symbol: &str,
        item: &RawNewsItem,
        schema: RecordSchema,
        collected_at: DateTime<Utc>,
    ) -> Result<Self, MissingField> {
        let title = require(&item.title, "title")?;

        let body = match schema {
            RecordSchema::Headline => RecordBody::Headline {
                link: require(&item.url, "link")?,
                publisher: require(&item.publisher, "publisher")?,
            },
            RecordSchema::Summary => RecordBody::Summary {
                summary: truncate_words(&require(&item.summary, "summary")?, MAX_SUMMARY_WORDS),
                url: require(&item.url, "url")?,
                author_name: require(&item.author_name, "author_name")?,
                provider_name: require(&item.provider_name, "provider_name")?,
            },
        };

        Ok(Self {
            symbol: symbol.to_string(),
            collection_time: collected_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            title,
            body,
        })
    }
}

fn require(field: &Option<String>, name: &'static str) -> Result<String, MissingField> {
    field.clone().ok_or(MissingField(name))
}

/// Keep the first `limit` whitespace-delimited words, joined by single spaces
pub fn truncate_words(text: &str, limit: usize) -> String {
    text.split_whitespace()
        .take(limit)
        .collect::<Vec<_>>()
        .join(" ")
}

/// PutRecords entry: JSON payload plus a random partition key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KinesisRecord {
    #[serde(rename = "Data")]
    pub data: String,
    #[serde(rename = "PartitionKey")]
    pub partition_key: String,
}

impl KinesisRecord {
    pub fn from_normalized(record: &NormalizedRecord) -> Result<Self, serde_json::Error> {
        Ok(Self {
            data: serde_json::to_string(record)?,
            partition_key: uuid::Uuid::new_v4().to_string(),
        })
    }
}

/// Contiguous chunks of at most `size` records, in order
pub fn batches<T>(records: &[T], size: usize) -> std::slice::Chunks<'_, T> {
    records.chunks(size.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
    }

    fn summary_item() -> RawNewsItem {
        RawNewsItem {
            title: Some("Apple ships".to_string()),
            url: Some("https://news.example/a".to_string()),
            summary: Some("  spaced\tout \n summary ".to_string()),
            author_name: Some("Jane Doe".to_string()),
            provider_name: Some("Reuters".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_truncate_words_caps_long_text() {
        let truncated = truncate_words(&words(300), MAX_SUMMARY_WORDS);
        let tokens: Vec<&str> = truncated.split(' ').collect();
        assert_eq!(tokens.len(), 250);
        assert_eq!(tokens[0], "w0");
        assert_eq!(tokens[249], "w249");
    }

    #[test]
    fn test_truncate_words_is_idempotent() {
        let short = words(40);
        assert_eq!(truncate_words(&short, MAX_SUMMARY_WORDS), short);

        let once = truncate_words(&words(260), MAX_SUMMARY_WORDS);
        assert_eq!(truncate_words(&once, MAX_SUMMARY_WORDS), once);
    }

    #[test]
    fn test_summary_record_serialization() {
        let collected_at = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
        let record =
            NormalizedRecord::from_item("AAPL", &summary_item(), RecordSchema::Summary, collected_at)
                .unwrap();

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["symbol"], "AAPL");
        assert_eq!(value["collection_time"], "2023-11-14T22:13:20.000000Z");
        assert_eq!(value["title"], "Apple ships");
        assert_eq!(value["summary"], "spaced out summary");
        assert_eq!(value["author_name"], "Jane Doe");
        assert_eq!(value["provider_name"], "Reuters");
        assert!(value.get("link").is_none());
    }

    #[test]
    fn test_headline_record_requires_publisher() {
        let mut item = RawNewsItem {
            title: Some("Microsoft beats".to_string()),
            url: Some("https://news.example/m".to_string()),
            ..Default::default()
        };

        let err = NormalizedRecord::from_item("MSFT", &item, RecordSchema::Headline, Utc::now())
            .unwrap_err();
        assert_eq!(err, MissingField("publisher"));

        item.publisher = Some("Bloomberg".to_string());
        let record =
            NormalizedRecord::from_item("MSFT", &item, RecordSchema::Headline, Utc::now()).unwrap();
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["link"], "https://news.example/m");
        assert_eq!(value["publisher"], "Bloomberg");
        assert!(value.get("summary").is_none());
    }

    #[test]
    fn test_kinesis_record_envelope() {
        let record =
            NormalizedRecord::from_item("AAPL", &summary_item(), RecordSchema::Summary, Utc::now())
                .unwrap();
        let first = KinesisRecord::from_normalized(&record).unwrap();
        let second = KinesisRecord::from_normalized(&record).unwrap();

        assert_ne!(first.partition_key, second.partition_key);
        assert!(uuid::Uuid::parse_str(&first.partition_key).is_ok());

        let decoded: serde_json::Value = serde_json::from_str(&first.data).unwrap();
        assert_eq!(decoded["symbol"], "AAPL");

        let envelope = serde_json::to_value(&first).unwrap();
        assert!(envelope.get("Data").is_some());
        assert!(envelope.get("PartitionKey").is_some());
    }

    #[test]
    fn test_batches_are_exhaustive_and_bounded() {
        for len in [0usize, 1, 9, 10, 11, 25, 30] {
            let records: Vec<usize> = (0..len).collect();
            let chunks: Vec<&[usize]> = batches(&records, MAX_BATCH_SIZE).collect();

            assert_eq!(chunks.len(), len.div_ceil(MAX_BATCH_SIZE));
            assert!(chunks.iter().all(|c| c.len() <= MAX_BATCH_SIZE));
            if let Some((_, head)) = chunks.split_last() {
                assert!(head.iter().all(|c| c.len() == MAX_BATCH_SIZE));
            }
            let rebuilt: Vec<usize> = chunks.concat();
            assert_eq!(rebuilt, records);
        }
    }

    #[test]
    fn test_record_schema_parse() {
        assert_eq!(RecordSchema::parse("Summary"), Some(RecordSchema::Summary));
        assert_eq!(RecordSchema::parse("headline"), Some(RecordSchema::Headline));
        assert_eq!(RecordSchema::parse("full"), None);
    }
}
