/// News ingestion pipeline
pub mod config;
pub mod error;
pub mod service;

pub use config::IngestConfig;
pub use error::IngestError;
pub use service::{IngestReport, IngestStatus, NewsIngestor};
