/// News lookup providers
pub mod provider;
pub mod search;
pub mod yahoo;

// Re-export commonly used types
pub use provider::{
    NewsProvider, NewsProviderError, NewsQuery, ProviderConfig, ProviderFactory, RawNewsItem,
    RecencyMode,
};
