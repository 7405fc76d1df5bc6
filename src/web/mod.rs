//! 网页搜索与抓取协作者

use async_trait::async_trait;
use thiserror::Error;

use crate::types::research::{ScrapedPage, SearchResult};

pub mod firecrawl;

pub use firecrawl::FirecrawlClient;

#[derive(Debug, Error)]
pub enum WebError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("service reported failure: {0}")]
    Api(String),

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// 搜索/抓取服务
///
/// 返回显式的结果类型，由调用方决定失败时如何降级。
#[async_trait]
pub trait SearchService: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, WebError>;

    async fn scrape(&self, url: &str) -> Result<Vec<ScrapedPage>, WebError>;
}
