//! Firecrawl v1 REST 客户端

use async_trait::async_trait;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

use super::{SearchService, WebError};
use crate::config::FirecrawlConfig;
use crate::types::research::{ScrapedPage, SearchResult};

#[derive(Clone)]
pub struct FirecrawlClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl FirecrawlClient {
    pub fn new(config: &FirecrawlConfig) -> Result<Self, WebError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, WebError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "firecrawl request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(WebError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        unwrap_envelope(serde_json::from_str(&text)?)
    }
}

/// 取出 `{"success": .., "data": ..}` 信封中的数据；裸数组原样返回
fn unwrap_envelope(value: Value) -> Result<Value, WebError> {
    match value {
        Value::Object(mut map) => {
            if map.get("success").and_then(Value::as_bool) == Some(false) {
                let message = map
                    .get("error")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_string();
                return Err(WebError::Api(message));
            }
            Ok(map.remove("data").unwrap_or(Value::Null))
        }
        other => Ok(other),
    }
}

fn page_from_value(item: &Value) -> Option<ScrapedPage> {
    let content = item
        .get("markdown")
        .or_else(|| item.get("content"))
        .and_then(Value::as_str)
        .filter(|content| !content.trim().is_empty())?;

    let url = item
        .get("metadata")
        .and_then(|metadata| metadata.get("sourceURL").or_else(|| metadata.get("url")))
        .or_else(|| item.get("url"))
        .and_then(Value::as_str)
        .map(str::to_string);

    Some(ScrapedPage {
        content: content.to_string(),
        url,
    })
}

#[async_trait]
impl SearchService for FirecrawlClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, WebError> {
        let data = self
            .post(
                "/v1/search",
                json!({
                    "query": query,
                    "limit": limit,
                    "scrapeOptions": { "formats": ["markdown"] },
                }),
            )
            .await?;

        match data {
            Value::Array(_) => Ok(serde_json::from_value(data)?),
            _ => Ok(vec![]),
        }
    }

    async fn scrape(&self, url: &str) -> Result<Vec<ScrapedPage>, WebError> {
        let data = self
            .post("/v1/scrape", json!({ "url": url, "formats": ["markdown"] }))
            .await?;

        let pages = match &data {
            Value::Array(items) => items.iter().filter_map(page_from_value).collect(),
            Value::Object(_) => page_from_value(&data).into_iter().collect(),
            _ => vec![],
        };
        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> FirecrawlClient {
        FirecrawlClient::new(&FirecrawlConfig {
            api_key: "fc-test".to_string(),
            api_base_url: format!("{}/", server.uri()),
            timeout_seconds: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_search_sends_query_and_reads_envelope() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/search"))
            .and(header("authorization", "Bearer fc-test"))
            .and(body_partial_json(json!({ "query": "vector databases", "limit": 3 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": [
                    { "url": "https://qdrant.tech", "title": "Qdrant", "markdown": "# Qdrant" },
                    { "title": "No url here" }
                ]
            })))
            .mount(&server)
            .await;

        let results = client_for(&server)
            .search("vector databases", 3)
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].url.as_deref(), Some("https://qdrant.tech"));
        assert_eq!(results[0].markdown.as_deref(), Some("# Qdrant"));
        assert!(results[1].url.is_none());
    }

    #[tokio::test]
    async fn test_search_accepts_bare_array() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/search"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{ "url": "https://weaviate.io", "title": "Weaviate" }])),
            )
            .mount(&server)
            .await;

        let results = client_for(&server).search("weaviate", 1).await.unwrap();
        assert_eq!(results[0].title.as_deref(), Some("Weaviate"));
    }

    #[tokio::test]
    async fn test_search_reports_http_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let err = client_for(&server).search("anything", 1).await.unwrap_err();
        match err {
            WebError::Status { status, body } => {
                assert_eq!(status, 429);
                assert_eq!(body, "rate limited");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_search_reports_api_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "error": "Insufficient credits"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).search("anything", 1).await.unwrap_err();
        assert!(matches!(err, WebError::Api(message) if message == "Insufficient credits"));
    }

    #[tokio::test]
    async fn test_scrape_reads_single_document() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/scrape"))
            .and(body_partial_json(json!({ "url": "https://qdrant.tech", "formats": ["markdown"] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {
                    "markdown": "Qdrant is a vector database",
                    "metadata": { "sourceURL": "https://qdrant.tech" }
                }
            })))
            .mount(&server)
            .await;

        let pages = client_for(&server)
            .scrape("https://qdrant.tech")
            .await
            .unwrap();

        assert_eq!(
            pages,
            vec![ScrapedPage {
                content: "Qdrant is a vector database".to_string(),
                url: Some("https://qdrant.tech".to_string()),
            }]
        );
    }

    #[tokio::test]
    async fn test_scrape_skips_empty_documents() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/scrape"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": [{ "markdown": "   " }, { "markdown": "kept" }]
            })))
            .mount(&server)
            .await;

        let pages = client_for(&server).scrape("https://x.dev").await.unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].content, "kept");
    }

    #[tokio::test]
    async fn test_scrape_rejects_malformed_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/scrape"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).scrape("https://x.dev").await.unwrap_err();
        assert!(matches!(err, WebError::Decode(_)));
    }
}
