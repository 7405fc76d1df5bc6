//! 单元测试用的协作者桩

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::config::ResearchConfig;
use crate::llm::{ChatMessage, CompletionService, Role};
use crate::types::research::{ScrapedPage, SearchResult};
use crate::web::{SearchService, WebError};
use crate::workflow::context::ResearchContext;

/// 按查询/URL 返回预设结果；未预设的查询返回空结果
#[derive(Default)]
pub struct StubSearch {
    results: HashMap<String, Vec<SearchResult>>,
    pages: HashMap<String, Vec<ScrapedPage>>,
    fail_all: bool,
    pub searches: Mutex<Vec<(String, usize)>>,
    pub scrapes: Mutex<Vec<String>>,
}

impl StubSearch {
    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Default::default()
        }
    }

    pub fn with_hit(mut self, query: &str, url: &str, title: &str) -> Self {
        self.results
            .entry(query.to_string())
            .or_default()
            .push(SearchResult {
                url: Some(url.to_string()),
                title: Some(title.to_string()),
                ..Default::default()
            });
        self
    }

    pub fn with_page(mut self, url: &str, content: &str) -> Self {
        self.pages
            .entry(url.to_string())
            .or_default()
            .push(ScrapedPage {
                content: content.to_string(),
                url: Some(url.to_string()),
            });
        self
    }

    pub fn search_queries(&self) -> Vec<String> {
        self.searches
            .lock()
            .unwrap()
            .iter()
            .map(|(query, _)| query.clone())
            .collect()
    }
}

#[async_trait]
impl SearchService for StubSearch {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, WebError> {
        self.searches
            .lock()
            .unwrap()
            .push((query.to_string(), limit));
        if self.fail_all {
            return Err(WebError::Api("stub search failure".to_string()));
        }
        let mut results = self.results.get(query).cloned().unwrap_or_default();
        results.truncate(limit);
        Ok(results)
    }

    async fn scrape(&self, url: &str) -> Result<Vec<ScrapedPage>, WebError> {
        self.scrapes.lock().unwrap().push(url.to_string());
        if self.fail_all {
            return Err(WebError::Api("stub scrape failure".to_string()));
        }
        Ok(self.pages.get(url).cloned().unwrap_or_default())
    }
}

/// 根据用户消息中包含的片段返回预设回复；没有匹配时返回错误
#[derive(Default)]
pub struct StubCompletion {
    texts: Vec<(String, String)>,
    structured: Vec<(String, Value)>,
    pub prompts: Mutex<Vec<String>>,
}

impl StubCompletion {
    pub fn with_text(mut self, needle: &str, reply: &str) -> Self {
        self.texts.push((needle.to_string(), reply.to_string()));
        self
    }

    pub fn with_structured(mut self, needle: &str, reply: Value) -> Self {
        self.structured.push((needle.to_string(), reply));
        self
    }

    fn user_prompt(&self, messages: &[ChatMessage]) -> String {
        let prompt = messages
            .iter()
            .filter(|m| m.role == Role::User)
            .map(|m| m.content.clone())
            .collect::<Vec<_>>()
            .join("\n");
        self.prompts.lock().unwrap().push(prompt.clone());
        prompt
    }
}

#[async_trait]
impl CompletionService for StubCompletion {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let prompt = self.user_prompt(messages);
        self.texts
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, reply)| reply.clone())
            .ok_or_else(|| anyhow!("no stubbed text reply"))
    }

    async fn complete_structured<T>(&self, messages: &[ChatMessage]) -> Result<T>
    where
        T: JsonSchema + DeserializeOwned + Serialize + Send + Sync + 'static,
    {
        let prompt = self.user_prompt(messages);
        let (_, reply) = self
            .structured
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .ok_or_else(|| anyhow!("no stubbed structured reply"))?;
        Ok(serde_json::from_value(reply.clone())?)
    }
}

pub fn context(
    search: StubSearch,
    llm: StubCompletion,
) -> ResearchContext<StubSearch, StubCompletion> {
    ResearchContext::new(
        Arc::new(search),
        Arc::new(llm),
        ResearchConfig::default(),
        1,
    )
}
