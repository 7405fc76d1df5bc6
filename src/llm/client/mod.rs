//! LLM客户端 - 基于 rig 的补全服务实现

use anyhow::Result;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Serialize, de::DeserializeOwned};
use std::future::Future;
use tracing::{info, warn};

use crate::config::LLMConfig;
use crate::llm::CompletionService;

mod providers;
pub mod types;

use providers::ProviderClient;
use types::{ChatMessage, split_messages};

/// LLM客户端
#[derive(Clone)]
pub struct LLMClient {
    config: LLMConfig,
    client: ProviderClient,
}

impl LLMClient {
    /// 创建新的LLM客户端
    pub fn new(config: &LLMConfig) -> Result<Self> {
        let client = ProviderClient::new(config)?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// 检查模型连接是否正常
    pub async fn check_connection(&self) -> Result<()> {
        info!(provider = %self.config.provider, model = %self.config.model, "checking model connection");
        let messages = [
            ChatMessage::system("You are a helpful assistant."),
            ChatMessage::user("Hello"),
        ];
        match self.complete(&messages).await {
            Ok(_) => {
                info!("model connection ok");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "model connection failed");
                Err(e)
            }
        }
    }

    /// 通用重试逻辑，固定间隔，最多 `retry_attempts` 次
    async fn retry_with_backoff<T, F, Fut>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, anyhow::Error>>,
    {
        let max_retries = self.config.retry_attempts.max(1);
        let retry_delay_ms = self.config.retry_delay_ms;
        let mut retries = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(err) => {
                    retries += 1;
                    warn!(
                        attempt = retries,
                        max_attempts = max_retries,
                        error = %err,
                        "model call failed"
                    );
                    if retries >= max_retries {
                        return Err(err);
                    }
                    tokio::time::sleep(std::time::Duration::from_millis(retry_delay_ms)).await;
                }
            }
        }
    }
}

#[async_trait]
impl CompletionService for LLMClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let (system_prompt, user_prompt) = split_messages(messages);
        let agent = self.client.create_agent(&system_prompt, &self.config);

        self.retry_with_backoff(|| async { agent.prompt(&user_prompt).await })
            .await
    }

    async fn complete_structured<T>(&self, messages: &[ChatMessage]) -> Result<T>
    where
        T: JsonSchema + DeserializeOwned + Serialize + Send + Sync + 'static,
    {
        let (system_prompt, user_prompt) = split_messages(messages);
        let extractor = self
            .client
            .create_extractor::<T>(&system_prompt, &self.config);

        self.retry_with_backoff(|| async { extractor.extract(&user_prompt).await })
            .await
    }
}
