//! 语言模型协作者

use anyhow::Result;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Serialize, de::DeserializeOwned};

pub mod client;

pub use client::LLMClient;
pub use client::types::{ChatMessage, Role};

/// 补全服务
///
/// 两个方法都可能失败，调用方负责处理错误。
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// 自由文本补全
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;

    /// 结构化补全，输出按 `T` 的 JSON Schema 校验
    async fn complete_structured<T>(&self, messages: &[ChatMessage]) -> Result<T>
    where
        T: JsonSchema + DeserializeOwned + Serialize + Send + Sync + 'static;
}
