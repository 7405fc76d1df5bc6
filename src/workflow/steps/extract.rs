use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::graph::Step;
use crate::llm::CompletionService;
use crate::types::research::{ResearchState, ResearchUpdate};
use crate::utils::text::truncate_chars;
use crate::web::SearchService;
use crate::workflow::context::ResearchContext;
use crate::workflow::prompts::tool_extraction_messages;

/// 行首的编号，如 `1.`、`2)`、`3 -`
static ENUMERATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[\).\s-]+").expect("valid enumeration regex"));

/// 模型常见的开场白
const PREAMBLE_PHRASE: &str = "after analyzing";

/// 示例占位行
const EXAMPLE_PREFIX: &str = "example";

/// 把模型的自由文本回复解析为工具名列表
///
/// 去掉空行和开场白，剥离编号与项目符号，丢弃示例占位行，保持原有顺序。
pub fn parse_tool_names(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !line.to_lowercase().contains(PREAMBLE_PHRASE))
        .map(|line| ENUMERATION.replace(line, "").into_owned())
        .map(|line| {
            line.trim_start_matches(['-', '*', '•'])
                .trim()
                .to_string()
        })
        .filter(|line| !line.is_empty())
        .filter(|line| !line.to_lowercase().starts_with(EXAMPLE_PREFIX))
        .collect()
}

/// 搜索对比类文章，抓取摘录后让模型列出其中提到的工具
pub struct ExtractToolsStep<S, C> {
    context: ResearchContext<S, C>,
}

impl<S, C> ExtractToolsStep<S, C> {
    pub fn new(context: ResearchContext<S, C>) -> Self {
        Self { context }
    }
}

impl<S, C> ExtractToolsStep<S, C>
where
    S: SearchService,
    C: CompletionService,
{
    /// 依次抓取每个结果页面，每条抓取内容分别截取摘录后拼接
    async fn collect_excerpts(&self, urls: &[String]) -> String {
        let limit = self.context.limits.article_excerpt_chars;
        let mut content = String::new();

        for url in urls {
            for page in self.context.scrape_or_empty(url).await {
                content.push_str(truncate_chars(&page.content, limit));
                content.push_str("\n\n");
            }
        }

        content
    }
}

#[async_trait]
impl<S, C> Step<ResearchState> for ExtractToolsStep<S, C>
where
    S: SearchService + 'static,
    C: CompletionService + 'static,
{
    async fn run(&self, state: &ResearchState) -> ResearchUpdate {
        println!("🔍 Finding articles about: {}", state.query);

        let article_query = format!("{} tools comparison best alternatives", state.query);
        let results = self
            .context
            .search_or_empty(&article_query, self.context.limits.article_results)
            .await;

        let urls: Vec<String> = results.iter().filter_map(|r| r.url.clone()).collect();
        let content = self.collect_excerpts(&urls).await;
        debug!(
            articles = urls.len(),
            content_chars = content.chars().count(),
            "collected article excerpts"
        );

        let messages = tool_extraction_messages(&state.query, &content);
        let tools = match self.context.llm.complete(&messages).await {
            Ok(reply) => parse_tool_names(&reply),
            Err(e) => {
                warn!(error = %e, "tool extraction failed");
                vec![]
            }
        };

        let shown = tools.iter().take(5).cloned().collect::<Vec<_>>().join(", ");
        println!("✅ Extracted tools: {}", shown);

        ResearchUpdate::extracted_tools(tools).with_search_results(results)
    }
}
