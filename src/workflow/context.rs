use std::sync::Arc;
use tracing::warn;

use crate::config::ResearchConfig;
use crate::llm::CompletionService;
use crate::types::research::{ScrapedPage, SearchResult};
use crate::web::SearchService;

/// 步骤共享的协作者与限制参数
pub struct ResearchContext<S, C> {
    /// 搜索/抓取服务
    pub search: Arc<S>,
    /// 补全服务
    pub llm: Arc<C>,
    /// 调研规模限制
    pub limits: ResearchConfig,
    /// 调研阶段的最大并发数
    pub max_parallels: usize,
}

impl<S, C> Clone for ResearchContext<S, C> {
    fn clone(&self) -> Self {
        Self {
            search: Arc::clone(&self.search),
            llm: Arc::clone(&self.llm),
            limits: self.limits.clone(),
            max_parallels: self.max_parallels,
        }
    }
}

impl<S, C> ResearchContext<S, C>
where
    S: SearchService,
    C: CompletionService,
{
    pub fn new(search: Arc<S>, llm: Arc<C>, limits: ResearchConfig, max_parallels: usize) -> Self {
        Self {
            search,
            llm,
            limits,
            max_parallels,
        }
    }

    /// 搜索失败时记录日志并降级为空结果
    pub async fn search_or_empty(&self, query: &str, limit: usize) -> Vec<SearchResult> {
        match self.search.search(query, limit).await {
            Ok(results) => results,
            Err(e) => {
                warn!(query = %query, error = %e, "search failed, continuing without results");
                vec![]
            }
        }
    }

    /// 抓取失败时记录日志并降级为空结果
    pub async fn scrape_or_empty(&self, url: &str) -> Vec<ScrapedPage> {
        match self.search.scrape(url).await {
            Ok(pages) => pages,
            Err(e) => {
                warn!(url = %url, error = %e, "scrape failed, continuing without content");
                vec![]
            }
        }
    }
}
