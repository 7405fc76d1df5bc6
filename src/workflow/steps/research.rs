use async_trait::async_trait;
use tracing::{debug, warn};

use crate::graph::Step;
use crate::llm::CompletionService;
use crate::types::research::{CompanyAnalysis, CompanyRecord, ResearchState, ResearchUpdate};
use crate::utils::text::guess_website;
use crate::utils::threads::do_parallel_with_limit;
use crate::web::SearchService;
use crate::workflow::context::ResearchContext;
use crate::workflow::prompts::tool_analysis_messages;

/// 搜索结果没有标题时使用的名称
const UNTITLED: &str = "Unknown";

/// 逐个调研提取出的工具：定位官网、抓取内容、结构化分析
pub struct ResearchStep<S, C> {
    context: ResearchContext<S, C>,
}

impl<S, C> ResearchStep<S, C> {
    pub fn new(context: ResearchContext<S, C>) -> Self {
        Self { context }
    }
}

impl<S, C> ResearchStep<S, C>
where
    S: SearchService,
    C: CompletionService,
{
    /// 提取结果为空时，直接用原始查询搜索，把结果标题当作工具名
    async fn fallback_names(&self, query: &str) -> Vec<String> {
        println!("⚠️ No extracted tools found, falling back to direct search");
        self.context
            .search_or_empty(query, self.context.limits.fallback_results)
            .await
            .into_iter()
            .map(|r| r.title.unwrap_or_else(|| UNTITLED.to_string()))
            .collect()
    }

    /// 第一个搜索结果的 URL，找不到时根据名称猜测
    async fn resolve_website(&self, tool_name: &str) -> String {
        let query = format!("{} official site", tool_name);
        self.context
            .search_or_empty(&query, self.context.limits.official_site_results)
            .await
            .into_iter()
            .find_map(|r| r.url)
            .unwrap_or_else(|| {
                let guessed = guess_website(tool_name);
                debug!(tool = %tool_name, url = %guessed, "no search hit, using guessed website");
                guessed
            })
    }

    async fn research_tool(&self, tool_name: String) -> CompanyRecord {
        println!("🔬 Researching: {}", tool_name);

        let website = self.resolve_website(&tool_name).await;
        let content = self
            .context
            .scrape_or_empty(&website)
            .await
            .into_iter()
            .next()
            .map(|page| page.content)
            .unwrap_or_else(|| format!("No scraped content available for {}", tool_name));

        let messages = tool_analysis_messages(&tool_name, &content);
        let mut company = CompanyRecord::new(tool_name, website, content);

        let analysis = match self
            .context
            .llm
            .complete_structured::<CompanyAnalysis>(&messages)
            .await
        {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!(tool = %company.name, error = %e, "structured analysis failed");
                CompanyAnalysis::failed()
            }
        };
        company.apply_analysis(analysis);

        company
    }
}

#[async_trait]
impl<S, C> Step<ResearchState> for ResearchStep<S, C>
where
    S: SearchService + 'static,
    C: CompletionService + 'static,
{
    async fn run(&self, state: &ResearchState) -> ResearchUpdate {
        let names = if state.extracted_tools.is_empty() {
            self.fallback_names(&state.query).await
        } else {
            state.extracted_tools.clone()
        };

        let futures: Vec<_> = names
            .into_iter()
            .take(self.context.limits.max_tools)
            .map(|name| self.research_tool(name))
            .collect();

        let companies = do_parallel_with_limit(futures, self.context.max_parallels).await;
        println!("✅ Researched {} tools", companies.len());

        ResearchUpdate::companies(companies)
    }
}
