use async_trait::async_trait;
use tracing::{debug, warn};

use crate::graph::Step;
use crate::llm::CompletionService;
use crate::types::research::{ANALYSIS_FAILED, CompanyRecord, ResearchState, ResearchUpdate};
use crate::web::SearchService;
use crate::workflow::context::ResearchContext;
use crate::workflow::prompts::recommendations_messages;

/// 根据调研结果生成推荐
pub struct AnalyzeStep<S, C> {
    context: ResearchContext<S, C>,
}

impl<S, C> AnalyzeStep<S, C> {
    pub fn new(context: ResearchContext<S, C>) -> Self {
        Self { context }
    }
}

/// 每条记录序列化为一行 JSON，逗号拼接
fn serialize_companies(companies: &[CompanyRecord]) -> String {
    companies
        .iter()
        .filter_map(|company| serde_json::to_string(company).ok())
        .collect::<Vec<_>>()
        .join(", ")
}

#[async_trait]
impl<S, C> Step<ResearchState> for AnalyzeStep<S, C>
where
    S: SearchService + 'static,
    C: CompletionService + 'static,
{
    async fn run(&self, state: &ResearchState) -> ResearchUpdate {
        println!("🧠 Generating recommendations");

        let company_data = serialize_companies(&state.companies);
        debug!(companies = state.companies.len(), "serialized company data");

        let messages = recommendations_messages(&state.query, &company_data);
        match self.context.llm.complete(&messages).await {
            Ok(analysis) => ResearchUpdate::analysis(analysis),
            Err(e) => {
                warn!(error = %e, "recommendation generation failed");
                ResearchUpdate::analysis(ANALYSIS_FAILED)
            }
        }
    }
}
