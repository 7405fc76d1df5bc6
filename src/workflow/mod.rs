//! 开发者工具调研工作流：extract_tools → research → analyze → END

use anyhow::{Context, Result};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{Instrument, error, info, info_span};
use uuid::Uuid;

use crate::config::{Config, ResearchConfig};
use crate::graph::{END, StateGraph, TimingScope};
use crate::llm::{CompletionService, LLMClient};
use crate::outlet;
use crate::types::research::ResearchState;
use crate::web::{FirecrawlClient, SearchService};

pub mod context;
pub mod prompts;
pub mod steps;

use context::ResearchContext;
use steps::{ANALYZE, AnalyzeStep, EXTRACT_TOOLS, ExtractToolsStep, RESEARCH, ResearchStep};

/// 交互模式下结束循环的输入
const QUIT_COMMANDS: [&str; 2] = ["quit", "exit"];

/// 已经接好线的调研工作流
pub struct Workflow {
    graph: StateGraph<ResearchState>,
}

impl Workflow {
    /// 使用 Firecrawl 与配置中的 LLM 创建工作流，缺少凭据时直接失败
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let search = FirecrawlClient::new(&config.firecrawl)
            .context("Failed to create Firecrawl client")?;
        let llm = LLMClient::new(&config.llm).context("Failed to create LLM client")?;
        Self::with_services(
            Arc::new(search),
            Arc::new(llm),
            config.research.clone(),
            config.llm.max_parallels,
        )
    }

    /// 注入任意的搜索与补全实现
    pub fn with_services<S, C>(
        search: Arc<S>,
        llm: Arc<C>,
        limits: ResearchConfig,
        max_parallels: usize,
    ) -> Result<Self>
    where
        S: SearchService + 'static,
        C: CompletionService + 'static,
    {
        let context = ResearchContext::new(search, llm, limits, max_parallels);

        let mut graph = StateGraph::new();
        graph
            .add_step(EXTRACT_TOOLS, ExtractToolsStep::new(context.clone()))?
            .add_step(RESEARCH, ResearchStep::new(context.clone()))?
            .add_step(ANALYZE, AnalyzeStep::new(context))?;
        graph
            .set_entry_point(EXTRACT_TOOLS)
            .connect(EXTRACT_TOOLS, RESEARCH)
            .connect(RESEARCH, ANALYZE)
            .connect(ANALYZE, END);

        // 接线错误在构造时就暴露出来
        graph.execution_order()?;

        Ok(Self { graph })
    }

    /// 调研一个查询，总是返回一个状态
    pub async fn run(&self, query: impl Into<String>) -> ResearchState {
        let (state, _timing) = self.run_with_timing(query).await;
        state
    }

    /// 与 [`Workflow::run`] 相同，额外返回各步骤耗时
    pub async fn run_with_timing(&self, query: impl Into<String>) -> (ResearchState, TimingScope) {
        let initial = ResearchState::new(query);
        let span = info_span!("research_run", run_id = %Uuid::new_v4(), query = %initial.query);

        async move {
            info!("research started");
            match self.graph.run_timed(initial.clone()).await {
                Ok((state, timing)) => {
                    info!(
                        companies = state.companies.len(),
                        elapsed_ms = timing.total_duration().as_millis() as u64,
                        "research finished"
                    );
                    (state, timing)
                }
                Err(e) => {
                    error!(error = %e, "workflow graph is invalid");
                    (initial, TimingScope::new())
                }
            }
        }
        .instrument(span)
        .await
    }
}

async fn research_and_report(workflow: &Workflow, config: &Config, query: &str) -> Result<()> {
    let (state, timing) = workflow.run_with_timing(query).await;

    println!("{}", outlet::render_console(&state));

    if let Some(output_dir) = &config.output_path {
        let path = outlet::save_markdown(&state, output_dir)?;
        println!("📄 Report saved to {}", path.display());
    }

    if config.verbose {
        println!("{}", timing.generate_timing_report());
    }

    Ok(())
}

/// 启动调研：给定查询时执行一次，否则进入交互循环
pub async fn launch(config: &Config, query: Option<String>) -> Result<()> {
    config.validate()?;

    let llm = LLMClient::new(&config.llm).context("Failed to create LLM client")?;
    // 启动时检查模型连接
    llm.check_connection().await?;

    let search =
        FirecrawlClient::new(&config.firecrawl).context("Failed to create Firecrawl client")?;
    let workflow = Workflow::with_services(
        Arc::new(search),
        Arc::new(llm),
        config.research.clone(),
        config.llm.max_parallels,
    )?;

    if let Some(query) = query {
        return research_and_report(&workflow, config, &query).await;
    }

    println!("🔧 Developer Tools Research Agent");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("\n🔍 Developer Tools Query: ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let query = line.trim();

        if QUIT_COMMANDS.contains(&query.to_lowercase().as_str()) {
            break;
        }
        if query.is_empty() {
            continue;
        }

        research_and_report(&workflow, config, query).await?;
    }

    println!("👋 Goodbye!");
    Ok(())
}

#[cfg(test)]
mod testing;
