use crate::config::{Config, LLMProvider};
use anyhow::{Result, anyhow};
use clap::Parser;
use std::path::PathBuf;

/// toolscout - 开发者工具调研助手
#[derive(Parser, Debug)]
#[command(name = "toolscout")]
#[command(
    about = "Researches developer tools for a query: finds candidate tools in comparison articles, analyzes each tool's official site, and recommends one."
)]
#[command(version)]
pub struct Args {
    /// 要调研的查询，不指定时进入交互模式
    #[arg(short, long)]
    pub query: Option<String>,

    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Markdown 报告输出目录
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 是否启用详细日志
    #[arg(short, long)]
    pub verbose: bool,

    /// LLM Provider (openai, groq, deepseek, openrouter, anthropic, ollama)
    #[arg(long)]
    pub llm_provider: Option<String>,

    /// LLM API KEY
    #[arg(long)]
    pub llm_api_key: Option<String>,

    /// LLM API基地址
    #[arg(long)]
    pub llm_api_base_url: Option<String>,

    /// 模型名称
    #[arg(long)]
    pub model: Option<String>,

    /// 温度参数
    #[arg(long)]
    pub temperature: Option<f64>,

    /// 最大tokens数
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// 同时调研的工具数
    #[arg(long)]
    pub max_parallels: Option<usize>,

    /// 每次最多调研的工具数
    #[arg(long)]
    pub max_tools: Option<usize>,

    /// Firecrawl API KEY
    #[arg(long)]
    pub firecrawl_api_key: Option<String>,
}

impl Args {
    /// 将CLI参数转换为配置，命令行参数覆盖配置文件
    pub fn into_config(self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;

        if let Some(provider_str) = self.llm_provider {
            config.llm.provider = provider_str
                .parse::<LLMProvider>()
                .map_err(|e| anyhow!(e))?;
        }
        if let Some(llm_api_key) = self.llm_api_key {
            config.llm.api_key = llm_api_key;
        }
        if let Some(llm_api_base_url) = self.llm_api_base_url {
            config.llm.api_base_url = Some(llm_api_base_url);
        }
        if let Some(model) = self.model {
            config.llm.model = model;
        }
        if let Some(temperature) = self.temperature {
            config.llm.temperature = temperature;
        }
        if let Some(max_tokens) = self.max_tokens {
            config.llm.max_tokens = max_tokens;
        }
        if let Some(max_parallels) = self.max_parallels {
            config.llm.max_parallels = max_parallels;
        }
        if let Some(max_tools) = self.max_tools {
            config.research.max_tools = max_tools;
        }
        if let Some(firecrawl_api_key) = self.firecrawl_api_key {
            config.firecrawl.api_key = firecrawl_api_key;
        }
        if self.output.is_some() {
            config.output_path = self.output;
        }
        // 配置文件里打开的 verbose 不会被关闭
        config.verbose |= self.verbose;

        Ok(config)
    }
}
