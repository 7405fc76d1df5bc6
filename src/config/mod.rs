use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// 默认配置文件名，位于当前工作目录
pub const DEFAULT_CONFIG_FILE: &str = "toolscout.toml";

/// LLM Provider类型
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub enum LLMProvider {
    /// OpenAI 以及所有兼容 chat completions 协议的服务（Groq 等）
    #[serde(rename = "openai")]
    #[default]
    OpenAI,
    #[serde(rename = "deepseek")]
    DeepSeek,
    #[serde(rename = "openrouter")]
    OpenRouter,
    #[serde(rename = "anthropic")]
    Anthropic,
    #[serde(rename = "ollama")]
    Ollama,
}

impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMProvider::OpenAI => write!(f, "openai"),
            LLMProvider::DeepSeek => write!(f, "deepseek"),
            LLMProvider::OpenRouter => write!(f, "openrouter"),
            LLMProvider::Anthropic => write!(f, "anthropic"),
            LLMProvider::Ollama => write!(f, "ollama"),
        }
    }
}

impl LLMProvider {
    /// 未配置 `api_base_url` 时使用的服务地址
    pub fn default_base_url(&self) -> &'static str {
        match self {
            LLMProvider::OpenAI => "https://api.groq.com/openai/v1",
            LLMProvider::DeepSeek => "https://api.deepseek.com",
            LLMProvider::OpenRouter => "https://openrouter.ai/api/v1",
            LLMProvider::Anthropic => "https://api.anthropic.com",
            LLMProvider::Ollama => "http://localhost:11434",
        }
    }
}

impl std::str::FromStr for LLMProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" | "groq" => Ok(LLMProvider::OpenAI),
            "deepseek" => Ok(LLMProvider::DeepSeek),
            "openrouter" => Ok(LLMProvider::OpenRouter),
            "anthropic" => Ok(LLMProvider::Anthropic),
            "ollama" => Ok(LLMProvider::Ollama),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

/// 应用程序配置
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    /// LLM模型配置
    pub llm: LLMConfig,

    /// Firecrawl 搜索/抓取服务配置
    pub firecrawl: FirecrawlConfig,

    /// 调研流程的规模限制
    pub research: ResearchConfig,

    /// Markdown 报告输出路径，未设置时只输出到终端
    pub output_path: Option<PathBuf>,

    /// 是否启用详细日志
    pub verbose: bool,
}

/// LLM模型配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LLMConfig {
    /// LLM Provider类型
    pub provider: LLMProvider,

    /// LLM API KEY
    pub api_key: String,

    /// LLM API基地址，未设置时随 provider 取默认值
    pub api_base_url: Option<String>,

    /// 模型名称
    pub model: String,

    /// 最大tokens
    pub max_tokens: u32,

    /// 温度
    pub temperature: f64,

    /// 重试次数
    pub retry_attempts: u32,

    /// 重试间隔（毫秒）
    pub retry_delay_ms: u64,

    /// 调研阶段同时分析的工具数，1 表示严格串行
    pub max_parallels: usize,
}

/// Firecrawl 配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct FirecrawlConfig {
    pub api_key: String,

    pub api_base_url: String,

    /// 单次请求超时（秒）
    pub timeout_seconds: u64,
}

/// 调研流程的规模限制
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ResearchConfig {
    /// 提取阶段搜索的文章数
    pub article_results: usize,

    /// 每篇文章截取的最大字符数
    pub article_excerpt_chars: usize,

    /// 调研阶段最多处理的工具数
    pub max_tools: usize,

    /// 没有提取到工具时直接搜索的结果数
    pub fallback_results: usize,

    /// 查找官网时的搜索结果数
    pub official_site_results: usize,
}

impl Config {
    /// 从文件加载配置
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut file =
            File::open(path).context(format!("Failed to open config file: {:?}", path))?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// 加载配置：显式路径优先，其次是当前目录下的默认文件，否则使用默认值
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        let default_path = std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            Self::from_file(&default_path)
        } else {
            Ok(Self::default())
        }
    }

    /// 检查外部服务的凭证，缺失时立即失败
    pub fn validate(&self) -> Result<()> {
        if self.firecrawl.api_key.trim().is_empty() {
            bail!("Missing FIRECRAWL_API_KEY: set it in the environment or under [firecrawl] in the config file");
        }
        if self.llm.provider != LLMProvider::Ollama && self.llm.api_key.trim().is_empty() {
            bail!(
                "Missing API key for LLM provider `{}`: set TOOLSCOUT_LLM_API_KEY or api_key under [llm]",
                self.llm.provider
            );
        }
        if self.research.max_tools == 0 {
            bail!("research.max_tools must be at least 1");
        }
        Ok(())
    }
}

impl LLMConfig {
    /// 实际使用的 API 基地址
    pub fn base_url(&self) -> &str {
        self.api_base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url())
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::default(),
            api_key: std::env::var("TOOLSCOUT_LLM_API_KEY")
                .or_else(|_| std::env::var("GROQ_API_KEY"))
                .unwrap_or_default(),
            api_base_url: None,
            model: String::from("llama-3.1-8b-instant"),
            max_tokens: 4096,
            temperature: 0.9,
            retry_attempts: 3,
            retry_delay_ms: 2000,
            max_parallels: 1,
        }
    }
}

impl Default for FirecrawlConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("FIRECRAWL_API_KEY").unwrap_or_default(),
            api_base_url: String::from("https://api.firecrawl.dev"),
            timeout_seconds: 60,
        }
    }
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            article_results: 3,
            article_excerpt_chars: 1500,
            max_tools: 4,
            fallback_results: 3,
            official_site_results: 1,
        }
    }
}
