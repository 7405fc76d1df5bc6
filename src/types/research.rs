use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

use crate::graph::GraphState;

/// 结构化分析失败时使用的占位描述
pub const ANALYSIS_FAILED: &str = "Analysis failed";

/// 结构化分析失败时使用的定价模型
pub const UNKNOWN_PRICING: &str = "Unknown";

/// `null` 与缺省都反序列化为空列表
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// 搜索结果
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct SearchResult {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// 搜索时顺带抓取的页面内容
    #[serde(default)]
    pub markdown: Option<String>,
}

/// 抓取到的页面内容
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ScrapedPage {
    /// markdown 格式的正文
    pub content: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// LLM 针对单个开发者工具给出的结构化分析
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct CompanyAnalysis {
    /// Pricing model of the tool, e.g. Free, Freemium, Paid, Enterprise or Unknown
    pub pricing_model: String,
    /// Whether the tool is open source; null when unknown
    #[serde(default)]
    pub is_open_source: Option<bool>,
    /// Technologies, languages and frameworks the tool is built on or supports
    #[serde(default, deserialize_with = "null_as_empty")]
    #[schemars(with = "Vec<String>")]
    pub tech_stack: Vec<String>,
    /// One sentence describing what the tool does for developers
    #[serde(default)]
    pub description: String,
    /// Whether the tool offers a REST or GraphQL API or SDK; null when unknown
    #[serde(default)]
    pub api_available: Option<bool>,
    /// Programming languages explicitly supported
    #[serde(default, deserialize_with = "null_as_empty")]
    #[schemars(with = "Vec<String>")]
    pub language_support: Vec<String>,
    /// Tools and platforms it integrates with, e.g. GitHub, VS Code, Docker
    #[serde(default, deserialize_with = "null_as_empty")]
    #[schemars(with = "Vec<String>")]
    pub integration_capabilities: Vec<String>,
}

impl CompanyAnalysis {
    /// 结构化分析失败时的哨兵记录
    pub fn failed() -> Self {
        Self {
            pricing_model: UNKNOWN_PRICING.to_string(),
            is_open_source: None,
            tech_stack: vec![],
            description: ANALYSIS_FAILED.to_string(),
            api_available: None,
            language_support: vec![],
            integration_capabilities: vec![],
        }
    }
}

/// 一个被调研的工具/公司
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct CompanyRecord {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub pricing_model: Option<String>,
    #[serde(default)]
    pub is_open_source: Option<bool>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tech_stack: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub competitors: Vec<String>,
    #[serde(default)]
    pub api_available: Option<bool>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub language_support: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub integration_capabilities: Vec<String>,
    #[serde(default)]
    pub developer_experience_rating: Option<String>,
}

impl CompanyRecord {
    /// 以抓取内容作为占位描述创建记录
    pub fn new(name: impl Into<String>, website: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: content.into(),
            website: Some(website.into()),
            ..Default::default()
        }
    }

    /// 用分析结果整体覆盖分析相关字段
    pub fn apply_analysis(&mut self, analysis: CompanyAnalysis) {
        self.pricing_model = Some(analysis.pricing_model);
        self.is_open_source = analysis.is_open_source;
        self.tech_stack = analysis.tech_stack;
        self.description = analysis.description;
        self.api_available = analysis.api_available;
        self.language_support = analysis.language_support;
        self.integration_capabilities = analysis.integration_capabilities;
    }

    pub fn analysis_failed(&self) -> bool {
        self.description == ANALYSIS_FAILED
    }
}

/// 在工作流中流转的调研状态
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ResearchState {
    pub query: String,
    #[serde(default)]
    pub extracted_tools: Vec<String>,
    #[serde(default)]
    pub companies: Vec<CompanyRecord>,
    #[serde(default)]
    pub search_results: Vec<SearchResult>,
    #[serde(default)]
    pub analysis: Option<String>,
}

impl ResearchState {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }
}

/// 步骤返回的部分更新，`None` 表示字段不变。没有 `query`，查询在构造后不可修改
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResearchUpdate {
    pub extracted_tools: Option<Vec<String>>,
    pub companies: Option<Vec<CompanyRecord>>,
    pub search_results: Option<Vec<SearchResult>>,
    pub analysis: Option<String>,
}

impl ResearchUpdate {
    pub fn extracted_tools(tools: Vec<String>) -> Self {
        Self {
            extracted_tools: Some(tools),
            ..Default::default()
        }
    }

    pub fn companies(companies: Vec<CompanyRecord>) -> Self {
        Self {
            companies: Some(companies),
            ..Default::default()
        }
    }

    pub fn analysis(analysis: impl Into<String>) -> Self {
        Self {
            analysis: Some(analysis.into()),
            ..Default::default()
        }
    }

    pub fn with_search_results(mut self, results: Vec<SearchResult>) -> Self {
        self.search_results = Some(results);
        self
    }
}

impl GraphState for ResearchState {
    type Update = ResearchUpdate;

    fn apply(&mut self, update: ResearchUpdate) {
        if let Some(tools) = update.extracted_tools {
            self.extracted_tools = tools;
        }
        if let Some(companies) = update.companies {
            self.companies = companies;
        }
        if let Some(results) = update.search_results {
            self.search_results = results;
        }
        if let Some(analysis) = update.analysis {
            self.analysis = Some(analysis);
        }
    }
}
