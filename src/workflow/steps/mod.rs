//! 工作流的三个步骤：提取工具 → 逐个调研 → 生成推荐

mod analyze;
mod extract;
mod research;

pub use analyze::AnalyzeStep;
pub use extract::{ExtractToolsStep, parse_tool_names};
pub use research::ResearchStep;

/// 步骤名称
pub const EXTRACT_TOOLS: &str = "extract_tools";
pub const RESEARCH: &str = "research";
pub const ANALYZE: &str = "analyze";
