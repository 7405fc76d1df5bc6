//! 各步骤使用的提示词模板

use crate::llm::ChatMessage;

/// Prompt模板配置
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// 系统提示词
    pub system_prompt: &'static str,
    /// 开头的说明性指令
    pub opening_instruction: &'static str,
    /// 结尾的强调性指令
    pub closing_instruction: &'static str,
}

impl PromptTemplate {
    /// 组装 system + user 两条消息，`sections` 按顺序以二级标题插入到用户提示词中
    pub fn build_messages(&self, sections: &[(&str, &str)]) -> Vec<ChatMessage> {
        let mut prompt = String::new();
        prompt.push_str(self.opening_instruction);
        prompt.push_str("\n\n");

        for (title, body) in sections {
            prompt.push_str(&format!("## {}\n{}\n\n", title, body));
        }

        prompt.push_str(self.closing_instruction);

        vec![
            ChatMessage::system(self.system_prompt),
            ChatMessage::user(prompt),
        ]
    }
}

pub const TOOL_EXTRACTION: PromptTemplate = PromptTemplate {
    system_prompt: "You are a technology researcher. Extract specific tool, library, platform, \
or service names from articles. Focus on actual products and services developers can use, \
not general concepts or features.",
    opening_instruction: "Extract the developer tools mentioned in the articles below.",
    closing_instruction: "Return only the tool names, one per line, with no descriptions, no \
numbering and no introduction. List at most 5 of the most relevant tools.",
};

pub const TOOL_ANALYSIS: PromptTemplate = PromptTemplate {
    system_prompt: "You are analyzing developer tools and programming technologies. Focus on \
what matters to developers: pricing model, whether the tool is open source, its technology \
stack, API availability, supported programming languages and integrations.",
    opening_instruction: "Analyze this developer tool from a developer's perspective.",
    closing_instruction: "Use Free, Freemium, Paid, Enterprise or Unknown for the pricing \
model. Describe the tool in one sentence. Leave a yes/no attribute empty when the content \
does not say.",
};

pub const RECOMMENDATIONS: PromptTemplate = PromptTemplate {
    system_prompt: "You are a senior software engineer giving quick, concise technology \
recommendations. Keep responses brief and actionable: at most 3-4 sentences in total.",
    opening_instruction: "Recommend the best option for the developer query below, based on \
the researched tools.",
    closing_instruction: "Say which tool to choose and why, the key cost consideration, and \
the main technical advantage.",
};

pub fn tool_extraction_messages(query: &str, content: &str) -> Vec<ChatMessage> {
    TOOL_EXTRACTION.build_messages(&[("Query", query), ("Article content", content)])
}

pub fn tool_analysis_messages(tool_name: &str, content: &str) -> Vec<ChatMessage> {
    TOOL_ANALYSIS.build_messages(&[("Tool", tool_name), ("Website content", content)])
}

pub fn recommendations_messages(query: &str, company_data: &str) -> Vec<ChatMessage> {
    RECOMMENDATIONS.build_messages(&[("Developer query", query), ("Researched tools", company_data)])
}
