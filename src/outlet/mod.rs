//! 调研结果的输出：控制台文本与 Markdown 报告

use anyhow::{Context, Result};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::research::{CompanyRecord, ResearchState};

const TECH_STACK_SHOWN: usize = 5;
const LANGUAGES_SHOWN: usize = 5;
const INTEGRATIONS_SHOWN: usize = 4;

fn yes_no(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "Yes",
        Some(false) => "No",
        None => "Unknown",
    }
}

fn api_status(available: bool) -> &'static str {
    if available {
        "✅ Available"
    } else {
        "❌ Not Available"
    }
}

fn head(items: &[String], n: usize) -> String {
    items.iter().take(n).cloned().collect::<Vec<_>>().join(", ")
}

/// 控制台输出的单条记录，只打印有值的字段
fn write_company(out: &mut String, index: usize, company: &CompanyRecord) {
    out.push_str(&format!("\n{}. 🏢 {}\n", index, company.name));
    out.push_str(&format!(
        "   🌐 Website: {}\n",
        company.website.as_deref().unwrap_or("Unknown")
    ));
    out.push_str(&format!(
        "   💰 Pricing: {}\n",
        company.pricing_model.as_deref().unwrap_or("Unknown")
    ));
    out.push_str(&format!(
        "   📖 Open Source: {}\n",
        yes_no(company.is_open_source)
    ));

    if !company.tech_stack.is_empty() {
        out.push_str(&format!(
            "   🛠️  Tech Stack: {}\n",
            head(&company.tech_stack, TECH_STACK_SHOWN)
        ));
    }
    if !company.language_support.is_empty() {
        out.push_str(&format!(
            "   💻 Language Support: {}\n",
            head(&company.language_support, LANGUAGES_SHOWN)
        ));
    }
    if let Some(available) = company.api_available {
        out.push_str(&format!("   🔌 API: {}\n", api_status(available)));
    }
    if !company.integration_capabilities.is_empty() {
        out.push_str(&format!(
            "   🔗 Integrations: {}\n",
            head(&company.integration_capabilities, INTEGRATIONS_SHOWN)
        ));
    }
    if !company.description.is_empty() && !company.analysis_failed() {
        out.push_str(&format!("   📝 Description: {}\n", company.description));
    }
}

/// 渲染控制台输出
pub fn render_console(state: &ResearchState) -> String {
    let mut out = String::new();
    out.push_str(&format!("\n📝 Results for: {}\n", state.query));
    out.push_str(&"*".repeat(60));
    out.push('\n');

    if state.companies.is_empty() {
        out.push_str("⚠️ No companies found for this query.\n");
        return out;
    }

    for (i, company) in state.companies.iter().enumerate() {
        write_company(&mut out, i + 1, company);
    }

    if let Some(analysis) = &state.analysis {
        out.push_str("\nDeveloper Recommendation:\n");
        out.push_str(&"-".repeat(40));
        out.push('\n');
        out.push_str(analysis);
        out.push('\n');
    }

    out
}

/// 渲染 Markdown 报告
pub fn render_markdown(state: &ResearchState) -> String {
    let mut out = String::new();
    out.push_str(&format!("# Developer tools: {}\n\n", state.query));
    out.push_str(&format!(
        "_Generated at {}_\n\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));

    if state.companies.is_empty() {
        out.push_str("No companies found for this query.\n");
        return out;
    }

    out.push_str("## Tools\n");
    for (i, company) in state.companies.iter().enumerate() {
        out.push_str(&format!("\n### {}. {}\n\n", i + 1, company.name));
        if let Some(website) = &company.website {
            out.push_str(&format!("- **Website**: <{}>\n", website));
        }
        out.push_str(&format!(
            "- **Pricing**: {}\n",
            company.pricing_model.as_deref().unwrap_or("Unknown")
        ));
        out.push_str(&format!(
            "- **Open source**: {}\n",
            yes_no(company.is_open_source)
        ));
        if !company.tech_stack.is_empty() {
            out.push_str(&format!(
                "- **Tech stack**: {}\n",
                company.tech_stack.join(", ")
            ));
        }
        if !company.language_support.is_empty() {
            out.push_str(&format!(
                "- **Languages**: {}\n",
                company.language_support.join(", ")
            ));
        }
        if let Some(available) = company.api_available {
            out.push_str(&format!(
                "- **API**: {}\n",
                if available { "Yes" } else { "No" }
            ));
        }
        if !company.integration_capabilities.is_empty() {
            out.push_str(&format!(
                "- **Integrations**: {}\n",
                company.integration_capabilities.join(", ")
            ));
        }
        if !company.description.is_empty() && !company.analysis_failed() {
            out.push_str(&format!("\n{}\n", company.description));
        }
    }

    if let Some(analysis) = &state.analysis {
        out.push_str(&format!("\n## Recommendation\n\n{}\n", analysis));
    }

    out
}

/// 由查询生成文件名：小写字母数字，其余字符折叠为 `-`
fn report_file_name(query: &str) -> String {
    let mut slug = String::new();
    for c in query.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "report.md".to_string()
    } else {
        format!("{}.md", slug)
    }
}

/// 把 Markdown 报告写入 `output_dir`，返回文件路径
pub fn save_markdown(state: &ResearchState, output_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;

    let path = output_dir.join(report_file_name(&state.query));
    fs::write(&path, render_markdown(state))
        .with_context(|| format!("Failed to write report: {}", path.display()))?;

    Ok(path)
}
