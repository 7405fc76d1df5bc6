/// 按字符数截断，不会切断多字节字符
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// 根据工具名猜测官网地址
pub fn guess_website(tool_name: &str) -> String {
    let slug: String = tool_name
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    format!("https://www.{}.com", slug)
}
