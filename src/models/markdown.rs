//! Markdown / LaTeX 解题内容的文本处理

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::models::problem::{ProblemDetail, TagType};

macro_rules! cached_regex {
    ($name:ident, $pattern:expr) => {
        fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| Regex::new($pattern).expect("内置正则表达式无效"))
        }
    };
}

cached_regex!(blank_line_run, r"\n\n+");
cached_regex!(code_fence, r"```[\s\S]*?```");
cached_regex!(fence_open, r"^```[^\n]*\n?");
cached_regex!(horizontal_rule, r"(?m)^\s*---+\s*$");
cached_regex!(heading, r"(?m)^(#{1,6})\s+");
cached_regex!(bullet, r"(?m)^\s*[-*]\s+");
cached_regex!(ordered, r"(?m)^\s*(\d+)\.\s+");
cached_regex!(bold_star, r"\*\*(.+?)\*\*");
cached_regex!(bold_underscore, r"__(.+?)__");
cached_regex!(italic_star, r"\*(.+?)\*");
cached_regex!(italic_underscore, r"_(.+?)_");
cached_regex!(inline_math, r"\\\(([\s\S]*?)\\\)");
cached_regex!(block_math, r"\\\[([\s\S]*?)\\\]");
cached_regex!(latex_text, r"\\text\{([\s\S]*?)\}");
cached_regex!(latex_frac, r"\\frac\{([^{}]+)\}\{([^{}]+)\}");
cached_regex!(excess_newlines, r"\n{3,}");

/// 按空行切分解题步骤，去掉空段；没有任何段落时整体作为一步
pub fn split_solution_steps(markdown: &str) -> Vec<String> {
    let steps: Vec<String> = blank_line_run()
        .split(markdown)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if steps.is_empty() {
        vec![markdown.to_string()]
    } else {
        steps
    }
}

/// 去掉 Markdown 语法，并把常见 LaTeX 写法转成可读文本
pub fn markdown_to_plain_text(md: &str) -> String {
    let text = md.replace("\r\n", "\n");
    let text = code_fence().replace_all(&text, |caps: &Captures| {
        let block = &caps[0];
        let stripped = fence_open().replace(block, "");
        let stripped: &str = &stripped;
        let body = stripped.strip_suffix("```").unwrap_or(stripped).trim_end();
        let indented: Vec<String> = body
            .split('\n')
            .map(|l| if l.is_empty() { String::new() } else { format!("    {}", l) })
            .collect();
        format!("\n{}\n", indented.join("\n"))
    });
    let text = horizontal_rule().replace_all(&text, "");
    let text = heading().replace_all(&text, "");
    let text = bullet().replace_all(&text, "• ");
    let text = ordered().replace_all(&text, "${1}) ");
    let text = bold_star().replace_all(&text, "$1");
    let text = bold_underscore().replace_all(&text, "$1");
    let text = italic_star().replace_all(&text, "$1");
    let text = italic_underscore().replace_all(&text, "$1");
    let text = inline_math().replace_all(&text, "$1");
    let text = block_math().replace_all(&text, "\n$1\n");
    let text = latex_text().replace_all(&text, "$1");
    let text = latex_frac().replace_all(&text, "($1/$2)");
    let text = excess_newlines().replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// 生成“复制”操作的文本：题目、标签行、纯文本解答
pub fn build_copy_text(detail: &ProblemDetail) -> String {
    let knowledge: Vec<&str> = detail
        .history
        .tags_of(TagType::Knowledge)
        .map(|t| t.name.as_str())
        .filter(|n| !n.is_empty())
        .collect();
    let contexts: Vec<&str> = detail
        .history
        .tags_of(TagType::Context)
        .map(|t| t.name.as_str())
        .filter(|n| !n.is_empty())
        .collect();

    let mut tag_lines = Vec::new();
    if !knowledge.is_empty() {
        tag_lines.push(format!("知识点：{}", knowledge.join("、")));
    }
    if !contexts.is_empty() {
        tag_lines.push(format!("语义情境：{}", contexts.join("、")));
    }
    let tag_block = if tag_lines.is_empty() {
        String::new()
    } else {
        format!("{}\n\n", tag_lines.join("\n"))
    };

    let source = if detail.solution_markdown.is_empty() {
        detail.solution_steps.join("\n\n")
    } else {
        detail.solution_markdown.clone()
    };
    format!(
        "{}\n\n{}{}",
        detail.history.question,
        tag_block,
        markdown_to_plain_text(&source)
    )
}
