use regex::Regex;
use std::sync::OnceLock;

fn reasoning_block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)<thinking>.*?</thinking>|<think>.*?</think>|<reasoning>.*?</reasoning>")
            .expect("valid reasoning regex")
    })
}

fn blank_lines_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n\s*\n(\s*\n)+").expect("valid blank lines regex"))
}

/// Trimmed user input, or `None` when nothing but whitespace was typed.
pub fn normalize_user_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Strips model reasoning blocks and runs of blank lines from a reply.
pub fn clean_reply_text(text: &str) -> String {
    let out = reasoning_block_re().replace_all(text, "");
    let out = blank_lines_re().replace_all(&out, "\n\n");
    out.trim().to_string()
}

/// Truncates on a char boundary for log previews.
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut out: String = text.chars().take(max_chars).collect();
    if text.chars().count() > max_chars {
        out.push_str("...");
    }
    out.replace('\n', " ")
}
