//! Small markdown text helpers.

/// Markdown heading line for `level` (clamped to 1..=6), without trailing newline.
///
/// ```
/// # use core_ltx::rule_gen::text_utils::heading;
/// assert_eq!(heading(2, "Main Pages"), "## Main Pages");
/// assert_eq!(heading(9, "Deep"), "###### Deep");
/// ```
pub fn heading(level: usize, text: &str) -> String {
    format!("{} {}", "#".repeat(level.clamp(1, 6)), single_line(text))
}

/// Collapses all whitespace (including newlines) to single spaces.
pub fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Escapes the brackets that would end a markdown link label early.
pub fn escape_link_text(text: &str) -> String {
    single_line(text).replace('[', "\\[").replace(']', "\\]")
}

/// Prefixes every line with `> `.
pub fn blockquote(text: &str) -> String {
    text.lines()
        .map(|l| if l.trim().is_empty() { ">".to_string() } else { format!("> {}", l.trim_end()) })
        .collect::<Vec<_>>()
        .join("\n")
}
