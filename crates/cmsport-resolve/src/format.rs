//! Text normalization applied to rich text after substitution.

use std::sync::OnceLock;

use regex::Regex;

fn empty_paragraph() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)<p>\s+</p>\n").expect("valid empty paragraph pattern"))
}

/// Drop paragraphs that hold only whitespace, with their trailing newline.
pub fn strip_empty_paragraphs(text: &str) -> String {
    empty_paragraph().replace_all(text, "").into_owned()
}
