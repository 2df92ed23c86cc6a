//! Whole-document markdown formatting
//!
//! Normalizes a document so that block formulas segment cleanly: single-line
//! `$$...$$` formulas are expanded into fenced multi-line form, every bare
//! `$$` fence is separated from surrounding text by a blank line, and runs of
//! blank lines are collapsed.

use regex::Regex;
use std::sync::OnceLock;

/// Block formula fence.
pub const FORMULA_FENCE: &str = "$$";

fn inline_formula_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\$([^\$\n]+?)\$\$").expect("valid formula regex"))
}

fn blank_run_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{3,}").expect("valid blank-run regex"))
}

/// Format a markdown document.
///
/// Steps, in order:
/// 1. Normalize `\r\n` line endings
/// 2. Expand single-line `$$x$$` into `$$` / `x` / `$$` on their own lines
/// 3. Ensure a blank line before every opening and after every closing `$$`
/// 4. Collapse three or more consecutive newlines into two
/// 5. Trim surrounding whitespace
pub fn format_markdown(markdown: &str) -> String {
    let content = markdown.replace("\r\n", "\n");

    let content = inline_formula_re()
        .replace_all(&content, "\n\n$$$$\n$1\n$$$$\n\n")
        .into_owned();

    let content = pad_formula_fences(&content);

    let content = blank_run_re().replace_all(&content, "\n\n");

    content.trim().to_string()
}

/// Insert blank lines around bare `$$` fences.
fn pad_formula_fences(content: &str) -> String {
    let mut lines: Vec<&str> = content.lines().collect();
    let mut in_formula = false;
    let mut i = 0;

    while i < lines.len() {
        if lines[i].trim() == FORMULA_FENCE {
            if in_formula {
                if i + 1 < lines.len() && !lines[i + 1].trim().is_empty() {
                    lines.insert(i + 1, "");
                }
            } else if i > 0 && !lines[i - 1].trim().is_empty() {
                lines.insert(i, "");
                i += 1;
            }
            in_formula = !in_formula;
        }
        i += 1;
    }

    lines.join("\n")
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_expands_single_line_formula() {
        let formatted = format_markdown("Energy: $$E = mc^2$$ holds.");
        // surrounding spaces are kept; only blank lines are normalized
        assert_eq!(formatted, "Energy: \n\n$$\nE = mc^2\n$$\n\n holds.");
    }

    #[test]
    fn test_format_pads_fences_with_blank_lines() {
        let formatted = format_markdown("Intro\n$$\nx\n$$\nOutro");
        assert_eq!(formatted, "Intro\n\n$$\nx\n$$\n\nOutro");
    }

    #[test]
    fn test_format_leaves_padded_fences_alone() {
        let source = "Intro\n\n$$\nx\n$$\n\nOutro";
        assert_eq!(format_markdown(source), source);
    }

    #[test]
    fn test_format_collapses_blank_runs() {
        assert_eq!(format_markdown("a\n\n\n\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_format_normalizes_crlf_and_trims() {
        assert_eq!(format_markdown("\r\n# Title\r\n\r\nBody\r\n\r\n"), "# Title\n\nBody");
    }

    #[test]
    fn test_format_is_idempotent() {
        let once = format_markdown("A $$x$$ B\n$$\ny\n$$\nC\n\n\n\nD");
        assert_eq!(format_markdown(&once), once);
    }

    #[test]
    fn test_format_empty() {
        assert_eq!(format_markdown(""), "");
        assert_eq!(format_markdown("\n\n  \n"), "");
    }
}
