use crossterm::style::Stylize;
use similar::{ChangeTag, TextDiff};

use super::output::colors;

/// Unified diff of `old` → `new` with old/new line number columns
pub fn render_unified_diff(path: &str, old: &str, new: &str, supports_color: bool) -> String {
    let diff = TextDiff::from_lines(old, new);
    let old_lines = old.lines().count().max(1);
    let new_lines = new.lines().count().max(1);
    let width = old_lines.max(new_lines).to_string().len();

    let mut out = String::new();

    let header_a = format!("--- a/{}", path);
    let header_b = format!("+++ b/{}", path);
    out.push_str(&color_line(&header_a, ChangeTag::Equal, supports_color, LineStyle::Header));
    out.push('\n');
    out.push_str(&color_line(&header_b, ChangeTag::Equal, supports_color, LineStyle::Header));
    out.push('\n');

    for change in diff.iter_all_changes() {
        let (old_no, new_no, sign) = match change.tag() {
            ChangeTag::Delete => (change.old_index().map(|i| i + 1), None, "-"),
            ChangeTag::Insert => (None, change.new_index().map(|i| i + 1), "+"),
            ChangeTag::Equal => (
                change.old_index().map(|i| i + 1),
                change.new_index().map(|i| i + 1),
                " ",
            ),
        };

        let old_col = old_no
            .map(|n| format!("{:>width$}", n, width = width))
            .unwrap_or_else(|| " ".repeat(width));
        let new_col = new_no
            .map(|n| format!("{:>width$}", n, width = width))
            .unwrap_or_else(|| " ".repeat(width));

        let value = change.value().trim_end_matches('\n');
        let line = format!("{old_col} {new_col} {sign} {value}");
        out.push_str(&color_line(&line, change.tag(), supports_color, LineStyle::Body));
        out.push('\n');
    }

    out
}

#[derive(Debug, Clone, Copy)]
enum LineStyle {
    Header,
    Body,
}

fn color_line(s: &str, tag: ChangeTag, supports_color: bool, style: LineStyle) -> String {
    if !supports_color {
        return s.to_string();
    }

    match style {
        LineStyle::Header => format!("{}", s.with(colors::INFO)),
        LineStyle::Body => match tag {
            ChangeTag::Delete => format!("{}", s.with(colors::ERROR)),
            ChangeTag::Insert => format!("{}", s.with(colors::SUCCESS)),
            ChangeTag::Equal => format!("{}", s.with(colors::DIM)),
        },
    }
}
