//! Revision compare: renders one document against its predecessor.
//!
//! Both revisions are flattened to `label: value` lines followed by their
//! extracted text, then line-diffed with `similar`. Changed lines carry
//! word-level emphasis so a single edited field value stands out.

use lineage_core::LineageDocument;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use similar::{ChangeTag, TextDiff};

use crate::theme::Theme;

/// Lines for the compare panel plus change counts for its title.
#[derive(Debug, Default)]
pub struct Comparison {
    pub lines: Vec<Line<'static>>,
    pub added: usize,
    pub removed: usize,
}

/// Formats a Unix timestamp as a UTC date and time.
pub fn format_timestamp(secs: i64) -> String {
    chrono::DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| secs.to_string())
}

/// Labelled metadata of `doc`, in display order. Absent values are skipped.
pub fn document_fields(doc: &LineageDocument) -> Vec<(&'static str, String)> {
    let mut fields = vec![("id", doc.id.clone()), ("lineage", doc.lineage_id.clone())];
    let optional = [
        ("name", doc.name.clone()),
        ("type", doc.document_type.clone()),
        ("url", doc.url.clone()),
        ("checksum", doc.checksum.clone()),
        ("first collected", doc.first_collected_at.map(format_timestamp)),
        ("last collected", doc.last_collected_at.map(format_timestamp)),
        ("previous", doc.previous_id.clone()),
    ];
    fields.extend(optional.into_iter().filter_map(|(k, v)| v.map(|v| (k, v))));
    if doc.is_current_version {
        fields.push(("version", "current".to_owned()));
    }
    fields
}

/// Flattens `doc` into the newline-terminated text that gets diffed.
///
/// `id` and `previous` are left out: they always differ between adjacent
/// revisions and would drown the real changes.
fn document_text(doc: &LineageDocument) -> String {
    let mut out = String::new();
    for (label, value) in document_fields(doc) {
        if matches!(label, "id" | "previous" | "version") {
            continue;
        }
        out.push_str(label);
        out.push_str(": ");
        out.push_str(&value);
        out.push('\n');
    }
    if let Some(text) = doc.text.as_deref() {
        out.push('\n');
        out.push_str(text);
        if !text.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

/// Compares `newer` with `older`, or lists `newer` alone when it has no predecessor.
pub fn compare(older: Option<&LineageDocument>, newer: &LineageDocument, theme: &Theme) -> Comparison {
    let header_style = Style::default().fg(theme.diff_header).add_modifier(Modifier::BOLD);
    let new_text = document_text(newer);

    let Some(older) = older else {
        let mut lines = vec![Line::from(Span::styled(
            format!("── {} (no predecessor) ──", newer.id),
            header_style,
        ))];
        lines.extend(new_text.lines().map(|l| {
            Line::from(Span::styled(
                format!("  {l}"),
                Style::default().fg(theme.diff_context),
            ))
        }));
        return Comparison { lines, added: 0, removed: 0 };
    };

    let old_text = document_text(older);
    let diff = TextDiff::from_lines(&old_text, &new_text);

    let mut out = Comparison {
        lines: vec![Line::from(Span::styled(
            format!("── {} → {} ──", older.id, newer.id),
            header_style,
        ))],
        ..Comparison::default()
    };

    for op in diff.ops() {
        for change in diff.iter_inline_changes(op) {
            let (prefix, color) = match change.tag() {
                ChangeTag::Delete => {
                    out.removed += 1;
                    ("- ", theme.diff_removed)
                }
                ChangeTag::Insert => {
                    out.added += 1;
                    ("+ ", theme.diff_added)
                }
                ChangeTag::Equal => ("  ", theme.diff_context),
            };
            let base = Style::default().fg(color);
            let mut spans = vec![Span::styled(prefix, base)];
            for (emphasized, value) in change.iter_strings_lossy() {
                let text = value.trim_end_matches('\n').to_owned();
                let style = if emphasized {
                    base.add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
                } else {
                    base
                };
                spans.push(Span::styled(text, style));
            }
            out.lines.push(Line::from(spans));
        }
    }

    if out.added == 0 && out.removed == 0 {
        out.lines.push(Line::from(Span::styled(
            "  (no content changes)",
            Style::default().fg(theme.diff_context),
        )));
    }

    out
}
