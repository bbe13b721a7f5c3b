//! Details panel renderer: metadata of the selected revision.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Paragraph, Wrap},
};

use crate::app::{AppState, PanelFocus};
use crate::compare::document_fields;
use crate::theme::Theme;
use crate::ui::layout::{inner_rect, panel_block};

/// Renders the right panel.
///
/// Lists the selected document's fields, its review flag, and, for the
/// selected group, chain length and any defect.
pub fn render_details(
    frame: &mut Frame,
    area: Rect,
    focus: PanelFocus,
    state: &AppState,
    theme: &Theme,
) {
    let is_focused = focus == PanelFocus::Details;
    let block = panel_block("Details", is_focused, theme);
    let inner = inner_rect(area);
    frame.render_widget(block, area);

    let label_style = Style::default()
        .fg(theme.detail_label)
        .add_modifier(Modifier::BOLD);
    let field = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{label}: "), label_style),
            Span::raw(value),
        ])
    };

    let mut lines = Vec::new();
    if let Some((doc, _)) = state.selected_document() {
        lines.extend(
            document_fields(doc)
                .into_iter()
                .map(|(label, value)| field(label, value)),
        );
        let reviewed = if state.is_reviewed(&doc.id) { "yes" } else { "no" };
        lines.push(field("reviewed", reviewed.to_owned()));
    }

    if let Some(group) = state.selected_group() {
        if !lines.is_empty() {
            lines.push(Line::raw(""));
        }
        lines.push(field("revisions", group.documents.len().to_string()));
        if !group.unplaced.is_empty() {
            lines.push(field("unplaced", group.unplaced.len().to_string()));
        }
        if let Some(defect) = &group.defect {
            lines.push(Line::styled(
                defect.to_string(),
                Style::default().fg(theme.badge_defect),
            ));
        }
    }

    if lines.is_empty() {
        lines.push(Line::raw("Nothing selected"));
    }

    frame.render_widget(
        Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: false })
            .scroll((state.details_scroll, 0)),
        inner,
    );
}
