//! Lineage tree panel renderer.
//!
//! Renders `AppState.rows` as a collapsible tree: one header per lineage,
//! then its chain revisions oldest first, then any documents that could not
//! be placed on the chain. Headers carry a review tally and a defect badge.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem},
};

use lineage_core::{LineageDocument, LineageGroup};

use crate::app::{AppState, PanelFocus, TreeRow};
use crate::theme::Theme;
use crate::ui::layout::panel_block;

/// Renders the tree into the left panel.
///
/// Uses `render_stateful_widget` so the `ListState` keeps the selection in view.
pub fn render_lineage_tree(
    frame: &mut Frame,
    area: Rect,
    focus: PanelFocus,
    state: &mut AppState,
    theme: &Theme,
) {
    let is_focused = focus == PanelFocus::Tree;
    let title = if state.groups.is_empty() {
        "Lineages".to_owned()
    } else {
        format!("Lineages ({})", state.groups.len())
    };
    let block = panel_block(&title, is_focused, theme);

    let items: Vec<ListItem> = if state.rows.is_empty() {
        let msg = if state.loading { "Loading..." } else { "No documents" };
        vec![ListItem::new(Line::raw(msg))]
    } else {
        state
            .rows
            .iter()
            .map(|row| tree_item(*row, state, theme))
            .collect()
    };

    let list = List::new(items).block(block).highlight_style(
        Style::default()
            .bg(theme.selection)
            .add_modifier(Modifier::BOLD),
    );

    frame.render_stateful_widget(list, area, &mut state.tree_state);
}

fn tree_item(row: TreeRow, state: &AppState, theme: &Theme) -> ListItem<'static> {
    let group = &state.groups[row.group()];
    match row {
        TreeRow::Group(_) => group_item(group, state, theme),
        TreeRow::Revision { index, .. } => {
            let last = index + 1 == group.documents.len() && group.unplaced.is_empty();
            let branch = if last { "  └ " } else { "  ├ " };
            document_item(&group.documents[index], branch, theme.tree_document, state, theme)
        }
        TreeRow::Unplaced { index, .. } => {
            document_item(&group.unplaced[index], "  ? ", theme.tree_unplaced, state, theme)
        }
    }
}

/// `▾ lineage-id  3 rev  2/3 ✓  [dangling]`
fn group_item(group: &LineageGroup, state: &AppState, theme: &Theme) -> ListItem<'static> {
    let arrow = if group.collapsed { "▸ " } else { "▾ " };
    let mut spans = vec![
        Span::styled(
            format!("{arrow}{}", group.lineage_id),
            Style::default().fg(theme.tree_group).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {} rev  {}/{} ✓", group.documents.len(), state.reviewed_in(group), group.documents.len()),
            Style::default().fg(theme.diff_context),
        ),
    ];
    if let Some(defect) = &group.defect {
        spans.push(Span::styled(
            format!("  [{}]", defect.label()),
            Style::default().fg(theme.badge_defect),
        ));
    }
    ListItem::new(Line::from(spans))
}

/// `  ├ [x] name ●`
fn document_item(
    doc: &LineageDocument,
    branch: &'static str,
    color: ratatui::style::Color,
    state: &AppState,
    theme: &Theme,
) -> ListItem<'static> {
    let mark = if state.is_reviewed(&doc.id) {
        Span::styled("[x] ", Style::default().fg(theme.badge_reviewed))
    } else {
        Span::styled("[ ] ", Style::default().fg(theme.badge_unreviewed))
    };
    let mut spans = vec![
        Span::styled(branch, Style::default().fg(theme.border_inactive)),
        mark,
        Span::styled(doc.display_name().to_owned(), Style::default().fg(color)),
    ];
    if doc.is_current_version {
        spans.push(Span::styled(" ●", Style::default().fg(theme.badge_current)));
    }
    ListItem::new(Line::from(spans))
}
