//! Responsive 3-panel layout for the lineage browser.
//!
//! Pure layout arithmetic, recomputed inside `terminal.draw()` every frame so
//! it always tracks the live terminal size.
//!
//! At `>= 120` columns all three panels are visible with widths driven by
//! `AppState.left_pct / center_pct / right_pct`. Between 80 and 119 columns
//! the details panel collapses. Below 80 columns only the focused side of
//! the tree/compare pair is shown.
//!
//! `Spacing::Overlap(1)` with `MergeStrategy::Fuzzy` lets adjacent borders
//! share a column.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Margin, Rect, Spacing},
    style::{Modifier, Style},
    symbols::merge::MergeStrategy,
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph},
};

use crate::app::{AppState, Mode, PanelFocus};
use crate::theme::Theme;

/// Returns `[left, center, right, status_bar]` panel `Rect`s for the current frame.
///
/// Collapsed panels come back with zero width and are skipped by the renderer.
pub fn compute_layout(frame: &Frame, state: &AppState) -> [Rect; 4] {
    let term_width = frame.area().width;

    let [main_area, status_bar] =
        frame.area().layout(&Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]));

    let constraints = if term_width >= 120 {
        [
            Constraint::Percentage(state.left_pct),
            Constraint::Percentage(state.center_pct),
            Constraint::Percentage(state.right_pct),
        ]
    } else if term_width >= 80 {
        [
            Constraint::Percentage(state.left_pct + state.right_pct / 2),
            Constraint::Fill(1),
            Constraint::Length(0),
        ]
    } else if state.focus == PanelFocus::Tree {
        [Constraint::Fill(1), Constraint::Length(0), Constraint::Length(0)]
    } else {
        [Constraint::Length(0), Constraint::Fill(1), Constraint::Length(0)]
    };

    let horizontal = Layout::horizontal(constraints).spacing(Spacing::Overlap(1));
    let [left, center, right] = main_area.layout(&horizontal);

    [left, center, right, status_bar]
}

/// Returns the inner `Rect` of a panel after removing the 1-cell border on each side.
///
/// Used to cache viewport heights in `AppState` for paging.
pub fn inner_rect(area: Rect) -> Rect {
    area.inner(Margin { vertical: 1, horizontal: 1 })
}

/// Builds a bordered `Block` for a panel.
///
/// Focused panels get a thick border in `border_active`. `Fuzzy` merging is
/// needed because `Exact` mis-draws junctions between thick and plain borders.
pub fn panel_block<'a>(title: &'a str, is_focused: bool, theme: &'a Theme) -> Block<'a> {
    let border_style = if is_focused {
        Style::default().fg(theme.border_active)
    } else {
        Style::default().fg(theme.border_inactive)
    };
    let border_type = if is_focused { BorderType::Thick } else { BorderType::Plain };

    Block::bordered()
        .title(title)
        .border_type(border_type)
        .border_style(border_style)
        .merge_borders(MergeStrategy::Fuzzy)
}

/// Renders the 1-row status bar at the bottom of the terminal.
///
/// Shows the mode, site, group and document counts, the defect count, and the
/// last error when there is one.
pub fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let mode_text = match state.mode {
        Mode::Normal => " NORMAL ",
        Mode::PendingFold => " FOLD z- ",
        Mode::HelpOverlay => " HELP ",
    };
    let mut spans = vec![
        Span::styled(
            mode_text,
            Style::default().fg(theme.status_mode).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" site {} ", state.site_id)),
    ];

    if state.loading {
        spans.push(Span::raw("│ loading… "));
    } else {
        spans.push(Span::raw(format!(
            "│ {} lineages, {} documents ",
            state.groups.len(),
            state.document_count
        )));
        let defects = state.defect_count();
        if defects > 0 {
            spans.push(Span::styled(
                format!("│ {defects} defective "),
                Style::default().fg(theme.badge_defect),
            ));
        }
    }

    if let Some(err) = &state.last_error {
        spans.push(Span::styled(
            format!("│ error: {err} "),
            Style::default().fg(theme.status_error),
        ));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans))
            .style(Style::default().bg(theme.status_bar_bg).fg(theme.status_bar_fg)),
        area,
    );
}
