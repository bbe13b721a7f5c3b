//! UI rendering for the lineage browser.
//!
//! `render()` is the single entry point called by the event loop's
//! `terminal.draw()` closure. Layout arithmetic lives in `layout.rs`; each
//! panel has its own module.

mod layout;
pub mod compare_view;
pub mod details;
pub mod help;
pub mod keybindings;
pub mod lineage_tree;

use ratatui::Frame;

use crate::app::{AppState, Mode};
use crate::theme::Theme;
use layout::{compute_layout, inner_rect, render_status_bar};

/// Renders one complete frame: tree, compare, details, status bar, and the
/// help overlay when active.
///
/// Viewport heights and panel rects are written back into `state` so the
/// next keypress can page and hit-test against what is on screen. The
/// comparison is refreshed here, so it is recomputed at most once per frame.
pub fn render(frame: &mut Frame, state: &mut AppState, theme: &Theme) {
    let [left, center, right, status_bar] = compute_layout(frame, state);

    state.tree_viewport_height = inner_rect(left).height;
    state.compare_viewport_height = inner_rect(center).height;
    state.details_viewport_height = inner_rect(right).height;
    state.panel_rects = [left, center, right];

    state.refresh_comparison(theme);

    let focus = state.focus;

    if left.width > 0 {
        lineage_tree::render_lineage_tree(frame, left, focus, state, theme);
    }
    if center.width > 0 {
        compare_view::render_compare(frame, center, focus, state, theme);
    }
    if right.width > 0 {
        details::render_details(frame, right, focus, state, theme);
    }

    render_status_bar(frame, status_bar, state, theme);

    if state.mode == Mode::HelpOverlay {
        help::render_help_overlay(frame, theme, state.help_scroll);
    }
}
