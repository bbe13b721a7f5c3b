//! Compare panel renderer.
//!
//! Renders the cached `AppState.comparison` with manual virtual scrolling:
//! only `lines[compare_scroll..compare_scroll + viewport_height]` become list
//! items each frame, so long document texts stay cheap to draw.

use ratatui::{
    Frame,
    layout::Rect,
    text::Line,
    widgets::{List, ListItem},
};

use crate::app::{AppState, PanelFocus};
use crate::theme::Theme;
use crate::ui::layout::{inner_rect, panel_block};

/// Renders the compare centre panel.
///
/// The title carries the change counts of the current pair, e.g. `Compare +2 -1`.
pub fn render_compare(
    frame: &mut Frame,
    area: Rect,
    focus: PanelFocus,
    state: &AppState,
    theme: &Theme,
) {
    let is_focused = focus == PanelFocus::Compare;
    let cmp = &state.comparison;
    let title = if cmp.added + cmp.removed > 0 {
        format!("Compare +{} -{}", cmp.added, cmp.removed)
    } else {
        "Compare".to_owned()
    };
    let block = panel_block(&title, is_focused, theme);
    let inner = inner_rect(area);
    let viewport_height = inner.height as usize;

    frame.render_widget(block, area);

    if cmp.lines.is_empty() {
        let msg = if state.loading {
            "Loading..."
        } else {
            "Select a revision to compare."
        };
        frame.render_widget(List::new(vec![ListItem::new(Line::raw(msg))]), inner);
        return;
    }

    let total = cmp.lines.len();
    let visible_start = state.compare_scroll.min(total.saturating_sub(1));
    let visible_end = (visible_start + viewport_height).min(total);

    let items: Vec<ListItem> = cmp.lines[visible_start..visible_end]
        .iter()
        .map(|l| ListItem::new(l.clone()))
        .collect();

    frame.render_widget(List::new(items), inner);
}
