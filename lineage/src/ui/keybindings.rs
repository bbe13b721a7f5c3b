//! Keybinding dispatcher for the lineage browser.
//!
//! Translates raw crossterm `KeyEvent`s into `AppState` mutations and returns a
//! `KeyAction` telling the event loop what else to do. The dispatcher branches
//! first on `state.mode` so that HelpOverlay, PendingFold, and Normal each have
//! isolated handler functions.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Position;

use crate::app::{AppState, Mode, PanelFocus};

/// Control-flow signal returned from the key dispatcher.
///
/// `Reload` and `ToggleReviewed` need the database, which the dispatcher does
/// not own; the event loop performs them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    /// Continue the event loop normally.
    Continue,
    /// Exit cleanly.
    Quit,
    /// Re-read the site snapshot and regroup.
    Reload,
    /// Flip the reviewed flag of the document with this id.
    ToggleReviewed(String),
}

/// Dispatches a key event to the handler matching the current mode.
pub fn handle_key(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match state.mode {
        Mode::HelpOverlay => handle_help(key, state),
        Mode::PendingFold => handle_fold(key, state),
        Mode::Normal => handle_normal(key, state),
    }
}

// ---------------------------------------------------------------------------
// Normal mode
// ---------------------------------------------------------------------------

/// Handles a key event while in Normal mode.
///
/// Scroll keys go to `handle_scroll_key` and tree-only keys to
/// `handle_tree_key`; focus, resize, revision stepping, and mode transitions
/// are handled inline.
fn handle_normal(key: KeyEvent, state: &mut AppState) -> KeyAction {
    if let Some(action) = handle_scroll_key(key, state) {
        return action;
    }
    if let Some(action) = handle_tree_key(key, state) {
        return action;
    }

    match key.code {
        KeyCode::Char('H') => {
            state.focus = state.focus.prev();
            KeyAction::Continue
        }
        KeyCode::Char('L') => {
            state.focus = state.focus.next();
            KeyAction::Continue
        }

        // Revision stepping works from any panel; the tree cursor moves.
        KeyCode::Char('[') => { state.prev_revision(); KeyAction::Continue }
        KeyCode::Char(']') => { state.next_revision(); KeyAction::Continue }

        KeyCode::Char('<') => { state.shrink_compare_panel(); KeyAction::Continue }
        KeyCode::Char('>') => { state.grow_compare_panel(); KeyAction::Continue }

        KeyCode::Char('z') => {
            state.mode = Mode::PendingFold;
            KeyAction::Continue
        }

        KeyCode::Char('r') => match state.selected_document_id() {
            Some(id) => KeyAction::ToggleReviewed(id),
            None => KeyAction::Continue,
        },
        KeyCode::Char('R') => KeyAction::Reload,

        KeyCode::Char('?') => {
            state.help_scroll = 0;
            state.mode = Mode::HelpOverlay;
            KeyAction::Continue
        }

        KeyCode::Char('q') | KeyCode::Esc => KeyAction::Quit,

        _ => KeyAction::Continue,
    }
}

/// Handles keys that only apply while the tree has focus: Space folds,
/// Enter opens the selection in the compare panel.
///
/// Returns `None` when the key should fall through to the Normal handler.
fn handle_tree_key(key: KeyEvent, state: &mut AppState) -> Option<KeyAction> {
    if state.focus != PanelFocus::Tree {
        return None;
    }
    match key.code {
        KeyCode::Char(' ') => {
            state.toggle_collapse();
            Some(KeyAction::Continue)
        }
        KeyCode::Enter | KeyCode::Char('l') => {
            if state.selected_document().is_some() {
                state.focus = PanelFocus::Compare;
            }
            Some(KeyAction::Continue)
        }
        _ => None,
    }
}

/// Handles scroll-related keys in Normal mode: j / k / g / G and Ctrl combos.
///
/// Returns `Some(KeyAction)` when the key was consumed, `None` when the key
/// should fall through to the rest of the Normal handler.
fn handle_scroll_key(key: KeyEvent, state: &mut AppState) -> Option<KeyAction> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('j') | KeyCode::Down => state.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => state.scroll_up(1),
        KeyCode::Char('g') | KeyCode::Home => state.scroll_top(),
        KeyCode::Char('G') | KeyCode::End => state.scroll_bottom(),
        KeyCode::Char('d') if ctrl => state.half_page_down(),
        KeyCode::Char('u') if ctrl => state.half_page_up(),
        KeyCode::Char('f') if ctrl => state.full_page_down(),
        KeyCode::PageDown => state.full_page_down(),
        KeyCode::Char('b') if ctrl => state.full_page_up(),
        KeyCode::PageUp => state.full_page_up(),
        _ => return None,
    }
    Some(KeyAction::Continue)
}

// ---------------------------------------------------------------------------
// PendingFold mode
// ---------------------------------------------------------------------------

/// Completes a `z` fold command. Any key returns to Normal mode; unknown
/// second keys are dropped.
fn handle_fold(key: KeyEvent, state: &mut AppState) -> KeyAction {
    state.mode = Mode::Normal;
    match key.code {
        KeyCode::Char('a') => state.toggle_collapse(),
        KeyCode::Char('o') => state.set_selected_collapsed(false),
        KeyCode::Char('c') => state.set_selected_collapsed(true),
        KeyCode::Char('M') => state.set_all_collapsed(true),
        KeyCode::Char('R') => state.set_all_collapsed(false),
        _ => {}
    }
    KeyAction::Continue
}

// ---------------------------------------------------------------------------
// HelpOverlay mode
// ---------------------------------------------------------------------------

/// Handles a key event while the help overlay is visible.
///
/// `j`/`k`/`g`/`G` scroll the overlay; `?`, `Esc`, or `q` dismiss it.
fn handle_help(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            state.help_scroll = state.help_scroll.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.help_scroll = state.help_scroll.saturating_sub(1);
        }
        KeyCode::Char('g') => state.help_scroll = 0,
        KeyCode::Char('G') => state.help_scroll = u16::MAX,
        KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q') => state.mode = Mode::Normal,
        _ => {}
    }
    KeyAction::Continue
}

// ---------------------------------------------------------------------------
// Mouse events
// ---------------------------------------------------------------------------

/// Handles a mouse event: click-to-focus and scroll-wheel.
///
/// Scroll wheel moves the focused panel by 3 lines, or the help overlay
/// while it is shown.
pub fn handle_mouse(mouse: MouseEvent, state: &mut AppState) -> KeyAction {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => handle_mouse_click(mouse.column, mouse.row, state),
        MouseEventKind::ScrollUp => {
            if state.mode == Mode::HelpOverlay {
                state.help_scroll = state.help_scroll.saturating_sub(3);
            } else {
                state.scroll_up(3);
            }
        }
        MouseEventKind::ScrollDown => {
            if state.mode == Mode::HelpOverlay {
                state.help_scroll = state.help_scroll.saturating_add(3);
            } else {
                state.scroll_down(3);
            }
        }
        _ => {}
    }
    KeyAction::Continue
}

/// Focuses the clicked panel; a click inside the tree also selects the row
/// under the pointer.
///
/// Panels with zero width are skipped so collapsed panels cannot take focus.
fn handle_mouse_click(col: u16, row: u16, state: &mut AppState) {
    if state.mode != Mode::Normal {
        return;
    }
    let pos = Position { x: col, y: row };
    let [left, center, right] = state.panel_rects;

    if left.width > 0 && left.contains(pos) {
        state.focus = PanelFocus::Tree;
        // One border row above the list.
        if let Some(offset) = row.checked_sub(left.y + 1) {
            state.select_visible_row(offset as usize);
        }
    } else if center.contains(pos) {
        state.focus = PanelFocus::Compare;
    } else if right.width > 0 && right.contains(pos) {
        state.focus = PanelFocus::Details;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::TreeRow;
    use crate::loader::LoadResult;
    use lineage_core::{group_lineages, LineageDocument};
    use ratatui::layout::Rect;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn state() -> AppState {
        let docs = [
            LineageDocument::new("a1", "A", None, false),
            LineageDocument::new("a2", "A", Some("a1"), true),
            LineageDocument::new("b1", "B", None, true),
        ];
        let mut state = AppState::new("site");
        state.apply_load(LoadResult {
            groups: group_lineages(&docs),
            reviewed: Default::default(),
            document_count: docs.len(),
        });
        state
    }

    #[test]
    fn z_prefix_folds_all() {
        let mut state = state();

        handle_key(press(KeyCode::Char('z')), &mut state);
        assert_eq!(state.mode, Mode::PendingFold);
        handle_key(press(KeyCode::Char('M')), &mut state);

        assert_eq!(state.mode, Mode::Normal);
        assert!(state.groups.iter().all(|g| g.collapsed));
    }

    #[test]
    fn space_toggles_fold_only_in_tree() {
        let mut state = state();
        state.focus = PanelFocus::Compare;
        handle_key(press(KeyCode::Char(' ')), &mut state);
        assert!(!state.groups[0].collapsed);

        state.focus = PanelFocus::Tree;
        handle_key(press(KeyCode::Char(' ')), &mut state);
        assert!(state.groups[0].collapsed);
    }

    #[test]
    fn r_requests_review_toggle_for_selection() {
        let mut state = state();
        handle_key(press(KeyCode::Char('j')), &mut state);

        let action = handle_key(press(KeyCode::Char('r')), &mut state);

        assert_eq!(action, KeyAction::ToggleReviewed("a1".to_owned()));
        assert_eq!(handle_key(press(KeyCode::Char('R')), &mut state), KeyAction::Reload);
    }

    #[test]
    fn enter_focuses_compare() {
        let mut state = state();
        handle_key(press(KeyCode::Enter), &mut state);
        assert_eq!(state.focus, PanelFocus::Compare);
    }

    #[test]
    fn help_overlay_swallows_quit() {
        let mut state = state();
        handle_key(press(KeyCode::Char('?')), &mut state);

        assert_eq!(handle_key(press(KeyCode::Char('q')), &mut state), KeyAction::Continue);
        assert_eq!(state.mode, Mode::Normal);
        assert_eq!(handle_key(press(KeyCode::Char('q')), &mut state), KeyAction::Quit);
    }

    #[test]
    fn click_in_tree_selects_row() {
        let mut state = state();
        state.focus = PanelFocus::Details;
        state.panel_rects = [
            Rect::new(0, 0, 30, 20),
            Rect::new(30, 0, 45, 20),
            Rect::new(75, 0, 25, 20),
        ];

        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 4,
            row: 4,
            modifiers: KeyModifiers::NONE,
        };
        handle_mouse(click, &mut state);

        assert_eq!(state.focus, PanelFocus::Tree);
        assert_eq!(state.selected_row(), Some(TreeRow::Group(1)));
    }
}
