//! Central application state for the lineage browser.
//!
//! This module owns all mutable UI state: the current mode, which panel has focus,
//! the grouped lineages and their flattened tree rows, review flags, per-panel
//! scroll offsets and viewport heights, and panel width percentages. No rendering
//! lives here; the render module reads this state and the keybinding dispatcher
//! and event loop mutate it through the methods below.

use std::collections::{HashMap, HashSet};

use lineage_core::{LineageDocument, LineageGroup};
use ratatui::layout::Rect;
use ratatui::widgets::ListState;

use crate::compare::{self, Comparison};
use crate::loader::LoadResult;
use crate::theme::Theme;

/// Mode controlling which keybinding set is active.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Navigation mode (default).
    #[default]
    Normal,
    /// `z` was pressed; the next key picks a fold command.
    PendingFold,
    /// Full-screen help overlay is shown above all panels.
    HelpOverlay,
}

/// Which panel currently has keyboard focus.
///
/// Cycle order: `Tree` → `Compare` → `Details` → `Tree`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PanelFocus {
    /// Left panel: collapsible lineage tree.
    #[default]
    Tree,
    /// Centre panel: selected revision against its predecessor.
    Compare,
    /// Right panel: metadata of the selected revision.
    Details,
}

impl PanelFocus {
    /// Returns the panel that precedes `self` in the cycle (wraps around).
    pub fn prev(self) -> Self {
        match self {
            PanelFocus::Tree => PanelFocus::Details,
            PanelFocus::Compare => PanelFocus::Tree,
            PanelFocus::Details => PanelFocus::Compare,
        }
    }

    /// Returns the panel that follows `self` in the cycle (wraps around).
    pub fn next(self) -> Self {
        match self {
            PanelFocus::Tree => PanelFocus::Compare,
            PanelFocus::Compare => PanelFocus::Details,
            PanelFocus::Details => PanelFocus::Tree,
        }
    }
}

/// One visible row of the lineage tree.
///
/// Indices point into `AppState::groups`; `index` addresses the group's
/// `documents` for revisions and its `unplaced` list for unplaced rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeRow {
    Group(usize),
    Revision { group: usize, index: usize },
    Unplaced { group: usize, index: usize },
}

impl TreeRow {
    pub fn group(self) -> usize {
        match self {
            TreeRow::Group(group)
            | TreeRow::Revision { group, .. }
            | TreeRow::Unplaced { group, .. } => group,
        }
    }
}

/// What the tree selection points at, independent of row positions.
///
/// Captured before a regroup and resolved afterwards so the cursor survives
/// reloads and fold changes.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Anchor {
    Group(String),
    Document { lineage_id: String, id: String },
}

/// All mutable UI state passed through every render cycle.
pub struct AppState {
    pub mode: Mode,
    pub focus: PanelFocus,

    /// Site whose snapshot is shown.
    pub site_id: String,
    /// Grouped lineages in first-appearance order.
    pub groups: Vec<LineageGroup>,
    /// Flattened visible rows; rebuilt whenever groups or folds change.
    pub rows: Vec<TreeRow>,
    /// Selection into `rows`.
    pub tree_state: ListState,
    /// Ids of documents reviewed in the current session.
    pub reviewed: HashSet<String>,
    /// Flags saved since the last applied load. A load may have read the
    /// store before these writes landed, so they are laid over its result.
    review_overrides: HashMap<String, bool>,
    /// Number of documents in the last loaded snapshot.
    pub document_count: usize,
    /// True while a background load is in flight.
    pub loading: bool,
    /// Last load or write error, shown in the status bar until the next success.
    pub last_error: Option<String>,

    /// Cached comparison for the current selection.
    pub comparison: Comparison,
    compare_key: Option<(String, Option<String>)>,

    /// Vertical scroll offset for the compare panel.
    pub compare_scroll: usize,
    /// Vertical scroll offset for the details panel.
    pub details_scroll: u16,
    /// Vertical scroll offset for the help overlay.
    pub help_scroll: u16,

    /// Inner panel heights after borders, cached after each render for paging.
    pub tree_viewport_height: u16,
    pub compare_viewport_height: u16,
    pub details_viewport_height: u16,

    /// Width percentages for the three panels. Defaults: 30 / 45 / 25.
    pub left_pct: u16,
    pub center_pct: u16,
    pub right_pct: u16,

    /// Panel rects from the last render, used for click-to-focus.
    pub panel_rects: [Rect; 3],
}

impl AppState {
    /// Empty state for `site_id`, marked as loading.
    pub fn new(site_id: impl Into<String>) -> Self {
        Self {
            mode: Mode::default(),
            focus: PanelFocus::default(),
            site_id: site_id.into(),
            groups: Vec::new(),
            rows: Vec::new(),
            tree_state: ListState::default(),
            reviewed: HashSet::new(),
            review_overrides: HashMap::new(),
            document_count: 0,
            loading: true,
            last_error: None,
            comparison: Comparison::default(),
            compare_key: None,
            compare_scroll: 0,
            details_scroll: 0,
            help_scroll: 0,
            tree_viewport_height: 0,
            compare_viewport_height: 0,
            details_viewport_height: 0,
            left_pct: 30,
            center_pct: 45,
            right_pct: 25,
            panel_rects: [Rect::default(); 3],
        }
    }

    // -----------------------------------------------------------------------
    // Loading
    // -----------------------------------------------------------------------

    /// Replaces groups and review flags with a fresh load.
    ///
    /// Fold state is carried over by `lineage_id`, and the selection follows
    /// the same document (or group) when it still exists.
    pub fn apply_load(&mut self, result: LoadResult) {
        let folds: HashMap<String, bool> = self
            .groups
            .iter()
            .map(|g| (g.lineage_id.clone(), g.collapsed))
            .collect();
        let anchor = self.anchor();

        self.groups = result.groups;
        for group in &mut self.groups {
            if let Some(&collapsed) = folds.get(&group.lineage_id) {
                group.collapsed = collapsed;
            }
        }
        self.reviewed = result.reviewed;
        for (document_id, reviewed) in std::mem::take(&mut self.review_overrides) {
            self.apply_reviewed(document_id, reviewed);
        }
        self.document_count = result.document_count;
        self.loading = false;
        self.last_error = None;
        self.compare_key = None;

        self.rebuild_rows();
        if let Some(anchor) = anchor {
            self.restore(&anchor);
        }
    }

    /// Records a failed load; the previous groups stay on screen.
    pub fn apply_load_error(&mut self, message: String) {
        self.loading = false;
        self.last_error = Some(message);
    }

    /// Number of groups whose chain has a defect.
    pub fn defect_count(&self) -> usize {
        self.groups.iter().filter(|g| !g.is_complete()).count()
    }

    // -----------------------------------------------------------------------
    // Tree rows and selection
    // -----------------------------------------------------------------------

    /// Recomputes `rows` from `groups` and clamps the selection.
    pub fn rebuild_rows(&mut self) {
        self.rows.clear();
        for (gi, group) in self.groups.iter().enumerate() {
            self.rows.push(TreeRow::Group(gi));
            if group.collapsed {
                continue;
            }
            self.rows.extend(
                (0..group.documents.len()).map(|index| TreeRow::Revision { group: gi, index }),
            );
            self.rows.extend(
                (0..group.unplaced.len()).map(|index| TreeRow::Unplaced { group: gi, index }),
            );
        }
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        if self.rows.is_empty() {
            self.tree_state.select(None);
            return;
        }
        let last = self.rows.len() - 1;
        let selected = self.tree_state.selected().map_or(0, |i| i.min(last));
        self.tree_state.select(Some(selected));
    }

    /// The row under the cursor.
    pub fn selected_row(&self) -> Option<TreeRow> {
        self.tree_state
            .selected()
            .and_then(|i| self.rows.get(i).copied())
    }

    /// The group containing the cursor.
    pub fn selected_group(&self) -> Option<&LineageGroup> {
        self.selected_row().and_then(|row| self.groups.get(row.group()))
    }

    /// The document under the cursor and its predecessor on the chain.
    ///
    /// A group header stands for the group's current revision. Unplaced
    /// documents have no predecessor.
    pub fn selected_document(&self) -> Option<(&LineageDocument, Option<&LineageDocument>)> {
        match self.selected_row()? {
            TreeRow::Group(gi) => {
                let group = self.groups.get(gi)?;
                let index = group.documents.len().checked_sub(1)?;
                Some((&group.documents[index], group.predecessor_of(index)))
            }
            TreeRow::Revision { group, index } => {
                let group = self.groups.get(group)?;
                Some((group.documents.get(index)?, group.predecessor_of(index)))
            }
            TreeRow::Unplaced { group, index } => {
                Some((self.groups.get(group)?.unplaced.get(index)?, None))
            }
        }
    }

    /// Id of the document under the cursor, if the cursor is on one.
    pub fn selected_document_id(&self) -> Option<String> {
        self.selected_document().map(|(doc, _)| doc.id.clone())
    }

    fn anchor(&self) -> Option<Anchor> {
        let row = self.selected_row()?;
        let group = self.groups.get(row.group())?;
        let doc = match row {
            TreeRow::Group(_) => None,
            TreeRow::Revision { index, .. } => group.documents.get(index),
            TreeRow::Unplaced { index, .. } => group.unplaced.get(index),
        };
        Some(match doc {
            Some(doc) => Anchor::Document {
                lineage_id: group.lineage_id.clone(),
                id: doc.id.clone(),
            },
            None => Anchor::Group(group.lineage_id.clone()),
        })
    }

    /// Moves the cursor to `anchor`, falling back to its group header when the
    /// document is hidden or gone. Leaves the cursor alone if the group is gone.
    fn restore(&mut self, anchor: &Anchor) {
        let (lineage_id, id) = match anchor {
            Anchor::Group(lineage_id) => (lineage_id, None),
            Anchor::Document { lineage_id, id } => (lineage_id, Some(id)),
        };
        let Some(gi) = self.groups.iter().position(|g| &g.lineage_id == lineage_id) else {
            return;
        };
        let group = &self.groups[gi];
        let target = id
            .and_then(|id| {
                group
                    .documents
                    .iter()
                    .position(|d| &d.id == id)
                    .map(|index| TreeRow::Revision { group: gi, index })
                    .or_else(|| {
                        group
                            .unplaced
                            .iter()
                            .position(|d| &d.id == id)
                            .map(|index| TreeRow::Unplaced { group: gi, index })
                    })
            })
            .and_then(|row| self.row_position(row))
            .or_else(|| self.row_position(TreeRow::Group(gi)));
        if let Some(pos) = target {
            self.tree_state.select(Some(pos));
        }
    }

    fn row_position(&self, row: TreeRow) -> Option<usize> {
        self.rows.iter().position(|r| *r == row)
    }

    /// Moves the tree cursor by `delta` rows, clamped to the visible rows.
    pub fn move_selection(&mut self, delta: isize) {
        if self.rows.is_empty() {
            self.tree_state.select(None);
            return;
        }
        let last = self.rows.len() as isize - 1;
        let current = self.tree_state.selected().unwrap_or(0) as isize;
        self.tree_state
            .select(Some((current + delta).clamp(0, last) as usize));
    }

    /// Selects the row shown `offset` lines below the top of the tree viewport.
    pub fn select_visible_row(&mut self, offset: usize) {
        let pos = self.tree_state.offset() + offset;
        if pos < self.rows.len() {
            self.tree_state.select(Some(pos));
        }
    }

    // -----------------------------------------------------------------------
    // Folding
    // -----------------------------------------------------------------------

    /// Flips the fold of the group under the cursor, leaving the cursor on
    /// its header.
    pub fn toggle_collapse(&mut self) {
        if let Some(group) = self.selected_row().map(TreeRow::group) {
            let collapsed = self.groups[group].collapsed;
            self.set_group_collapsed(group, !collapsed);
        }
    }

    /// Folds (`true`) or unfolds (`false`) the group under the cursor.
    pub fn set_selected_collapsed(&mut self, collapsed: bool) {
        if let Some(group) = self.selected_row().map(TreeRow::group) {
            self.set_group_collapsed(group, collapsed);
        }
    }

    fn set_group_collapsed(&mut self, group: usize, collapsed: bool) {
        self.groups[group].collapsed = collapsed;
        self.rebuild_rows();
        if let Some(pos) = self.row_position(TreeRow::Group(group)) {
            self.tree_state.select(Some(pos));
        }
    }

    /// Folds or unfolds every group, keeping the cursor on its group.
    pub fn set_all_collapsed(&mut self, collapsed: bool) {
        let anchor = self.anchor();
        for group in &mut self.groups {
            group.collapsed = collapsed;
        }
        self.rebuild_rows();
        if let Some(anchor) = anchor {
            self.restore(&anchor);
        }
    }

    // -----------------------------------------------------------------------
    // Revision navigation
    // -----------------------------------------------------------------------

    /// Steps to the next-newer revision within the selected chain.
    ///
    /// From a group header, steps onto the oldest revision.
    pub fn next_revision(&mut self) {
        let target = match self.selected_row() {
            Some(TreeRow::Group(group)) => TreeRow::Revision { group, index: 0 },
            Some(TreeRow::Revision { group, index }) => TreeRow::Revision { group, index: index + 1 },
            _ => return,
        };
        if let Some(pos) = self.row_position(target) {
            self.tree_state.select(Some(pos));
        }
    }

    /// Steps to the next-older revision within the selected chain.
    pub fn prev_revision(&mut self) {
        let Some(TreeRow::Revision { group, index }) = self.selected_row() else {
            return;
        };
        let Some(index) = index.checked_sub(1) else {
            return;
        };
        if let Some(pos) = self.row_position(TreeRow::Revision { group, index }) {
            self.tree_state.select(Some(pos));
        }
    }

    // -----------------------------------------------------------------------
    // Review flags
    // -----------------------------------------------------------------------

    pub fn is_reviewed(&self, document_id: &str) -> bool {
        self.reviewed.contains(document_id)
    }

    /// Records the reviewed flag returned by the store.
    ///
    /// The flag also survives the next `apply_load`, whose snapshot may
    /// predate the write.
    pub fn set_reviewed(&mut self, document_id: String, reviewed: bool) {
        self.review_overrides.insert(document_id.clone(), reviewed);
        self.apply_reviewed(document_id, reviewed);
    }

    fn apply_reviewed(&mut self, document_id: String, reviewed: bool) {
        if reviewed {
            self.reviewed.insert(document_id);
        } else {
            self.reviewed.remove(&document_id);
        }
    }

    /// Number of chain revisions in `group` marked reviewed.
    pub fn reviewed_in(&self, group: &LineageGroup) -> usize {
        group
            .documents
            .iter()
            .filter(|d| self.reviewed.contains(&d.id))
            .count()
    }

    // -----------------------------------------------------------------------
    // Compare cache
    // -----------------------------------------------------------------------

    /// Recomputes the comparison when the selected pair of revisions changed.
    ///
    /// Called from the render path; a changed pair resets the compare scroll.
    pub fn refresh_comparison(&mut self, theme: &Theme) {
        let key = self
            .selected_document()
            .map(|(doc, prev)| (doc.id.clone(), prev.map(|p| p.id.clone())));
        if key == self.compare_key {
            return;
        }
        self.comparison = match self.selected_document() {
            Some((doc, prev)) => compare::compare(prev, doc, theme),
            None => Comparison::default(),
        };
        self.compare_key = key;
        self.compare_scroll = 0;
        self.details_scroll = 0;
    }

    // -----------------------------------------------------------------------
    // Scrolling
    // -----------------------------------------------------------------------

    /// Scrolls the focused panel down by `lines` rows.
    pub fn scroll_down(&mut self, lines: u16) {
        match self.focus {
            PanelFocus::Tree => self.move_selection(lines as isize),
            PanelFocus::Compare => {
                let last = self.comparison.lines.len().saturating_sub(1);
                self.compare_scroll = self.compare_scroll.saturating_add(lines as usize).min(last);
            }
            PanelFocus::Details => {
                self.details_scroll = self.details_scroll.saturating_add(lines);
            }
        }
    }

    /// Scrolls the focused panel up by `lines` rows.
    pub fn scroll_up(&mut self, lines: u16) {
        match self.focus {
            PanelFocus::Tree => self.move_selection(-(lines as isize)),
            PanelFocus::Compare => {
                self.compare_scroll = self.compare_scroll.saturating_sub(lines as usize);
            }
            PanelFocus::Details => {
                self.details_scroll = self.details_scroll.saturating_sub(lines);
            }
        }
    }

    /// Scrolls the focused panel to the very top.
    pub fn scroll_top(&mut self) {
        match self.focus {
            PanelFocus::Tree => {
                if !self.rows.is_empty() {
                    self.tree_state.select(Some(0));
                }
            }
            PanelFocus::Compare => self.compare_scroll = 0,
            PanelFocus::Details => self.details_scroll = 0,
        }
    }

    /// Scrolls the focused panel to the very bottom.
    pub fn scroll_bottom(&mut self) {
        match self.focus {
            PanelFocus::Tree => {
                if let Some(last) = self.rows.len().checked_sub(1) {
                    self.tree_state.select(Some(last));
                }
            }
            PanelFocus::Compare => {
                self.compare_scroll = self.comparison.lines.len().saturating_sub(1);
            }
            PanelFocus::Details => self.details_scroll = u16::MAX,
        }
    }

    fn focused_viewport_height(&self) -> u16 {
        match self.focus {
            PanelFocus::Tree => self.tree_viewport_height,
            PanelFocus::Compare => self.compare_viewport_height,
            PanelFocus::Details => self.details_viewport_height,
        }
    }

    /// Scrolls the focused panel down by half its visible height.
    ///
    /// A zero cached height (first frame) scrolls by 1.
    pub fn half_page_down(&mut self) {
        self.scroll_down((self.focused_viewport_height() / 2).max(1));
    }

    /// Scrolls the focused panel up by half its visible height.
    pub fn half_page_up(&mut self) {
        self.scroll_up((self.focused_viewport_height() / 2).max(1));
    }

    /// Scrolls the focused panel down by its full visible height.
    pub fn full_page_down(&mut self) {
        self.scroll_down(self.focused_viewport_height().max(1));
    }

    /// Scrolls the focused panel up by its full visible height.
    pub fn full_page_up(&mut self) {
        self.scroll_up(self.focused_viewport_height().max(1));
    }

    // -----------------------------------------------------------------------
    // Panel geometry
    // -----------------------------------------------------------------------

    /// Shrinks the compare (centre) panel by 5%, split across the side panels.
    ///
    /// The centre panel will not shrink below 20%.
    pub fn shrink_compare_panel(&mut self) {
        const MIN_CENTER: u16 = 20;
        const STEP: u16 = 5;
        if self.center_pct <= MIN_CENTER {
            return;
        }
        let transfer = STEP.min(self.center_pct - MIN_CENTER);
        self.center_pct -= transfer;
        let left_gain = transfer / 2;
        self.left_pct += left_gain;
        self.right_pct += transfer - left_gain;
    }

    /// Grows the compare (centre) panel by up to 5%, taken from the side panels.
    ///
    /// The centre panel will not grow above 80%; side panels keep at least 5%.
    pub fn grow_compare_panel(&mut self) {
        const MAX_CENTER: u16 = 80;
        const MIN_SIDE: u16 = 5;
        const STEP: u16 = 5;
        if self.center_pct >= MAX_CENTER {
            return;
        }
        let transfer = STEP.min(MAX_CENTER - self.center_pct);
        let left_give = (transfer / 2).min(self.left_pct.saturating_sub(MIN_SIDE));
        let right_give = (transfer - transfer / 2).min(self.right_pct.saturating_sub(MIN_SIDE));
        self.left_pct -= left_give;
        self.right_pct -= right_give;
        self.center_pct += left_give + right_give;
    }
}
