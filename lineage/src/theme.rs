//! Color theme system for the lineage browser.
//!
//! A `Theme` holds named `ratatui::style::Color` fields covering every UI surface
//! the browser renders. Two built-in themes are provided:
//!
//! - `dark`: ANSI 16 colors, works on any terminal including 256-color SSH sessions.
//! - `catppuccin_mocha`: Catppuccin Mocha palette in RGB; requires truecolor.

use ratatui::style::Color;

/// All color values used across the browser's UI surfaces.
#[derive(Debug, Clone)]
pub struct Theme {
    // Panel borders
    /// Border color for the currently focused panel.
    pub border_active: Color,
    /// Border color for unfocused panels.
    pub border_inactive: Color,
    /// Highlight for the selected tree row.
    pub selection: Color,

    // Lineage tree
    /// Group header rows.
    pub tree_group: Color,
    /// Revision rows on the chain.
    pub tree_document: Color,
    /// Documents that could not be placed on their chain.
    pub tree_unplaced: Color,
    /// Marker for the current-version revision.
    pub badge_current: Color,
    /// Marker for groups with a chain defect.
    pub badge_defect: Color,
    /// Reviewed check mark.
    pub badge_reviewed: Color,
    /// Unreviewed check box.
    pub badge_unreviewed: Color,

    // Compare view
    /// Lines present only in the newer revision.
    pub diff_added: Color,
    /// Lines present only in the older revision.
    pub diff_removed: Color,
    /// Unchanged lines.
    pub diff_context: Color,
    /// Section header lines.
    pub diff_header: Color,

    // Details
    /// Field labels in the details panel.
    pub detail_label: Color,

    // Status bar
    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
    /// Mode indicator color.
    pub status_mode: Color,
    /// Error text in the status bar.
    pub status_error: Color,
}

impl Theme {
    /// Returns the built-in dark theme using ANSI 16 colors.
    pub fn dark() -> Self {
        Self {
            border_active: Color::Cyan,
            border_inactive: Color::DarkGray,
            selection: Color::Cyan,

            tree_group: Color::White,
            tree_document: Color::Reset,
            tree_unplaced: Color::DarkGray,
            badge_current: Color::Green,
            badge_defect: Color::Red,
            badge_reviewed: Color::Green,
            badge_unreviewed: Color::DarkGray,

            diff_added: Color::Green,
            diff_removed: Color::Red,
            diff_context: Color::Reset,
            diff_header: Color::Cyan,

            detail_label: Color::Yellow,

            status_bar_bg: Color::DarkGray,
            status_bar_fg: Color::White,
            status_mode: Color::Cyan,
            status_error: Color::LightRed,
        }
    }

    /// Returns the Catppuccin Mocha theme using RGB truecolor values.
    ///
    /// Palette source: <https://github.com/catppuccin/catppuccin> Mocha variant.
    pub fn catppuccin_mocha() -> Self {
        let green = Color::Rgb(166, 227, 161);    // #a6e3a1
        let red = Color::Rgb(243, 139, 168);      // #f38ba8
        let yellow = Color::Rgb(249, 226, 175);   // #f9e2af
        let teal = Color::Rgb(148, 226, 213);     // #94e2d5
        let lavender = Color::Rgb(180, 190, 254); // #b4befe
        let overlay1 = Color::Rgb(127, 132, 156); // #7f849c
        let surface1 = Color::Rgb(69, 71, 90);    // #45475a
        let text = Color::Rgb(205, 214, 244);     // #cdd6f4
        let peach = Color::Rgb(250, 179, 135);    // #fab387

        Self {
            border_active: lavender,
            border_inactive: overlay1,
            selection: lavender,

            tree_group: text,
            tree_document: text,
            tree_unplaced: overlay1,
            badge_current: green,
            badge_defect: peach,
            badge_reviewed: green,
            badge_unreviewed: overlay1,

            diff_added: green,
            diff_removed: red,
            diff_context: text,
            diff_header: teal,

            detail_label: yellow,

            status_bar_bg: surface1,
            status_bar_fg: text,
            status_mode: lavender,
            status_error: red,
        }
    }

    /// Resolves a theme name string to the corresponding built-in theme.
    ///
    /// Unknown names fall back to `dark()` so a typo in config never prevents
    /// startup.
    pub fn from_name(name: &str) -> Self {
        match name {
            "catppuccin-mocha" | "catppuccin_mocha" => Self::catppuccin_mocha(),
            "dark" => Self::dark(),
            other => {
                tracing::warn!(theme = other, "unknown theme, falling back to 'dark'");
                Self::dark()
            }
        }
    }
}
