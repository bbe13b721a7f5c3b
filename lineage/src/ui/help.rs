//! Help overlay: a centred modal listing every keybinding.
//!
//! Drawn inside the same `terminal.draw()` closure as the panels; `Clear`
//! erases the area underneath before the bordered paragraph goes on top.

use ratatui::{
    Frame,
    layout::Constraint,
    style::{Modifier, Style},
    text::{Line, Text},
    widgets::{Block, Clear, Paragraph, Wrap},
};

use crate::theme::Theme;

/// Renders the help overlay as a centred modal on top of the 3-panel layout.
///
/// The text scrolls by `help_scroll` rows. Terminals narrower than 60 columns
/// get no overlay.
pub fn render_help_overlay(frame: &mut Frame, theme: &Theme, help_scroll: u16) {
    if frame.area().width < 60 {
        return;
    }

    let overlay_area = frame
        .area()
        .centered(Constraint::Percentage(80), Constraint::Percentage(80));

    frame.render_widget(Clear, overlay_area);

    let block = Block::bordered()
        .title(" Help: j/k scroll, ? or Esc to dismiss ")
        .border_style(Style::default().fg(theme.border_active));

    let help_text = build_help_text(theme);

    frame.render_widget(
        Paragraph::new(help_text)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((help_scroll, 0)),
        overlay_area,
    );
}

fn build_help_text(theme: &Theme) -> Text<'static> {
    let heading = |s: &'static str| {
        Line::styled(
            s,
            Style::default().fg(theme.detail_label).add_modifier(Modifier::BOLD),
        )
    };
    Text::from(vec![
        heading("Navigation"),
        Line::from("  j / k         Down / up one row or line"),
        Line::from("  g / G         Jump to top / bottom"),
        Line::from("  Ctrl-d / u    Half page down / up"),
        Line::from("  Ctrl-f / b    Full page down / up"),
        Line::from("  H / L         Move panel focus left / right"),
        Line::from(""),
        heading("Lineage Tree"),
        Line::from("  Space         Fold / unfold the selected lineage"),
        Line::from("  za zo zc      Toggle / open / close the selected lineage"),
        Line::from("  zM / zR       Fold / unfold every lineage"),
        Line::from("  [ / ]         Older / newer revision in the chain"),
        Line::from("  Enter / l     Compare the selected revision"),
        Line::from(""),
        heading("Review"),
        Line::from("  r             Mark the selected document reviewed / unreviewed"),
        Line::from("  R             Reload the site snapshot"),
        Line::from(""),
        heading("Compare"),
        Line::from("  < / >         Shrink / grow the compare panel by 5%"),
        Line::from(""),
        heading("Tree markers"),
        Line::from("  ●             Current version"),
        Line::from("  ?             Document not placed on the chain"),
        Line::from("  [dangling]    Chain points at a missing revision"),
        Line::from("  [detached]    Documents left over after the chain root"),
        Line::from("  [no current]  No document flagged current"),
        Line::from(""),
        heading("General"),
        Line::from("  ?             Open / close this help overlay"),
        Line::from("  q / Esc       Quit"),
    ])
}
