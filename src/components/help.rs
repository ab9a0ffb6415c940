use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Widget},
};

use crate::theme::ThemeColors;

/// A single keybinding entry for display.
struct KeyEntry {
    key: &'static str,
    description: &'static str,
}

/// A category of keybindings.
struct KeyCategory {
    name: &'static str,
    entries: &'static [KeyEntry],
}

const fn entry(key: &'static str, description: &'static str) -> KeyEntry {
    KeyEntry { key, description }
}

const BROWSER_KEYS: &[KeyEntry] = &[
    entry("j / ↓", "Move down"),
    entry("k / ↑", "Move up"),
    entry("Home / End", "Jump to first / last row"),
    entry("Enter / Space / click", "Open file or toggle folder"),
    entry("l / →", "Expand folder"),
    entry("h / ←", "Collapse folder or go to parent"),
    entry("/", "Search notes"),
    entry("Esc", "Clear search results"),
    entry("n", "New note"),
    entry("r", "Reload listing"),
];

const SEARCH_KEYS: &[KeyEntry] = &[
    entry("type", "Search as you type"),
    entry("Enter / ↓", "Back to the tree"),
    entry("Esc", "Clear query and leave"),
];

const FILE_KEYS: &[KeyEntry] = &[
    entry("e", "Toggle viewing / editing"),
    entry("Ctrl+S", "Commit changes"),
    entry("Ctrl+Z / Ctrl+Y", "Undo / redo"),
    entry("PgUp / PgDn", "Scroll a page"),
    entry("Esc", "Stop editing, then back to the tree"),
];

const COMPOSER_KEYS: &[KeyEntry] = &[
    entry("Tab", "Switch between filename and content"),
    entry("Ctrl+S", "Save note"),
    entry("Esc", "Back to the tree"),
];

const GENERAL_KEYS: &[KeyEntry] = &[
    entry("p / P", "Git pull / push"),
    entry("g", "Refresh git status"),
    entry("L", "Log in"),
    entry("?", "Toggle this help overlay"),
    entry("q / Ctrl+C", "Quit"),
];

const CATEGORIES: &[KeyCategory] = &[
    KeyCategory {
        name: "Browser",
        entries: BROWSER_KEYS,
    },
    KeyCategory {
        name: "Search",
        entries: SEARCH_KEYS,
    },
    KeyCategory {
        name: "File view",
        entries: FILE_KEYS,
    },
    KeyCategory {
        name: "New note",
        entries: COMPOSER_KEYS,
    },
    KeyCategory {
        name: "General (outside text fields)",
        entries: GENERAL_KEYS,
    },
];

/// Help overlay widget showing all keybindings.
pub struct HelpOverlay<'a> {
    theme: &'a ThemeColors,
    scroll_offset: usize,
}

impl<'a> HelpOverlay<'a> {
    pub fn new(theme: &'a ThemeColors, scroll_offset: usize) -> Self {
        Self {
            theme,
            scroll_offset,
        }
    }

    fn build_content_lines(&self) -> Vec<Line<'static>> {
        let heading = Style::default()
            .fg(self.theme.info_fg)
            .add_modifier(Modifier::BOLD);
        let mut lines = Vec::with_capacity(Self::total_lines());

        for category in CATEGORIES {
            lines.push(Line::from(vec![
                Span::styled(format!("── {} ", category.name), heading),
                Span::styled("─".repeat(30), Style::default().fg(self.theme.dim_fg)),
            ]));
            for entry in category.entries {
                lines.push(Line::from(vec![
                    Span::styled(
                        format!("  {:<24}", entry.key),
                        Style::default()
                            .fg(self.theme.editor_line_nr_current)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(entry.description, Style::default().fg(self.theme.tree_fg)),
                ]));
            }
            lines.push(Line::from(""));
        }

        lines.push(Line::from(Span::styled(
            " Press ? or Esc to close ",
            Style::default().fg(self.theme.dim_fg),
        )));
        lines
    }

    /// Total number of content lines, for scroll bounds.
    pub fn total_lines() -> usize {
        CATEGORIES.iter().map(|c| c.entries.len() + 2).sum::<usize>() + 1
    }
}

impl<'a> Widget for HelpOverlay<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let overlay_width = (area.width as f32 * 0.70).min(72.0) as u16;
        let overlay_height = (area.height as f32 * 0.80).min(40.0) as u16;
        let overlay = super::dialog::centered_rect(overlay_width, overlay_height, area);

        Clear.render(overlay, buf);
        let block = Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.border_focused_fg));
        let inner = block.inner(overlay);
        block.render(overlay, buf);

        let lines = self.build_content_lines();
        let visible_height = inner.height as usize;
        for (i, line) in lines
            .iter()
            .skip(self.scroll_offset)
            .take(visible_height)
            .enumerate()
        {
            buf.set_line(inner.x + 1, inner.y + i as u16, line, inner.width.saturating_sub(2));
        }

        if lines.len() > visible_height && overlay.height > 0 {
            let indicator = Span::styled(
                format!(" {}/{} ", (self.scroll_offset + 1).min(lines.len()), lines.len()),
                Style::default().fg(self.theme.dim_fg),
            );
            let width = indicator.width() as u16;
            buf.set_span(
                overlay.x + overlay.width.saturating_sub(width + 1),
                overlay.y + overlay.height - 1,
                &indicator,
                width,
            );
        }
    }
}
