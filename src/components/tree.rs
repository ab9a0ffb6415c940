use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Widget},
};

use crate::notes::tree::{FlatRow, FolderTree, NodeState, Section};
use crate::theme::ThemeColors;

/// Renders the folder tree and search results with box-drawing guides.
pub struct TreeWidget<'a> {
    tree: &'a FolderTree,
    theme: &'a ThemeColors,
    use_icons: bool,
    block: Option<Block<'a>>,
}

impl<'a> TreeWidget<'a> {
    pub fn new(tree: &'a FolderTree, theme: &'a ThemeColors, use_icons: bool) -> Self {
        Self {
            tree,
            theme,
            use_icons,
            block: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Indentation guides for `rows[index]`, derived from its ancestors'
    /// last-sibling flags.
    fn build_prefix(rows: &[FlatRow], index: usize) -> String {
        let row = &rows[index];
        if row.depth == 0 {
            return String::new();
        }

        let mut prefix = String::new();
        for depth in 1..row.depth {
            let ancestor_is_last = rows[..index]
                .iter()
                .rev()
                .take_while(|r| r.depth >= depth)
                .find(|r| r.depth == depth)
                .is_some_and(|r| r.is_last_sibling);
            prefix.push_str(if ancestor_is_last { "   " } else { "│  " });
        }
        prefix.push_str(if row.is_last_sibling { "└──" } else { "├──" });
        prefix
    }

    fn marker(&self, row: &FlatRow) -> &'static str {
        if self.use_icons {
            match row.state {
                NodeState::Collapsed => " ",
                NodeState::Expanded | NodeState::ExpandedEmpty => " ",
                NodeState::File => file_icon(&row.name),
            }
        } else {
            match row.state {
                NodeState::Collapsed => "[+] ",
                NodeState::Expanded => "[-] ",
                NodeState::ExpandedEmpty => "[ ] ",
                NodeState::File => "",
            }
        }
    }

    fn row_style(&self, row: &FlatRow, selected: bool) -> Style {
        if selected {
            return Style::default()
                .bg(self.theme.tree_selected_bg)
                .fg(self.theme.tree_selected_fg)
                .add_modifier(Modifier::BOLD);
        }
        match (row.section, row.state) {
            (Section::SearchResults, _) => Style::default().fg(self.theme.search_hit_fg),
            (_, NodeState::File) => Style::default().fg(self.theme.tree_file_fg),
            (_, NodeState::ExpandedEmpty) => Style::default()
                .fg(self.theme.tree_folder_fg)
                .add_modifier(Modifier::DIM),
            _ => Style::default()
                .fg(self.theme.tree_folder_fg)
                .add_modifier(Modifier::BOLD),
        }
    }
}

/// Nerd Font glyph for a note, by extension.
fn file_icon(name: &str) -> &'static str {
    let ext = name.rsplit_once('.').map(|(_, e)| e.to_lowercase());
    match ext.as_deref() {
        Some("md" | "markdown") | None => " ",
        Some("txt" | "rst" | "org") => " ",
        Some("json") => " ",
        Some("toml" | "yaml" | "yml" | "ini") => " ",
        Some("png" | "jpg" | "jpeg" | "gif" | "svg") => " ",
        _ => " ",
    }
}

impl<'a> Widget for TreeWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = if let Some(block) = &self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        let rows = &self.tree.rows;
        let visible_height = inner.height as usize;
        if rows.is_empty() || visible_height == 0 {
            return;
        }

        let visible = rows
            .iter()
            .enumerate()
            .skip(self.tree.scroll_offset)
            .take(visible_height);

        for (line_no, (idx, row)) in visible.enumerate() {
            let y = inner.y + line_no as u16;
            let selected = idx == self.tree.selected_index;
            let name_style = self.row_style(row, selected);
            let guide_style = if selected {
                name_style
            } else {
                Style::default().fg(self.theme.tree_marker_fg)
            };

            let line = Line::from(vec![
                Span::styled(Self::build_prefix(rows, idx), guide_style),
                Span::styled(self.marker(row), guide_style),
                Span::styled(row.name.as_str(), name_style),
            ]);
            buf.set_line(inner.x, y, &line, inner.width);
        }
    }
}
