use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Widget},
};

use crate::editor::EditorState;
use crate::highlight::Highlighter;
use crate::theme::ThemeColors;

/// Renders a note buffer with line numbers and syntax highlighting.
///
/// In read-only mode the cursor and current-line highlight are hidden.
pub struct EditorWidget<'a> {
    editor: &'a EditorState,
    file_name: &'a str,
    theme: &'a ThemeColors,
    highlighter: &'a Highlighter,
    read_only: bool,
    block: Option<Block<'a>>,
}

impl<'a> EditorWidget<'a> {
    pub fn new(
        editor: &'a EditorState,
        file_name: &'a str,
        theme: &'a ThemeColors,
        highlighter: &'a Highlighter,
    ) -> Self {
        Self {
            editor,
            file_name,
            theme,
            highlighter,
            read_only: false,
            block: None,
        }
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Width of the line number gutter: digits, a space and the separator.
    fn gutter_width(&self) -> u16 {
        let digits = self.editor.line_count().max(1).to_string().len() as u16;
        digits + 2
    }
}

impl<'a> Widget for EditorWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = if let Some(block) = &self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let gutter_w = self.gutter_width();
        let code_width = inner.width.saturating_sub(gutter_w);
        if code_width == 0 {
            return;
        }

        let lines = &self.editor.buffer;
        let scroll = self.editor.scroll_offset;
        let mut highlight_state = self.highlighter.lines_for(self.file_name);

        // Feed lines above the viewport so multi-line constructs are styled correctly.
        for line in lines.iter().take(scroll) {
            let _ = self.highlighter.highlight_line(&mut highlight_state, line);
        }

        let cursor_style = Style::default()
            .fg(self.theme.editor_cursor_fg)
            .bg(self.theme.editor_cursor_bg);

        for row in 0..inner.height as usize {
            let line_idx = scroll + row;
            let y = inner.y + row as u16;

            let Some(line) = lines.get(line_idx) else {
                buf.set_string(inner.x, y, "~", Style::default().fg(self.theme.dim_fg));
                continue;
            };

            let is_current_line = !self.read_only && line_idx == self.editor.cursor_line;

            let num_str = format!("{:>width$} ", line_idx + 1, width = (gutter_w - 2) as usize);
            let gutter_style = if is_current_line {
                Style::default()
                    .fg(self.theme.editor_line_nr_current)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.theme.editor_line_nr)
            };
            buf.set_span(inner.x, y, &Span::styled(num_str, gutter_style), gutter_w);
            buf.set_string(
                inner.x + gutter_w - 1,
                y,
                "│",
                Style::default().fg(self.theme.editor_gutter_sep),
            );

            let code_x = inner.x + gutter_w;
            let mut col = 0u16;
            for span in self.highlighter.highlight_line(&mut highlight_state, line) {
                for ch in span.content.chars() {
                    if col >= code_width {
                        break;
                    }
                    let is_cursor = is_current_line && col as usize == self.editor.cursor_col;
                    let style = if is_cursor {
                        cursor_style
                    } else if is_current_line {
                        span.style.bg(self.theme.editor_current_line_bg)
                    } else {
                        span.style
                    };
                    buf.set_string(code_x + col, y, ch.to_string(), style);
                    col += 1;
                }
            }

            if is_current_line {
                // Cursor past the last character, then the rest of the row.
                for x in code_x + col..inner.x + inner.width {
                    let style = if (x - code_x) as usize == self.editor.cursor_col {
                        cursor_style
                    } else {
                        Style::default().bg(self.theme.editor_current_line_bg)
                    };
                    buf.set_string(x, y, " ", style);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::widgets::Borders;

    fn buffer_to_string(buf: &Buffer, area: Rect) -> String {
        let mut s = String::new();
        for y in area.y..area.y + area.height {
            for x in area.x..area.x + area.width {
                s.push_str(buf.cell((x, y)).unwrap().symbol());
            }
            s.push('\n');
        }
        s
    }

    #[test]
    fn renders_numbered_lines() {
        let editor = EditorState::new("alpha\nbeta\ngamma");
        let theme = crate::theme::dark_theme();
        let hl = Highlighter::new("base16-ocean.dark");
        let area = Rect::new(0, 0, 30, 5);
        let mut buf = Buffer::empty(area);
        EditorWidget::new(&editor, "todo.md", &theme, &hl).render(area, &mut buf);

        let content = buffer_to_string(&buf, area);
        assert!(content.contains("1 │alpha"));
        assert!(content.contains("3 │gamma"));
        // Rows past the end of the buffer
        assert!(content.contains('~'));
    }

    #[test]
    fn block_title_is_drawn() {
        let editor = EditorState::new("hello");
        let theme = crate::theme::dark_theme();
        let hl = Highlighter::new("base16-ocean.dark");
        let block = Block::default().title(" todo.md ").borders(Borders::ALL);
        let area = Rect::new(0, 0, 30, 5);
        let mut buf = Buffer::empty(area);
        EditorWidget::new(&editor, "todo.md", &theme, &hl)
            .block(block)
            .render(area, &mut buf);

        assert!(buffer_to_string(&buf, area).contains("todo.md"));
    }

    #[test]
    fn cursor_only_shown_when_editable() {
        let editor = EditorState::new("ab");
        let theme = crate::theme::dark_theme();
        let hl = Highlighter::new("base16-ocean.dark");
        let area = Rect::new(0, 0, 20, 2);

        let mut buf = Buffer::empty(area);
        EditorWidget::new(&editor, "a.txt", &theme, &hl).render(area, &mut buf);
        // Gutter is "1 │", so column 3 holds the first character.
        assert_eq!(buf.cell((3, 0)).unwrap().bg, theme.editor_cursor_bg);

        let mut buf = Buffer::empty(area);
        EditorWidget::new(&editor, "a.txt", &theme, &hl)
            .read_only(true)
            .render(area, &mut buf);
        assert_ne!(buf.cell((3, 0)).unwrap().bg, theme.editor_cursor_bg);
    }

    #[test]
    fn gutter_grows_with_line_count() {
        let theme = crate::theme::dark_theme();
        let hl = Highlighter::new("base16-ocean.dark");
        let editor = EditorState::new("a");
        assert_eq!(EditorWidget::new(&editor, "a", &theme, &hl).gutter_width(), 3);

        let many = vec!["x"; 100].join("\n");
        let editor = EditorState::new(&many);
        assert_eq!(EditorWidget::new(&editor, "a", &theme, &hl).gutter_width(), 5);
    }
}
