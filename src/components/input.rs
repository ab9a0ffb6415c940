use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::app::InputState;
use crate::theme::ThemeColors;

/// One-line text field with a block cursor.
pub struct InputWidget<'a> {
    state: &'a InputState,
    theme: &'a ThemeColors,
    focused: bool,
    masked: bool,
    placeholder: &'a str,
}

impl<'a> InputWidget<'a> {
    pub fn new(state: &'a InputState, theme: &'a ThemeColors) -> Self {
        Self {
            state,
            theme,
            focused: true,
            masked: false,
            placeholder: "",
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Render every character as `•`.
    pub fn masked(mut self, masked: bool) -> Self {
        self.masked = masked;
        self
    }

    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }

    /// Split the display text into (before, at, after) the cursor.
    fn segments(&self) -> (String, String, String) {
        let input = &self.state.input;
        let pos = self.state.cursor_position.min(input.len());
        let (before, rest) = input.split_at(pos);
        let mut rest_chars = rest.chars();
        let at = rest_chars.next().map(String::from).unwrap_or_else(|| " ".into());
        let after: String = rest_chars.collect();

        if self.masked {
            let mask = |s: &str| "•".repeat(s.chars().count());
            let at = if rest.is_empty() { at } else { "•".into() };
            (mask(before), at, mask(&after))
        } else {
            (before.to_string(), at, after)
        }
    }
}

impl<'a> Widget for InputWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let text_style = Style::default().fg(self.theme.tree_fg);

        if self.state.input.is_empty() && !self.focused {
            let line = Line::from(Span::styled(
                self.placeholder,
                Style::default().fg(self.theme.dim_fg),
            ));
            buf.set_line(area.x, area.y, &line, area.width);
            return;
        }

        let (before, at, after) = self.segments();

        // Scroll left so the cursor stays visible.
        let max_before = (area.width as usize).saturating_sub(1);
        let before_len = before.chars().count();
        let before: String = before
            .chars()
            .skip(before_len.saturating_sub(max_before))
            .collect();

        let cursor_style = if self.focused {
            Style::default()
                .fg(self.theme.editor_cursor_fg)
                .bg(self.theme.editor_cursor_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            text_style
        };

        let line = Line::from(vec![
            Span::styled(before, text_style),
            Span::styled(at, cursor_style),
            Span::styled(after, text_style),
        ]);
        buf.set_line(area.x, area.y, &line, area.width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(widget: InputWidget, width: u16) -> (Buffer, String) {
        let area = Rect::new(0, 0, width, 1);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        let text = (0..width)
            .map(|x| buf.cell((x, 0)).unwrap().symbol().to_string())
            .collect();
        (buf, text)
    }

    #[test]
    fn cursor_cell_is_highlighted() {
        let theme = crate::theme::dark_theme();
        let mut state = InputState::with_text("abc");
        state.move_cursor_left();
        let (buf, text) = render(InputWidget::new(&state, &theme), 10);
        assert!(text.starts_with("abc"));
        assert_eq!(buf.cell((2, 0)).unwrap().bg, theme.editor_cursor_bg);
    }

    #[test]
    fn masked_hides_text() {
        let theme = crate::theme::dark_theme();
        let state = InputState::with_text("hunter2");
        let (_, text) = render(InputWidget::new(&state, &theme).masked(true), 10);
        assert!(!text.contains("hunter2"));
        assert!(text.starts_with("•••••••"));
    }

    #[test]
    fn long_input_scrolls_to_cursor() {
        let theme = crate::theme::dark_theme();
        let state = InputState::with_text("abcdefghij");
        let (_, text) = render(InputWidget::new(&state, &theme), 5);
        assert_eq!(text, "ghij ");
    }

    #[test]
    fn placeholder_when_empty_and_unfocused() {
        let theme = crate::theme::dark_theme();
        let state = InputState::default();
        let (_, text) = render(
            InputWidget::new(&state, &theme)
                .focused(false)
                .placeholder("filename"),
            12,
        );
        assert!(text.starts_with("filename"));
    }
}
