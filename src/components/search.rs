use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::Span,
    widgets::{Block, Borders, Widget},
};

use crate::app::InputState;
use crate::components::input::InputWidget;
use crate::theme::ThemeColors;

/// Search field shown above the tree.
pub struct SearchBar<'a> {
    state: &'a InputState,
    theme: &'a ThemeColors,
    focused: bool,
    result_count: usize,
}

impl<'a> SearchBar<'a> {
    pub fn new(state: &'a InputState, theme: &'a ThemeColors) -> Self {
        Self {
            state,
            theme,
            focused: false,
            result_count: 0,
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn result_count(mut self, count: usize) -> Self {
        self.result_count = count;
        self
    }
}

impl<'a> Widget for SearchBar<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border = if self.focused {
            self.theme.border_focused_fg
        } else {
            self.theme.border_fg
        };
        let mut block = Block::default()
            .title(" Search ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border));
        if !self.state.is_blank() {
            block = block.title_bottom(
                Span::styled(
                    format!(" {} results ", self.result_count),
                    Style::default().fg(self.theme.search_hit_fg),
                )
                .into_right_aligned_line(),
            );
        }

        let inner = block.inner(area);
        block.render(area, buf);
        if inner.width < 2 || inner.height == 0 {
            return;
        }

        let field = Rect::new(inner.x + 1, inner.y, inner.width - 1, 1);
        InputWidget::new(self.state, self.theme)
            .focused(self.focused)
            .placeholder("/ to search")
            .render(field, buf);
    }
}
