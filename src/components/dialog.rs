use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Padding, Widget},
};

use crate::app::{AppMode, DialogKind, LoginState};
use crate::components::input::InputWidget;
use crate::theme::ThemeColors;

/// Centered modal overlay for the login form and confirmations.
pub struct DialogWidget<'a> {
    mode: &'a AppMode,
    login: &'a LoginState,
    theme: &'a ThemeColors,
}

impl<'a> DialogWidget<'a> {
    pub fn new(mode: &'a AppMode, login: &'a LoginState, theme: &'a ThemeColors) -> Self {
        Self { mode, login, theme }
    }
}

/// Calculate a centered rectangle within the given area.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + area.width.saturating_sub(w) / 2;
    let y = area.y + area.height.saturating_sub(h) / 2;
    Rect::new(x, y, w, h)
}

impl<'a> Widget for DialogWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.mode {
            AppMode::Dialog(DialogKind::Login) => self.render_login(area, buf),
            AppMode::Dialog(DialogKind::ConfirmDiscard) => self.render_confirm_discard(area, buf),
            _ => {}
        }
    }
}

impl<'a> DialogWidget<'a> {
    fn frame(&self, title: &str, width: u16, height: u16, area: Rect, buf: &mut Buffer) -> Rect {
        let rect = centered_rect(width.min(area.width.saturating_sub(4)), height, area);
        Clear.render(rect, buf);
        let block = Block::default()
            .title(format!(" {} ", title))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.dialog_border_fg))
            .padding(Padding::horizontal(1));
        let inner = block.inner(rect);
        block.render(rect, buf);
        inner
    }

    fn hint(&self, text: &str, inner: Rect, buf: &mut Buffer) {
        let style = Style::default()
            .fg(self.theme.dim_fg)
            .add_modifier(Modifier::DIM);
        buf.set_line(
            inner.x,
            inner.y + inner.height - 1,
            &Line::from(Span::styled(text, style)),
            inner.width,
        );
    }

    fn render_login(&self, area: Rect, buf: &mut Buffer) {
        let inner = self.frame("Log in", 50, 7, area, buf);
        if inner.height < 3 || inner.width < 12 {
            return;
        }

        let label_width = 10u16;
        let fields = [
            ("Username", &self.login.username, !self.login.focus_password, false),
            ("Password", &self.login.password, self.login.focus_password, true),
        ];
        for (row, (label, state, focused, masked)) in fields.into_iter().enumerate() {
            let y = inner.y + row as u16;
            let label_style = if focused {
                Style::default()
                    .fg(self.theme.border_focused_fg)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.theme.tree_fg)
            };
            buf.set_string(inner.x, y, label, label_style);
            InputWidget::new(state, self.theme)
                .focused(focused && !self.login.pending)
                .masked(masked)
                .render(
                    Rect::new(inner.x + label_width, y, inner.width - label_width, 1),
                    buf,
                );
        }

        let hint = if self.login.pending {
            "Logging in…"
        } else {
            "[Enter] Log in  [Tab] Next field  [Esc] Cancel"
        };
        self.hint(hint, inner, buf);
    }

    fn render_confirm_discard(&self, area: Rect, buf: &mut Buffer) {
        let inner = self.frame("Unsaved changes", 44, 5, area, buf);
        if inner.height < 2 || inner.width == 0 {
            return;
        }
        let msg = Line::from(Span::styled(
            "Discard your edits?",
            Style::default()
                .fg(self.theme.error_fg)
                .add_modifier(Modifier::BOLD),
        ));
        buf.set_line(inner.x, inner.y, &msg, inner.width);
        self.hint("[y] Discard  [n/Esc] Keep editing", inner, buf);
    }
}
