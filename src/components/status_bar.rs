use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::api::GitInfo;
use crate::theme::ThemeColors;

/// Bottom bar: git status and key hints, or a toast when one is active.
pub struct StatusBarWidget<'a> {
    git_info: &'a GitInfo,
    key_hints: &'a str,
    theme: &'a ThemeColors,
    toast: Option<&'a str>,
    is_error: bool,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(git_info: &'a GitInfo, key_hints: &'a str, theme: &'a ThemeColors) -> Self {
        Self {
            git_info,
            key_hints,
            theme,
            toast: None,
            is_error: false,
        }
    }

    pub fn toast(mut self, msg: &'a str, is_error: bool) -> Self {
        self.toast = Some(msg);
        self.is_error = is_error;
        self
    }
}

/// Keep at most `width` characters of `s`.
fn truncate(s: &str, width: usize) -> String {
    s.chars().take(width).collect()
}

impl<'a> Widget for StatusBarWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }
        let width = area.width as usize;
        let bar_style = Style::default().bg(self.theme.status_bg).fg(self.theme.status_fg);
        buf.set_style(area, bar_style);

        if let Some(msg) = self.toast {
            let style = if self.is_error {
                Style::default()
                    .bg(self.theme.error_fg)
                    .fg(self.theme.status_bg)
                    .add_modifier(Modifier::BOLD)
            } else {
                bar_style.fg(self.theme.success_fg)
            };
            let display = format!(" {:<width$}", truncate(msg, width), width = width);
            buf.set_line(
                area.x,
                area.y,
                &Line::from(Span::styled(display, style)),
                area.width,
            );
            return;
        }

        let hints_len = self.key_hints.chars().count();
        let info_budget = width.saturating_sub(hints_len + 1);

        let info = if self.git_info.is_empty() {
            "git status unknown".to_string()
        } else {
            self.git_info.fields().collect::<Vec<_>>().join(" │ ")
        };
        let info = truncate(&format!(" {}", info), info_budget);
        let gap = width.saturating_sub(info.chars().count() + hints_len);

        let line = Line::from(vec![
            Span::styled(info, bar_style.fg(self.theme.git_info_fg)),
            Span::raw(" ".repeat(gap)),
            Span::styled(
                self.key_hints,
                bar_style.fg(self.theme.dim_fg).add_modifier(Modifier::DIM),
            ),
        ]);
        buf.set_line(area.x, area.y, &line, area.width);
    }
}
