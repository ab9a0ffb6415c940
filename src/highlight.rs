//! Syntax highlighting for note content.

use ratatui::style::{Color, Style};
use ratatui::text::Span;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use tracing::warn;

const FALLBACK_THEME: &str = "base16-ocean.dark";

/// Loaded syntax definitions plus the active color theme.
pub struct Highlighter {
    syntax_set: SyntaxSet,
    theme: Theme,
}

impl Highlighter {
    /// Load the built-in syntaxes and the named theme, falling back to
    /// `base16-ocean.dark` if it does not exist.
    pub fn new(theme_name: &str) -> Self {
        let mut themes = ThemeSet::load_defaults().themes;
        let theme = match themes.remove(theme_name) {
            Some(theme) => theme,
            None => {
                warn!(theme = theme_name, "unknown syntax theme, using default");
                themes.remove(FALLBACK_THEME).unwrap_or_default()
            }
        };
        Self {
            syntax_set: SyntaxSet::load_defaults_nonewlines(),
            theme,
        }
    }

    /// Pick a syntax from the file name's extension. Notes without a
    /// known extension are treated as Markdown.
    pub fn syntax_for(&self, file_name: &str) -> &SyntaxReference {
        let ext = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty());
        ext.and_then(|ext| self.syntax_set.find_syntax_by_extension(ext))
            .or_else(|| self.syntax_set.find_syntax_by_name("Markdown"))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text())
    }

    /// Start a highlighting pass over `file_name`'s lines.
    pub fn lines_for(&self, file_name: &str) -> HighlightLines<'_> {
        HighlightLines::new(self.syntax_for(file_name), &self.theme)
    }

    /// Highlight one line, falling back to unstyled text on error.
    pub fn highlight_line<'l>(
        &self,
        state: &mut HighlightLines<'_>,
        line: &'l str,
    ) -> Vec<Span<'l>> {
        match state.highlight_line(line, &self.syntax_set) {
            Ok(ranges) => ranges
                .into_iter()
                .map(|(style, text)| Span::styled(text, Style::default().fg(to_color(style.foreground))))
                .collect(),
            Err(_) => vec![Span::raw(line)],
        }
    }
}

fn to_color(c: syntect::highlighting::Color) -> Color {
    Color::Rgb(c.r, c.g, c.b)
}
