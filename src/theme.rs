//! Built-in color palettes and their selection from config.

use ratatui::style::Color;

/// All runtime colors used in the UI.
#[derive(Debug, Clone)]
pub struct ThemeColors {
    // Tree panel
    pub tree_fg: Color,
    pub tree_selected_bg: Color,
    pub tree_selected_fg: Color,
    pub tree_folder_fg: Color,
    pub tree_file_fg: Color,
    /// Folder markers (`[+]`, `[-]`, `[ ]` or icons) drawn before a node name.
    pub tree_marker_fg: Color,
    pub search_hit_fg: Color,

    // Chrome
    pub border_fg: Color,
    pub border_focused_fg: Color,
    pub dialog_border_fg: Color,

    // Status bar
    pub status_bg: Color,
    pub status_fg: Color,
    pub git_info_fg: Color,

    // Semantic
    pub error_fg: Color,
    pub success_fg: Color,
    pub info_fg: Color,
    pub dim_fg: Color,

    // Editor
    pub editor_line_nr: Color,
    pub editor_line_nr_current: Color,
    pub editor_gutter_sep: Color,
    pub editor_cursor_fg: Color,
    pub editor_cursor_bg: Color,
    pub editor_current_line_bg: Color,
}

/// Dark theme using the Catppuccin Mocha palette.
pub fn dark_theme() -> ThemeColors {
    ThemeColors {
        tree_fg: Color::Rgb(205, 214, 244),          // #cdd6f4 (text)
        tree_selected_bg: Color::Rgb(69, 71, 90),    // #45475a (surface1)
        tree_selected_fg: Color::Rgb(205, 214, 244), // #cdd6f4
        tree_folder_fg: Color::Rgb(137, 180, 250),   // #89b4fa (blue)
        tree_file_fg: Color::Rgb(205, 214, 244),     // #cdd6f4
        tree_marker_fg: Color::Rgb(108, 112, 134),   // #6c7086 (overlay0)
        search_hit_fg: Color::Rgb(203, 166, 247),    // #cba6f7 (mauve)

        border_fg: Color::Rgb(88, 91, 112),           // #585b70 (surface2)
        border_focused_fg: Color::Rgb(137, 180, 250), // #89b4fa
        dialog_border_fg: Color::Rgb(137, 180, 250),

        status_bg: Color::Rgb(30, 30, 46), // #1e1e2e (base)
        status_fg: Color::Rgb(205, 214, 244),
        git_info_fg: Color::Rgb(148, 226, 213), // #94e2d5 (teal)

        error_fg: Color::Rgb(243, 139, 168),   // #f38ba8 (red)
        success_fg: Color::Rgb(166, 227, 161), // #a6e3a1 (green)
        info_fg: Color::Rgb(137, 180, 250),
        dim_fg: Color::Rgb(108, 112, 134),

        editor_line_nr: Color::Rgb(108, 112, 134),
        editor_line_nr_current: Color::Rgb(249, 226, 175), // #f9e2af (yellow)
        editor_gutter_sep: Color::Rgb(69, 71, 90),
        editor_cursor_fg: Color::Rgb(30, 30, 46),
        editor_cursor_bg: Color::Rgb(205, 214, 244),
        editor_current_line_bg: Color::Rgb(49, 50, 68), // #313244 (surface0)
    }
}

/// Light theme using the Catppuccin Latte palette.
pub fn light_theme() -> ThemeColors {
    ThemeColors {
        tree_fg: Color::Rgb(76, 79, 105),            // #4c4f69 (text)
        tree_selected_bg: Color::Rgb(204, 208, 218), // #ccd0da (surface1)
        tree_selected_fg: Color::Rgb(76, 79, 105),
        tree_folder_fg: Color::Rgb(30, 102, 245), // #1e66f5 (blue)
        tree_file_fg: Color::Rgb(76, 79, 105),
        tree_marker_fg: Color::Rgb(156, 160, 176), // #9ca0b0 (overlay0)
        search_hit_fg: Color::Rgb(136, 57, 239),   // #8839ef (mauve)

        border_fg: Color::Rgb(172, 176, 190), // #acb0be (surface2)
        border_focused_fg: Color::Rgb(30, 102, 245),
        dialog_border_fg: Color::Rgb(30, 102, 245),

        status_bg: Color::Rgb(239, 241, 245), // #eff1f5 (base)
        status_fg: Color::Rgb(76, 79, 105),
        git_info_fg: Color::Rgb(23, 146, 153), // #179299 (teal)

        error_fg: Color::Rgb(210, 15, 57),   // #d20f39 (red)
        success_fg: Color::Rgb(64, 160, 43), // #40a02b (green)
        info_fg: Color::Rgb(30, 102, 245),
        dim_fg: Color::Rgb(156, 160, 176),

        editor_line_nr: Color::Rgb(156, 160, 176),
        editor_line_nr_current: Color::Rgb(223, 142, 29), // #df8e1d (yellow)
        editor_gutter_sep: Color::Rgb(204, 208, 218),
        editor_cursor_fg: Color::Rgb(239, 241, 245),
        editor_cursor_bg: Color::Rgb(76, 79, 105),
        editor_current_line_bg: Color::Rgb(230, 233, 239), // #e6e9ef (surface0)
    }
}

/// Pick a palette by scheme name. Unknown names fall back to dark.
pub fn resolve_theme(scheme: &str) -> ThemeColors {
    match scheme {
        "light" => light_theme(),
        _ => dark_theme(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_light_theme() {
        let theme = resolve_theme("light");
        assert_eq!(theme.tree_folder_fg, Color::Rgb(30, 102, 245));
    }

    #[test]
    fn unknown_scheme_falls_back_to_dark() {
        let theme = resolve_theme("neon");
        assert_eq!(theme.tree_folder_fg, Color::Rgb(137, 180, 250));
    }

    #[test]
    fn dark_and_light_differ() {
        let dark = dark_theme();
        let light = light_theme();
        assert_ne!(dark.tree_fg, light.tree_fg);
        assert_ne!(dark.tree_selected_bg, light.tree_selected_bg);
        assert_ne!(dark.error_fg, light.error_fg);
    }
}
