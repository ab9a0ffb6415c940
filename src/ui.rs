use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders},
    Frame,
};

use crate::app::{App, AppMode, ComposeField, Composer, DialogKind, FileView, View, ViewState};
use crate::components::dialog::DialogWidget;
use crate::components::editor::EditorWidget;
use crate::components::help::HelpOverlay;
use crate::components::input::InputWidget;
use crate::components::search::SearchBar;
use crate::components::status_bar::StatusBarWidget;
use crate::components::tree::TreeWidget;
use crate::highlight::Highlighter;
use crate::theme::ThemeColors;

const BROWSER_HINTS: &str = " /:search n:new p/P:pull/push ?:help q:quit ";
const SEARCH_HINTS: &str = " Enter:tree Esc:clear ";
const VIEWING_HINTS: &str = " e:edit Ctrl+S:commit Esc:back ?:help ";
const EDITING_HINTS: &str = " Ctrl+S:commit Esc:stop editing ";
const COMPOSER_HINTS: &str = " Tab:switch field Ctrl+S:save Esc:back ";

/// Render the application UI.
pub fn render(app: &mut App, highlighter: &Highlighter, frame: &mut Frame) {
    let [main_area, status_area] =
        Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(frame.area());

    let hints = match &mut app.view {
        View::Browser => {
            render_browser(app, main_area, frame);
            if app.mode == AppMode::Search {
                SEARCH_HINTS
            } else {
                BROWSER_HINTS
            }
        }
        View::File(file) => {
            render_file(file, &app.theme, highlighter, main_area, frame);
            match file.view_state {
                ViewState::Viewing => VIEWING_HINTS,
                ViewState::Editing => EDITING_HINTS,
            }
        }
        View::Compose(composer) => {
            render_composer(composer, &app.theme, highlighter, main_area, frame);
            COMPOSER_HINTS
        }
    };

    let mut status = StatusBarWidget::new(&app.git_info, hints, &app.theme);
    if let Some(toast) = &app.toast {
        status = status.toast(&toast.message, toast.is_error);
    }
    frame.render_widget(status, status_area);

    match &app.mode {
        AppMode::Dialog(DialogKind::Help) => {
            frame.render_widget(HelpOverlay::new(&app.theme, app.help_scroll), frame.area());
        }
        AppMode::Dialog(_) => {
            frame.render_widget(DialogWidget::new(&app.mode, &app.login, &app.theme), frame.area());
        }
        _ => {}
    }
}

fn panel_block<'a>(title: String, focused: bool, theme: &ThemeColors) -> Block<'a> {
    let border = if focused {
        theme.border_focused_fg
    } else {
        theme.border_fg
    };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
}

fn render_browser(app: &mut App, area: Rect, frame: &mut Frame) {
    let [search_area, tree_area] =
        Layout::vertical([Constraint::Length(3), Constraint::Min(1)]).areas(area);

    let searching = app.mode == AppMode::Search;
    frame.render_widget(
        SearchBar::new(&app.search, &app.theme)
            .focused(searching)
            .result_count(app.tree.search_results.len()),
        search_area,
    );

    let title = if app.loading {
        " Notes (loading…) ".to_string()
    } else {
        " Notes ".to_string()
    };
    let block = panel_block(title, !searching, &app.theme);
    let inner = block.inner(tree_area);
    app.tree_area = inner;
    app.tree.update_scroll(inner.height as usize);

    frame.render_widget(
        TreeWidget::new(&app.tree, &app.theme, app.settings.use_icons).block(block),
        tree_area,
    );
}

fn render_file(
    file: &mut FileView,
    theme: &ThemeColors,
    highlighter: &Highlighter,
    area: Rect,
    frame: &mut Frame,
) {
    let mode = match file.view_state {
        ViewState::Viewing => "VIEW",
        ViewState::Editing => "EDIT",
    };
    let mut title = format!(" {} [{}]", file.name, mode);
    if file.editor.modified {
        title.push_str(" [+]");
    }
    if file.saving.is_some() {
        title.push_str(" committing…");
    }
    title.push(' ');

    let editing = file.view_state == ViewState::Editing;
    let block = panel_block(title, editing, theme);
    file.editor.visible_height = block.inner(area).height as usize;

    frame.render_widget(
        EditorWidget::new(&file.editor, &file.name, theme, highlighter)
            .read_only(!editing)
            .block(block),
        area,
    );
}

fn render_composer(
    composer: &mut Composer,
    theme: &ThemeColors,
    highlighter: &Highlighter,
    area: Rect,
    frame: &mut Frame,
) {
    let [name_area, content_area] =
        Layout::vertical([Constraint::Length(3), Constraint::Min(1)]).areas(area);

    let name_focused = composer.focus == ComposeField::Filename;
    let name_block = panel_block(" Filename ".to_string(), name_focused, theme);
    let name_inner = name_block.inner(name_area);
    frame.render_widget(name_block, name_area);
    frame.render_widget(
        InputWidget::new(&composer.filename, theme)
            .focused(name_focused)
            .placeholder("folder/name.md"),
        name_inner,
    );

    let mut title = " New note ".to_string();
    if composer.saving.is_some() {
        title = " New note (saving…) ".to_string();
    }
    let content_block = panel_block(title, !name_focused, theme).title_style(
        Style::default().add_modifier(Modifier::BOLD),
    );
    composer.content.visible_height = content_block.inner(content_area).height as usize;

    let file_name = composer.filename.input.trim();
    frame.render_widget(
        EditorWidget::new(&composer.content, file_name, theme, highlighter)
            .read_only(name_focused)
            .block(content_block),
        content_area,
    );
}
