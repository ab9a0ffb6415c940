use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::app::{App, AppMode, ComposeField, DialogKind, InputState, View, ViewState};
use crate::components::help::HelpOverlay;
use crate::editor::EditorState;

/// Handle a key event.
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.kind == KeyEventKind::Release {
        return;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }

    match app.mode.clone() {
        AppMode::Dialog(DialogKind::Login) => handle_login_key(app, key),
        AppMode::Dialog(DialogKind::ConfirmDiscard) => handle_confirm_key(app, key),
        AppMode::Dialog(DialogKind::Help) => handle_help_key(app, key),
        AppMode::Search => handle_search_key(app, key),
        AppMode::Normal => {
            let editing = matches!(&app.view, View::File(f) if f.view_state == ViewState::Editing);
            match app.view {
                View::Browser => handle_browser_key(app, key),
                View::File(_) if editing => handle_editing_key(app, key),
                View::File(_) => handle_viewing_key(app, key),
                View::Compose(_) => handle_composer_key(app, key),
            }
        }
    }
}

/// Handle a mouse event. Clicks only act on the tree.
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    if app.mode != AppMode::Normal {
        return;
    }
    let delta = match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if matches!(app.view, View::Browser) {
                app.click_at(mouse.column, mouse.row);
            }
            return;
        }
        MouseEventKind::ScrollDown => 1,
        MouseEventKind::ScrollUp => -1,
        _ => return,
    };
    match &mut app.view {
        View::Browser if delta > 0 => app.tree.select_next(),
        View::Browser => app.tree.select_previous(),
        View::File(file) => file.editor.scroll_by(delta * 3),
        View::Compose(_) => {}
    }
}

/// Keys that work in every view outside text fields.
fn handle_common_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('?') => app.toggle_help(),
        KeyCode::Char('p') => app.pull(),
        KeyCode::Char('P') => app.push(),
        KeyCode::Char('g') => app.refresh_git_info(),
        KeyCode::Char('L') => app.open_login(),
        _ => {}
    }
}

fn handle_browser_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.tree.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.tree.select_previous(),
        KeyCode::Home => app.tree.select_first(),
        KeyCode::End => app.tree.select_last(),
        KeyCode::Enter | KeyCode::Char(' ') => app.activate_selected(),
        KeyCode::Char('l') | KeyCode::Right => app.expand_selected(),
        KeyCode::Char('h') | KeyCode::Left => app.collapse_selected(),
        KeyCode::Char('/') => app.start_search(),
        KeyCode::Esc => app.clear_search(),
        KeyCode::Char('n') => app.open_composer(),
        KeyCode::Char('r') => app.reload_list(),
        _ => handle_common_key(app, key),
    }
}

fn handle_search_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.clear_search();
            app.finish_search();
        }
        KeyCode::Enter | KeyCode::Down | KeyCode::Tab => app.finish_search(),
        _ => app.edit_search(|input| edit_input(input, key)),
    }
}

fn handle_viewing_key(app: &mut App, key: KeyEvent) {
    if is_save(key) {
        app.save_file();
        return;
    }
    let Some(file) = app.file_view_mut() else {
        return;
    };
    let page = file.editor.visible_height.max(1) as isize;
    match key.code {
        KeyCode::Char('e') => file.toggle_view_state(),
        KeyCode::Char('j') | KeyCode::Down => file.editor.scroll_by(1),
        KeyCode::Char('k') | KeyCode::Up => file.editor.scroll_by(-1),
        KeyCode::PageDown | KeyCode::Char(' ') => file.editor.scroll_by(page),
        KeyCode::PageUp => file.editor.scroll_by(-page),
        KeyCode::Home => file.editor.scroll_offset = 0,
        KeyCode::End => file.editor.scroll_by(isize::MAX),
        KeyCode::Esc => app.leave_file(),
        _ => handle_common_key(app, key),
    }
}

fn handle_editing_key(app: &mut App, key: KeyEvent) {
    if is_save(key) {
        app.save_file();
        return;
    }
    let Some(file) = app.file_view_mut() else {
        return;
    };
    if key.code == KeyCode::Esc {
        file.toggle_view_state();
        return;
    }
    if key.code == KeyCode::Tab && key.modifiers.is_empty() {
        file.editor.insert_tab();
        return;
    }
    edit_buffer(&mut file.editor, key);
}

fn handle_composer_key(app: &mut App, key: KeyEvent) {
    if is_save(key) {
        app.save_composed();
        return;
    }
    if key.code == KeyCode::Esc {
        app.leave_file();
        return;
    }
    let View::Compose(composer) = &mut app.view else {
        return;
    };
    match (composer.focus, key.code) {
        (_, KeyCode::Tab | KeyCode::BackTab) => composer.toggle_focus(),
        (ComposeField::Filename, KeyCode::Enter) => composer.focus = ComposeField::Content,
        (ComposeField::Filename, _) => edit_input(&mut composer.filename, key),
        (ComposeField::Content, _) => edit_buffer(&mut composer.content, key),
    }
}

fn handle_login_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_dialog(),
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
            app.login.focus_password = !app.login.focus_password;
        }
        KeyCode::Enter if !app.login.focus_password => app.login.focus_password = true,
        KeyCode::Enter => app.submit_login(),
        _ if app.login.pending => {}
        _ => edit_input(app.login.focused_mut(), key),
    }
}

fn handle_confirm_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => app.show_browser(),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.close_dialog(),
        _ => {}
    }
}

fn handle_help_key(app: &mut App, key: KeyEvent) {
    let max_scroll = HelpOverlay::total_lines().saturating_sub(1);
    match key.code {
        KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => app.close_dialog(),
        KeyCode::Char('j') | KeyCode::Down => {
            app.help_scroll = (app.help_scroll + 1).min(max_scroll);
        }
        KeyCode::Char('k') | KeyCode::Up => app.help_scroll = app.help_scroll.saturating_sub(1),
        KeyCode::Home => app.help_scroll = 0,
        _ => {}
    }
}

fn is_save(key: KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s')
}

/// Apply a key to a single-line input.
fn edit_input(input: &mut InputState, key: KeyEvent) {
    match key.code {
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => input.insert_char(c),
        KeyCode::Backspace => input.delete_char(),
        KeyCode::Left => input.move_cursor_left(),
        KeyCode::Right => input.move_cursor_right(),
        KeyCode::Home => input.cursor_home(),
        KeyCode::End => input.cursor_end(),
        _ => {}
    }
}

/// Apply a key to a multi-line editor buffer.
fn edit_buffer(editor: &mut EditorState, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('z') if ctrl => editor.undo(),
        KeyCode::Char('y') if ctrl => editor.redo(),
        KeyCode::Char(c) if !ctrl => editor.insert_char(c),
        KeyCode::Enter => editor.insert_newline(),
        KeyCode::Backspace => editor.delete_char_before(),
        KeyCode::Delete => editor.delete_char_at(),
        KeyCode::Up => editor.move_up(),
        KeyCode::Down => editor.move_down(),
        KeyCode::Left => editor.move_left(),
        KeyCode::Right => editor.move_right(),
        KeyCode::Home if ctrl => editor.move_to_top(),
        KeyCode::End if ctrl => editor.move_to_bottom(),
        KeyCode::Home => editor.move_home(),
        KeyCode::End => editor.move_end(),
        KeyCode::PageUp => editor.page_up(),
        KeyCode::PageDown => editor.page_down(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::Action;
    use crate::config::AppConfig;
    use crate::event::ApiEvent;
    use crate::notes::file::{FileId, NoteFile};
    use crate::notes::tree::FolderNode;
    use uuid::Uuid;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_keys(app: &mut App, s: &str) {
        for c in s.chars() {
            handle_key_event(app, key(KeyCode::Char(c)));
        }
    }

    fn setup_app() -> App {
        let mut app = App::new(&AppConfig::default());
        app.handle_api(ApiEvent::Listed(Ok(vec![
            FolderNode::folder("journal", vec![FolderNode::file("monday.md", FileId(Uuid::from_u128(1)))]),
            FolderNode::file("todo.md", FileId(Uuid::from_u128(2))),
        ])));
        app.take_actions();
        app
    }

    fn open_file(app: &mut App) {
        app.handle_api(ApiEvent::Loaded(Ok(NoteFile {
            id: FileId(Uuid::from_u128(2)),
            name: "todo.md".into(),
            content: "milk".into(),
        })));
        app.take_actions();
    }

    #[test]
    fn q_quits_and_ctrl_c_quits_anywhere() {
        let mut app = setup_app();
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(app.should_quit);

        let mut app = setup_app();
        app.open_login();
        handle_key_event(&mut app, ctrl('c'));
        assert!(app.should_quit);
    }

    #[test]
    fn browser_navigation_and_toggle() {
        let mut app = setup_app();
        handle_key_event(&mut app, key(KeyCode::Enter));
        assert_eq!(app.tree.rows.len(), 3);
        handle_key_event(&mut app, key(KeyCode::Char('j')));
        handle_key_event(&mut app, key(KeyCode::Char(' ')));
        assert_eq!(app.take_actions(), vec![Action::Load(FileId(Uuid::from_u128(1)))]);
        handle_key_event(&mut app, key(KeyCode::Char('h')));
        assert_eq!(app.tree.selected_index, 0);
        handle_key_event(&mut app, key(KeyCode::Char('h')));
        assert_eq!(app.tree.rows.len(), 2);
    }

    #[test]
    fn browser_git_keys() {
        let mut app = setup_app();
        handle_key_event(&mut app, key(KeyCode::Char('p')));
        handle_key_event(&mut app, key(KeyCode::Char('P')));
        handle_key_event(&mut app, key(KeyCode::Char('g')));
        handle_key_event(&mut app, key(KeyCode::Char('r')));
        assert_eq!(
            app.take_actions(),
            vec![Action::Pull, Action::Push, Action::GitInfo, Action::List]
        );
    }

    #[test]
    fn search_mode_captures_typing() {
        let mut app = setup_app();
        handle_key_event(&mut app, key(KeyCode::Char('/')));
        assert_eq!(app.mode, AppMode::Search);
        // 'q' is text here, not quit.
        type_keys(&mut app, "qr");
        assert!(!app.should_quit);
        assert_eq!(app.search.input, "qr");
        assert_eq!(app.take_actions().len(), 2);

        handle_key_event(&mut app, key(KeyCode::Esc));
        assert_eq!(app.mode, AppMode::Normal);
        assert!(app.search.input.is_empty());
    }

    #[test]
    fn file_view_edit_and_commit() {
        let mut app = setup_app();
        open_file(&mut app);
        handle_key_event(&mut app, key(KeyCode::Char('e')));
        handle_key_event(&mut app, key(KeyCode::End));
        type_keys(&mut app, "s!");
        handle_key_event(&mut app, ctrl('s'));
        assert_eq!(
            app.take_actions(),
            vec![Action::Edit {
                id: FileId(Uuid::from_u128(2)),
                content: "milks!".into()
            }]
        );
    }

    #[test]
    fn escape_leaves_editing_then_asks_before_discarding() {
        let mut app = setup_app();
        open_file(&mut app);
        handle_key_event(&mut app, key(KeyCode::Char('e')));
        type_keys(&mut app, "x");
        handle_key_event(&mut app, key(KeyCode::Esc));
        assert!(matches!(&app.view, View::File(f) if f.view_state == ViewState::Viewing));

        handle_key_event(&mut app, key(KeyCode::Esc));
        assert_eq!(app.mode, AppMode::Dialog(DialogKind::ConfirmDiscard));
        handle_key_event(&mut app, key(KeyCode::Char('n')));
        assert!(matches!(app.view, View::File(_)));

        handle_key_event(&mut app, key(KeyCode::Esc));
        handle_key_event(&mut app, key(KeyCode::Char('y')));
        assert!(matches!(app.view, View::Browser));
    }

    #[test]
    fn composer_fields_and_save() {
        let mut app = setup_app();
        handle_key_event(&mut app, key(KeyCode::Char('n')));
        type_keys(&mut app, "ideas.md");
        handle_key_event(&mut app, key(KeyCode::Tab));
        type_keys(&mut app, "one");
        handle_key_event(&mut app, key(KeyCode::Enter));
        type_keys(&mut app, "two");
        handle_key_event(&mut app, ctrl('s'));
        assert_eq!(
            app.take_actions(),
            vec![Action::Commit {
                filename: "ideas.md".into(),
                content: "one\ntwo".into()
            }]
        );
    }

    #[test]
    fn login_dialog_flow() {
        let mut app = setup_app();
        handle_key_event(&mut app, key(KeyCode::Char('L')));
        assert_eq!(app.mode, AppMode::Dialog(DialogKind::Login));
        type_keys(&mut app, "ada");
        handle_key_event(&mut app, key(KeyCode::Enter));
        type_keys(&mut app, "pw");
        handle_key_event(&mut app, key(KeyCode::Enter));
        assert_eq!(
            app.take_actions(),
            vec![Action::Login {
                username: "ada".into(),
                password: "pw".into()
            }]
        );
        // Typing is ignored while the request is in flight.
        type_keys(&mut app, "zz");
        assert_eq!(app.login.password.input, "pw");
    }

    #[test]
    fn help_toggles_and_scrolls() {
        let mut app = setup_app();
        handle_key_event(&mut app, key(KeyCode::Char('?')));
        assert_eq!(app.mode, AppMode::Dialog(DialogKind::Help));
        handle_key_event(&mut app, key(KeyCode::Down));
        assert_eq!(app.help_scroll, 1);
        handle_key_event(&mut app, key(KeyCode::Char('?')));
        assert_eq!(app.mode, AppMode::Normal);
    }

    #[test]
    fn mouse_click_toggles_row() {
        let mut app = setup_app();
        app.tree_area = ratatui::layout::Rect::new(1, 4, 40, 10);
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 3,
            row: 5,
            modifiers: KeyModifiers::NONE,
        };
        handle_mouse_event(&mut app, click);
        assert_eq!(app.take_actions(), vec![Action::Load(FileId(Uuid::from_u128(2)))]);
    }
}
