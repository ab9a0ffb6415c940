use std::time::{Duration, Instant};

use ratatui::layout::Rect;
use tracing::{debug, info, warn};

use crate::actions::Action;
use crate::api::GitInfo;
use crate::config::AppConfig;
use crate::editor::EditorState;
use crate::error::AppError;
use crate::event::ApiEvent;
use crate::notes::file::{FileId, NoteFile};
use crate::notes::tree::{FolderTree, Toggled};
use crate::theme::{resolve_theme, ThemeColors};

/// The kind of dialog being displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogKind {
    Login,
    /// Leaving the file view would drop unsaved edits.
    ConfirmDiscard,
    Help,
}

/// Application input mode.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum AppMode {
    #[default]
    Normal,
    /// Keystrokes go to the search bar.
    Search,
    Dialog(DialogKind),
}

/// Single-line text input with a byte-offset cursor.
#[derive(Debug, Default, Clone)]
pub struct InputState {
    pub input: String,
    pub cursor_position: usize,
}

impl InputState {
    pub fn with_text(text: &str) -> Self {
        Self {
            input: text.to_string(),
            cursor_position: text.len(),
        }
    }

    pub fn insert_char(&mut self, c: char) {
        self.input.insert(self.cursor_position, c);
        self.cursor_position += c.len_utf8();
    }

    /// Delete the character before the cursor (backspace).
    pub fn delete_char(&mut self) {
        if let Some(prev) = self.input[..self.cursor_position].chars().next_back() {
            self.cursor_position -= prev.len_utf8();
            self.input.remove(self.cursor_position);
        }
    }

    pub fn move_cursor_left(&mut self) {
        if let Some(prev) = self.input[..self.cursor_position].chars().next_back() {
            self.cursor_position -= prev.len_utf8();
        }
    }

    pub fn move_cursor_right(&mut self) {
        if let Some(next) = self.input[self.cursor_position..].chars().next() {
            self.cursor_position += next.len_utf8();
        }
    }

    pub fn cursor_home(&mut self) {
        self.cursor_position = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor_position = self.input.len();
    }

    pub fn clear(&mut self) {
        self.input.clear();
        self.cursor_position = 0;
    }

    pub fn is_blank(&self) -> bool {
        self.input.trim().is_empty()
    }
}

/// Login dialog fields.
#[derive(Debug, Default)]
pub struct LoginState {
    pub username: InputState,
    pub password: InputState,
    pub focus_password: bool,
    /// A login request is in flight.
    pub pending: bool,
}

impl LoginState {
    pub fn focused_mut(&mut self) -> &mut InputState {
        if self.focus_password {
            &mut self.password
        } else {
            &mut self.username
        }
    }
}

/// Whether the file view shows content read-only or as an editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Viewing,
    Editing,
}

/// State of the single-file view.
#[derive(Debug)]
pub struct FileView {
    pub id: FileId,
    pub name: String,
    pub editor: EditorState,
    pub view_state: ViewState,
    /// Content of the commit in flight, if any.
    pub saving: Option<String>,
}

impl FileView {
    pub fn new(note: NoteFile, tab_width: usize) -> Self {
        Self {
            id: note.id,
            name: note.name,
            editor: EditorState::new(&note.content).with_tab_width(tab_width),
            view_state: ViewState::Viewing,
            saving: None,
        }
    }

    /// Switch between viewing and editing. Entering editing keeps the
    /// cursor on a line that is currently on screen.
    pub fn toggle_view_state(&mut self) {
        self.view_state = match self.view_state {
            ViewState::Viewing => {
                let editor = &mut self.editor;
                let top = editor.scroll_offset;
                let bottom = top + editor.visible_height.max(1) - 1;
                if editor.cursor_line < top || editor.cursor_line > bottom {
                    editor.cursor_line = top.min(editor.line_count().saturating_sub(1));
                    editor.cursor_col = 0;
                }
                ViewState::Editing
            }
            ViewState::Editing => ViewState::Viewing,
        };
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeField {
    Filename,
    Content,
}

/// State of the new-note form.
#[derive(Debug)]
pub struct Composer {
    pub filename: InputState,
    pub content: EditorState,
    pub focus: ComposeField,
    /// Filename and content of the commit in flight, if any.
    pub saving: Option<(String, String)>,
}

impl Composer {
    pub fn new(tab_width: usize) -> Self {
        Self {
            filename: InputState::default(),
            content: EditorState::new("").with_tab_width(tab_width),
            focus: ComposeField::Filename,
            saving: None,
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            ComposeField::Filename => ComposeField::Content,
            ComposeField::Content => ComposeField::Filename,
        };
    }

    /// Whether the form still holds exactly what was sent.
    fn matches_sent(&self, filename: &str, content: &str) -> bool {
        self.filename.input.trim() == filename && self.content.content() == content
    }
}

/// The top-level screen.
#[derive(Debug)]
pub enum View {
    Browser,
    File(FileView),
    Compose(Composer),
}

/// A transient notification.
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub is_error: bool,
    pub created: Instant,
}

/// Timings and editor settings taken from the config.
#[derive(Debug, Clone)]
pub struct Settings {
    pub toast_duration: Duration,
    pub search_debounce: Duration,
    /// `None` disables periodic refresh.
    pub git_info_refresh: Option<Duration>,
    pub tab_width: usize,
    pub use_icons: bool,
}

impl Settings {
    pub fn from_config(config: &AppConfig) -> Self {
        let refresh = config.git_info_refresh_secs();
        Self {
            toast_duration: Duration::from_secs(config.toast_secs()),
            search_debounce: Duration::from_millis(config.search_debounce_ms()),
            git_info_refresh: (refresh > 0).then(|| Duration::from_secs(refresh)),
            tab_width: config.tab_width(),
            use_icons: config.use_icons(),
        }
    }
}

/// Main application state.
pub struct App {
    pub tree: FolderTree,
    pub view: View,
    pub mode: AppMode,
    pub search: InputState,
    /// Bumped on every query change; results for older generations are dropped.
    pub search_generation: u64,
    pub login: LoginState,
    pub git_info: GitInfo,
    pub toast: Option<Toast>,
    pub help_scroll: usize,
    /// The folder listing is being fetched.
    pub loading: bool,
    pub should_quit: bool,
    pub settings: Settings,
    pub theme: ThemeColors,
    /// Inner area of the tree panel from the last render, for mouse hits.
    pub tree_area: Rect,
    pending: Vec<Action>,
    last_git_info_request: Instant,
}

impl App {
    /// Create the app and queue the initial listing and git info fetch.
    pub fn new(config: &AppConfig) -> Self {
        let mut app = Self {
            tree: FolderTree::new(Vec::new()),
            view: View::Browser,
            mode: AppMode::Normal,
            search: InputState::default(),
            search_generation: 0,
            login: LoginState {
                username: InputState::with_text(config.username()),
                ..Default::default()
            },
            git_info: GitInfo::empty(),
            toast: None,
            help_scroll: 0,
            loading: false,
            should_quit: false,
            settings: Settings::from_config(config),
            theme: resolve_theme(config.theme_scheme()),
            tree_area: Rect::default(),
            pending: Vec::new(),
            last_git_info_request: Instant::now(),
        };
        app.reload_list();
        app.refresh_git_info();
        app
    }

    // ── Action queue ──────────────────────────────────────────────────

    pub fn queue(&mut self, action: Action) {
        self.pending.push(action);
    }

    /// Drain the actions queued since the last call.
    pub fn take_actions(&mut self) -> Vec<Action> {
        std::mem::take(&mut self.pending)
    }

    #[cfg(test)]
    pub fn pending(&self) -> &[Action] {
        &self.pending
    }

    pub fn reload_list(&mut self) {
        self.loading = true;
        self.queue(Action::List);
    }

    pub fn refresh_git_info(&mut self) {
        self.last_git_info_request = Instant::now();
        self.queue(Action::GitInfo);
    }

    pub fn pull(&mut self) {
        self.set_info("Pulling…");
        self.queue(Action::Pull);
    }

    pub fn push(&mut self) {
        self.set_info("Pushing…");
        self.queue(Action::Push);
    }

    // ── Toasts ────────────────────────────────────────────────────────

    fn set_toast(&mut self, message: impl Into<String>, is_error: bool) {
        self.toast = Some(Toast {
            message: message.into(),
            is_error,
            created: Instant::now(),
        });
    }

    pub fn set_info(&mut self, message: impl Into<String>) {
        self.set_toast(message, false);
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.set_toast(message, true);
    }

    /// Drop the toast once it has been shown long enough.
    pub fn clear_expired_toast(&mut self) {
        if let Some(toast) = &self.toast {
            if toast.created.elapsed() > self.settings.toast_duration {
                self.toast = None;
            }
        }
    }

    /// Periodic housekeeping on every tick.
    pub fn on_tick(&mut self) {
        self.clear_expired_toast();
        if let Some(interval) = self.settings.git_info_refresh {
            if self.last_git_info_request.elapsed() >= interval {
                self.refresh_git_info();
            }
        }
    }

    /// Report a failed request: ask for login when the session is gone,
    /// otherwise show the error.
    fn report_error(&mut self, context: &str, err: AppError) {
        warn!(context, error = %err, "request failed");
        if err.needs_login() {
            self.open_login();
        } else {
            self.set_error(format!("{} failed: {}", context, err));
        }
    }

    // ── Dialogs ───────────────────────────────────────────────────────

    pub fn open_dialog(&mut self, kind: DialogKind) {
        self.mode = AppMode::Dialog(kind);
    }

    pub fn toggle_help(&mut self) {
        if self.mode == AppMode::Dialog(DialogKind::Help) {
            self.close_dialog();
        } else {
            self.help_scroll = 0;
            self.open_dialog(DialogKind::Help);
        }
    }

    pub fn close_dialog(&mut self) {
        self.mode = AppMode::Normal;
    }

    pub fn open_login(&mut self) {
        if self.mode == AppMode::Dialog(DialogKind::Login) {
            return;
        }
        self.login.password.clear();
        self.login.pending = false;
        self.login.focus_password = !self.login.username.is_blank();
        self.open_dialog(DialogKind::Login);
    }

    pub fn submit_login(&mut self) {
        if self.login.pending {
            return;
        }
        let username = self.login.username.input.trim().to_string();
        if username.is_empty() {
            self.set_error("Username is required");
            return;
        }
        self.login.pending = true;
        self.queue(Action::Login {
            username,
            password: self.login.password.input.clone(),
        });
    }

    // ── Browser ───────────────────────────────────────────────────────

    /// Toggle the selected row; opening a file loads it.
    pub fn activate_selected(&mut self) {
        let outcome = self.tree.toggle_selected();
        self.apply_toggle(outcome);
    }

    /// Handle a mouse click at terminal cell (`column`, `row`).
    pub fn click_at(&mut self, column: u16, row: u16) {
        let area = self.tree_area;
        let inside = column >= area.x
            && column < area.x + area.width
            && row >= area.y
            && row < area.y + area.height;
        if !inside {
            return;
        }
        if let Some(index) = self.tree.row_at_offset((row - area.y) as usize) {
            let outcome = self.tree.click_row(index);
            self.apply_toggle(outcome);
        }
    }

    fn apply_toggle(&mut self, outcome: crate::error::Result<Option<Toggled>>) {
        match outcome {
            Ok(Some(Toggled::Open(id))) => {
                debug!(file_id = %id, "opening file");
                self.queue(Action::Load(id));
            }
            Ok(_) => {}
            Err(err) => self.set_error(err.to_string()),
        }
    }

    pub fn collapse_selected(&mut self) {
        if let Err(err) = self.tree.collapse_selected() {
            self.set_error(err.to_string());
        }
    }

    pub fn expand_selected(&mut self) {
        if let Err(err) = self.tree.expand_selected() {
            self.set_error(err.to_string());
        }
    }

    // ── Search ────────────────────────────────────────────────────────

    pub fn start_search(&mut self) {
        self.mode = AppMode::Search;
    }

    pub fn finish_search(&mut self) {
        self.mode = AppMode::Normal;
    }

    /// Apply an edit to the query and schedule a debounced search.
    pub fn edit_search(&mut self, edit: impl FnOnce(&mut InputState)) {
        let before = self.search.input.clone();
        edit(&mut self.search);
        if self.search.input != before {
            self.search_changed();
        }
    }

    pub fn clear_search(&mut self) {
        if !self.search.input.is_empty() {
            self.search.clear();
            self.search_changed();
        }
    }

    /// Run the current query again after the listing changed.
    fn refresh_search(&mut self) {
        if !self.search.is_blank() {
            self.search_changed();
        }
    }

    fn search_changed(&mut self) {
        self.search_generation += 1;
        if self.search.is_blank() {
            self.tree.clear_search_results();
            return;
        }
        self.queue(Action::ScheduleSearch {
            generation: self.search_generation,
            delay: self.settings.search_debounce,
        });
    }

    /// The debounce delay for `generation` elapsed.
    pub fn on_search_due(&mut self, generation: u64) {
        if generation != self.search_generation || self.search.is_blank() {
            return;
        }
        self.queue(Action::Search {
            generation,
            query: self.search.input.clone(),
        });
    }

    // ── File view ─────────────────────────────────────────────────────

    pub fn file_view_mut(&mut self) -> Option<&mut FileView> {
        match &mut self.view {
            View::File(file) => Some(file),
            _ => None,
        }
    }

    /// Commit the open file's content.
    pub fn save_file(&mut self) {
        let Some(file) = self.file_view_mut() else {
            return;
        };
        if file.saving.is_some() {
            return;
        }
        let content = file.editor.content();
        file.saving = Some(content.clone());
        let action = Action::Edit {
            id: file.id,
            content,
        };
        self.queue(action);
    }

    /// Return to the browser, asking first if there are unsaved edits.
    pub fn leave_file(&mut self) {
        let modified = match &self.view {
            View::File(file) => file.editor.modified,
            View::Compose(composer) => {
                composer.content.modified || !composer.filename.input.is_empty()
            }
            View::Browser => return,
        };
        if modified {
            self.open_dialog(DialogKind::ConfirmDiscard);
        } else {
            self.show_browser();
        }
    }

    pub fn show_browser(&mut self) {
        self.view = View::Browser;
        self.mode = AppMode::Normal;
        self.refresh_git_info();
    }

    // ── Composer ──────────────────────────────────────────────────────

    pub fn open_composer(&mut self) {
        self.view = View::Compose(Composer::new(self.settings.tab_width));
        self.mode = AppMode::Normal;
    }

    pub fn save_composed(&mut self) {
        let View::Compose(composer) = &mut self.view else {
            return;
        };
        if composer.saving.is_some() {
            return;
        }
        let filename = composer.filename.input.trim().to_string();
        if filename.is_empty() {
            composer.focus = ComposeField::Filename;
            self.set_error("Filename is required");
            return;
        }
        let content = composer.content.content();
        composer.saving = Some((filename.clone(), content.clone()));
        self.queue(Action::Commit { filename, content });
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    // ── Request completions ───────────────────────────────────────────

    pub fn handle_api(&mut self, event: ApiEvent) {
        match event {
            ApiEvent::LoggedIn(result) => {
                self.login.pending = false;
                match result {
                    Ok(()) => {
                        self.login.password.clear();
                        self.close_dialog();
                        self.set_info("Logged in.");
                        self.reload_list();
                        self.refresh_git_info();
                    }
                    Err(err) => {
                        warn!(error = %err, "login failed");
                        self.login.password.clear();
                        self.login.focus_password = true;
                        self.set_error(format!("Login failed: {}", err));
                    }
                }
            }
            ApiEvent::Listed(result) => {
                self.loading = false;
                match result {
                    Ok(nodes) => {
                        info!(count = nodes.len(), "listing loaded");
                        self.tree.replace_roots(nodes);
                    }
                    Err(err) => self.report_error("Listing", err),
                }
            }
            ApiEvent::Searched { generation, result } => {
                if generation != self.search_generation {
                    debug!(generation, current = self.search_generation, "dropping stale search");
                    return;
                }
                match result {
                    Ok(results) => self.tree.set_search_results(results),
                    Err(err) => self.report_error("Search", err),
                }
            }
            ApiEvent::Pulled(result) => match result {
                Ok(()) => {
                    self.set_info("Pulled successfully.");
                    self.reload_list();
                    self.refresh_git_info();
                    self.refresh_search();
                }
                Err(err) => self.report_error("Pull", err),
            },
            ApiEvent::Pushed(result) => match result {
                Ok(()) => {
                    self.set_info("Pushed successfully.");
                    self.refresh_git_info();
                }
                Err(err) => self.report_error("Push", err),
            },
            ApiEvent::Loaded(result) => match result {
                Ok(note) if !matches!(self.view, View::Browser) => {
                    debug!(file = %note.name, "dropping load that finished after leaving the browser");
                }
                Ok(note) => {
                    info!(file = %note.name, "opened file");
                    self.view = View::File(FileView::new(note, self.settings.tab_width));
                    self.mode = AppMode::Normal;
                    self.refresh_git_info();
                }
                Err(err) => self.report_error("Opening file", err),
            },
            ApiEvent::Edited { id, result } => {
                let file = self.file_view_mut().filter(|f| f.id == id);
                let still_open = file.is_some();
                if let Some(file) = file {
                    let sent = file.saving.take();
                    if let (Ok(()), Some(sent)) = (&result, sent) {
                        file.editor.mark_saved(&sent);
                    }
                }
                match result {
                    Ok(()) => {
                        if !still_open {
                            debug!(file_id = %id, "commit finished after file was closed");
                        }
                        self.set_info("Committed successfully.");
                        self.refresh_git_info();
                    }
                    Err(err) => self.report_error("Commit", err),
                }
            }
            ApiEvent::Committed { filename, result } => {
                let mut unchanged = false;
                if let View::Compose(composer) = &mut self.view {
                    if let Some((sent_name, sent_content)) = composer.saving.take() {
                        unchanged = composer.matches_sent(&sent_name, &sent_content);
                    }
                }
                match result {
                    Ok(()) => {
                        info!(filename = %filename, "saved new note");
                        if unchanged {
                            self.view = View::Browser;
                        } else if matches!(self.view, View::Compose(_)) {
                            debug!(filename = %filename, "composer edited during save, staying open");
                        }
                        self.set_info("Saved note.");
                        self.reload_list();
                        self.refresh_git_info();
                        self.refresh_search();
                    }
                    Err(err) => self.report_error("Saving note", err),
                }
            }
            ApiEvent::GitInfo(result) => match result {
                Ok(info) => self.git_info = info,
                // Status info is best effort; the next refresh retries.
                Err(err) if !err.needs_login() => {
                    warn!(error = %err, "git info unavailable");
                }
                Err(err) => self.report_error("Git info", err),
            },
        }
    }
}
