/// Snapshot of the buffer taken before an edit, for undo.
#[derive(Debug, Clone)]
struct Snapshot {
    buffer: Vec<String>,
    cursor_line: usize,
    cursor_col: usize,
}

/// Kind of the last edit, so runs of typing undo as one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditKind {
    Insert,
    Delete,
    Other,
}

/// Maximum entries in the undo stack.
const MAX_UNDO_ENTRIES: usize = 200;

/// Multi-line text buffer with a cursor, used for editing note content.
///
/// Columns count characters, not bytes.
#[derive(Debug)]
pub struct EditorState {
    /// Lines of text in the buffer. Never empty.
    pub buffer: Vec<String>,
    pub cursor_line: usize,
    pub cursor_col: usize,
    /// Whether the buffer changed since it was loaded or last marked saved.
    pub modified: bool,
    /// Line index of the topmost visible line.
    pub scroll_offset: usize,
    /// Visible height of the editor area (set during render).
    pub visible_height: usize,
    pub tab_width: usize,
    /// Buffer as last loaded or confirmed saved.
    saved: Vec<String>,
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    last_edit: EditKind,
}

impl EditorState {
    pub fn new(content: &str) -> Self {
        // `split('\n')` keeps a trailing empty line so a final newline
        // survives the round trip through `content()`.
        let buffer: Vec<String> = content.split('\n').map(String::from).collect();

        Self {
            saved: buffer.clone(),
            buffer,
            cursor_line: 0,
            cursor_col: 0,
            modified: false,
            scroll_offset: 0,
            visible_height: 24,
            tab_width: 4,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            last_edit: EditKind::Other,
        }
    }

    pub fn with_tab_width(mut self, tab_width: usize) -> Self {
        self.tab_width = tab_width.max(1);
        self
    }

    /// The full buffer joined back into a string.
    pub fn content(&self) -> String {
        self.buffer.join("\n")
    }

    pub fn line_count(&self) -> usize {
        self.buffer.len()
    }

    /// Record that `content` was saved. The buffer stays modified if it
    /// changed after `content` was taken.
    pub fn mark_saved(&mut self, content: &str) {
        self.saved = content.split('\n').map(String::from).collect();
        self.modified = self.buffer != self.saved;
    }

    fn line_len(&self, line: usize) -> usize {
        self.buffer.get(line).map(|l| l.chars().count()).unwrap_or(0)
    }

    pub fn current_line_len(&self) -> usize {
        self.line_len(self.cursor_line)
    }

    fn clamp_cursor(&mut self) {
        if self.cursor_line >= self.buffer.len() {
            self.cursor_line = self.buffer.len().saturating_sub(1);
        }
        self.cursor_col = self.cursor_col.min(self.current_line_len());
    }

    /// Scroll so the cursor stays inside the viewport with a small margin.
    pub fn ensure_cursor_visible(&mut self) {
        let margin = 2usize;
        if self.visible_height == 0 {
            return;
        }
        if self.cursor_line < self.scroll_offset + margin {
            self.scroll_offset = self.cursor_line.saturating_sub(margin);
        }
        let bottom = self.scroll_offset + self.visible_height;
        if self.cursor_line >= bottom.saturating_sub(margin) {
            self.scroll_offset = self
                .cursor_line
                .saturating_sub(self.visible_height.saturating_sub(margin + 1));
        }
    }

    // ── Undo/Redo ─────────────────────────────────────────────────────

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            buffer: self.buffer.clone(),
            cursor_line: self.cursor_line,
            cursor_col: self.cursor_col,
        }
    }

    /// Record the pre-edit state unless this edit continues a run of the
    /// same kind.
    fn begin_edit(&mut self, kind: EditKind) {
        if kind == EditKind::Other || kind != self.last_edit {
            self.undo_stack.push(self.snapshot());
            if self.undo_stack.len() > MAX_UNDO_ENTRIES {
                self.undo_stack.remove(0);
            }
        }
        self.redo_stack.clear();
        self.last_edit = kind;
        self.modified = true;
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.buffer = snapshot.buffer;
        self.cursor_line = snapshot.cursor_line;
        self.cursor_col = snapshot.cursor_col;
        self.last_edit = EditKind::Other;
        self.modified = self.buffer != self.saved;
        self.clamp_cursor();
        self.ensure_cursor_visible();
    }

    pub fn undo(&mut self) {
        if let Some(snapshot) = self.undo_stack.pop() {
            self.redo_stack.push(self.snapshot());
            self.restore(snapshot);
        }
    }

    pub fn redo(&mut self) {
        if let Some(snapshot) = self.redo_stack.pop() {
            self.undo_stack.push(self.snapshot());
            self.restore(snapshot);
        }
    }

    // ── Buffer mutation ───────────────────────────────────────────────

    pub fn insert_char(&mut self, ch: char) {
        self.begin_edit(if ch.is_whitespace() {
            EditKind::Other
        } else {
            EditKind::Insert
        });
        let col = self.cursor_col;
        if let Some(line) = self.buffer.get_mut(self.cursor_line) {
            let byte_idx = char_to_byte_index(line, col);
            line.insert(byte_idx, ch);
            self.cursor_col += 1;
        }
    }

    /// Insert spaces up to the next tab stop.
    pub fn insert_tab(&mut self) {
        let spaces = self.tab_width - (self.cursor_col % self.tab_width);
        for _ in 0..spaces {
            self.insert_char(' ');
        }
    }

    /// Backspace: delete the character before the cursor, joining lines at
    /// column zero.
    pub fn delete_char_before(&mut self) {
        if self.cursor_col > 0 {
            self.begin_edit(EditKind::Delete);
            let col = self.cursor_col - 1;
            let line = &mut self.buffer[self.cursor_line];
            let byte_idx = char_to_byte_index(line, col);
            line.remove(byte_idx);
            self.cursor_col = col;
        } else if self.cursor_line > 0 {
            self.begin_edit(EditKind::Other);
            let current = self.buffer.remove(self.cursor_line);
            self.cursor_line -= 1;
            self.cursor_col = self.current_line_len();
            self.buffer[self.cursor_line].push_str(&current);
            self.ensure_cursor_visible();
        }
    }

    /// Delete: remove the character at the cursor, joining the next line at
    /// end of line.
    pub fn delete_char_at(&mut self) {
        if self.cursor_col < self.current_line_len() {
            self.begin_edit(EditKind::Delete);
            let col = self.cursor_col;
            let line = &mut self.buffer[self.cursor_line];
            let byte_idx = char_to_byte_index(line, col);
            line.remove(byte_idx);
        } else if self.cursor_line + 1 < self.buffer.len() {
            self.begin_edit(EditKind::Other);
            let next = self.buffer.remove(self.cursor_line + 1);
            self.buffer[self.cursor_line].push_str(&next);
        }
    }

    /// Split the current line at the cursor, carrying its indentation over.
    pub fn insert_newline(&mut self) {
        self.begin_edit(EditKind::Other);
        let line = &mut self.buffer[self.cursor_line];
        let indent: String = line.chars().take_while(|c| *c == ' ' || *c == '\t').collect();
        let byte_idx = char_to_byte_index(line, self.cursor_col);
        let remainder = line.split_off(byte_idx);

        self.buffer
            .insert(self.cursor_line + 1, format!("{}{}", indent, remainder));
        self.cursor_line += 1;
        self.cursor_col = indent.chars().count();
        self.ensure_cursor_visible();
    }

    // ── Navigation ────────────────────────────────────────────────────

    pub fn move_up(&mut self) {
        if self.cursor_line > 0 {
            self.cursor_line -= 1;
            self.clamp_cursor();
            self.ensure_cursor_visible();
        }
    }

    pub fn move_down(&mut self) {
        if self.cursor_line + 1 < self.buffer.len() {
            self.cursor_line += 1;
            self.clamp_cursor();
            self.ensure_cursor_visible();
        }
    }

    pub fn move_left(&mut self) {
        if self.cursor_col > 0 {
            self.cursor_col -= 1;
        } else if self.cursor_line > 0 {
            self.cursor_line -= 1;
            self.cursor_col = self.current_line_len();
            self.ensure_cursor_visible();
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor_col < self.current_line_len() {
            self.cursor_col += 1;
        } else if self.cursor_line + 1 < self.buffer.len() {
            self.cursor_line += 1;
            self.cursor_col = 0;
            self.ensure_cursor_visible();
        }
    }

    pub fn move_home(&mut self) {
        self.cursor_col = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor_col = self.current_line_len();
    }

    pub fn move_to_top(&mut self) {
        self.cursor_line = 0;
        self.cursor_col = 0;
        self.ensure_cursor_visible();
    }

    pub fn move_to_bottom(&mut self) {
        self.cursor_line = self.buffer.len().saturating_sub(1);
        self.clamp_cursor();
        self.ensure_cursor_visible();
    }

    pub fn page_up(&mut self) {
        let jump = self.visible_height.max(1);
        self.cursor_line = self.cursor_line.saturating_sub(jump);
        self.clamp_cursor();
        self.ensure_cursor_visible();
    }

    pub fn page_down(&mut self) {
        let jump = self.visible_height.max(1);
        self.cursor_line = (self.cursor_line + jump).min(self.buffer.len().saturating_sub(1));
        self.clamp_cursor();
        self.ensure_cursor_visible();
    }

    /// Scroll the viewport without moving the cursor (read-only viewing).
    pub fn scroll_by(&mut self, delta: isize) {
        let max = self.buffer.len().saturating_sub(1);
        self.scroll_offset = self.scroll_offset.saturating_add_signed(delta).min(max);
    }
}

/// Convert a character column to a byte index within `line`.
fn char_to_byte_index(line: &str, col: usize) -> usize {
    line.char_indices()
        .nth(col)
        .map(|(i, _)| i)
        .unwrap_or(line.len())
}
