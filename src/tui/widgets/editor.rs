use std::cmp;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditOperation {
    InsertChar { col: usize, ch: char },
    DeleteChar { col: usize, ch: char },
}

/// Single-line text input with a character cursor and an undo history.
#[derive(Debug, Clone)]
pub struct Editor {
    chars: Vec<char>,
    pub cursor_col: usize,
    undo_stack: Vec<EditOperation>,
    max_history: usize,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    pub fn new() -> Self {
        Self {
            chars: Vec::new(),
            cursor_col: 0,
            undo_stack: Vec::new(),
            max_history: 100,
        }
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn insert_char(&mut self, ch: char) {
        if ch == '\n' || ch == '\r' {
            return;
        }
        let col = cmp::min(self.cursor_col, self.chars.len());
        self.chars.insert(col, ch);
        self.cursor_col = col + 1;
        self.add_to_undo(EditOperation::InsertChar { col, ch });
    }

    /// Backspace
    pub fn delete_char(&mut self) {
        let col = cmp::min(self.cursor_col, self.chars.len());
        if col == 0 {
            return;
        }
        let ch = self.chars.remove(col - 1);
        self.cursor_col = col - 1;
        self.add_to_undo(EditOperation::DeleteChar { col: col - 1, ch });
    }

    /// Delete key
    pub fn delete_char_forward(&mut self) {
        let col = cmp::min(self.cursor_col, self.chars.len());
        if col >= self.chars.len() {
            return;
        }
        let ch = self.chars.remove(col);
        self.add_to_undo(EditOperation::DeleteChar { col, ch });
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor_col = self.cursor_col.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        self.cursor_col = cmp::min(self.cursor_col + 1, self.chars.len());
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor_col = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor_col = self.chars.len();
    }

    pub fn move_cursor_word_left(&mut self) {
        let mut pos = cmp::min(self.cursor_col, self.chars.len());
        while pos > 0 && self.chars[pos - 1].is_whitespace() {
            pos -= 1;
        }
        while pos > 0 && is_word_char(self.chars[pos - 1]) {
            pos -= 1;
        }
        // Punctuation run counts as one word
        if pos == self.cursor_col && pos > 0 {
            pos -= 1;
        }
        self.cursor_col = pos;
    }

    pub fn move_cursor_word_right(&mut self) {
        let len = self.chars.len();
        let mut pos = cmp::min(self.cursor_col, len);
        while pos < len && is_word_char(self.chars[pos]) {
            pos += 1;
        }
        while pos < len && self.chars[pos].is_whitespace() {
            pos += 1;
        }
        if pos == self.cursor_col && pos < len {
            pos += 1;
        }
        self.cursor_col = pos;
    }

    fn add_to_undo(&mut self, op: EditOperation) {
        self.undo_stack.push(op);
        if self.undo_stack.len() > self.max_history {
            self.undo_stack.remove(0);
        }
    }

    pub fn undo(&mut self) -> bool {
        let Some(op) = self.undo_stack.pop() else {
            return false;
        };
        match op {
            EditOperation::InsertChar { col, ch } => {
                if self.chars.get(col) == Some(&ch) {
                    self.chars.remove(col);
                    self.cursor_col = col;
                }
            }
            EditOperation::DeleteChar { col, ch } => {
                if col <= self.chars.len() {
                    self.chars.insert(col, ch);
                    self.cursor_col = col + 1;
                }
            }
        }
        true
    }

    /// The slice of text that fits in `width` columns with the cursor kept visible,
    /// plus the cursor's column inside that slice. `mask` replaces every character.
    pub fn visible(&self, width: usize, mask: Option<char>) -> (String, usize) {
        if width == 0 {
            return (String::new(), 0);
        }
        let cursor = cmp::min(self.cursor_col, self.chars.len());
        let start = cursor.saturating_sub(width - 1);
        let end = cmp::min(start + width, self.chars.len());
        let text = match mask {
            Some(m) => std::iter::repeat_n(m, end - start).collect(),
            None => self.chars[start..end].iter().collect(),
        };
        (text, cursor - start)
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}
