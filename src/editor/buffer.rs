use ropey::Rope;

/// Direction for cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Markdown source text with a cursor.
///
/// The cursor is a char index into the rope. Vertical movement remembers
/// the column it started from so crossing a short line does not lose it.
pub struct SourceBuffer {
    rope: Rope,
    cursor: usize,
    goal_col: Option<usize>,
    dirty: bool,
}

impl SourceBuffer {
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            cursor: 0,
            goal_col: None,
            dirty: false,
        }
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Logical lines; a trailing newline starts one more, empty, line.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Line `idx` without its line break.
    pub fn line_at(&self, idx: usize) -> Option<String> {
        if idx >= self.rope.len_lines() {
            return None;
        }
        let line = self.rope.line(idx).to_string();
        Some(line.trim_end_matches('\n').trim_end_matches('\r').to_string())
    }

    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub const fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Cursor as (line, char column).
    pub fn cursor(&self) -> (usize, usize) {
        let line = self.rope.char_to_line(self.cursor);
        (line, self.cursor - self.rope.line_to_char(line))
    }

    /// Cursor as (line, byte offset within the line).
    pub fn cursor_byte_col(&self) -> (usize, usize) {
        let (line, col) = self.cursor();
        let start = self.rope.line_to_byte(line);
        (line, self.rope.char_to_byte(self.rope.line_to_char(line) + col) - start)
    }

    /// Swap in new content, e.g. after the file changed on disk. The cursor
    /// stays put as far as the new text allows.
    pub fn replace(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        self.cursor = self.cursor.min(self.rope.len_chars());
        self.goal_col = None;
        self.dirty = false;
    }

    pub fn insert_char(&mut self, ch: char) {
        self.rope.insert_char(self.cursor, ch);
        self.cursor += 1;
        self.edited();
    }

    pub fn insert_str(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        self.rope.insert(self.cursor, s);
        self.cursor += s.chars().count();
        self.edited();
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    /// Backspace. Returns whether anything was removed.
    pub fn delete_back(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.rope.remove(self.cursor - 1..self.cursor);
        self.cursor -= 1;
        self.edited();
        true
    }

    /// Delete. Returns whether anything was removed.
    pub fn delete_forward(&mut self) -> bool {
        if self.cursor >= self.rope.len_chars() {
            return false;
        }
        self.rope.remove(self.cursor..=self.cursor);
        self.edited();
        true
    }

    pub fn move_cursor(&mut self, direction: Direction) {
        match direction {
            Direction::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                self.goal_col = None;
            }
            Direction::Right => {
                self.cursor = (self.cursor + 1).min(self.rope.len_chars());
                self.goal_col = None;
            }
            Direction::Up => self.move_vertical(-1),
            Direction::Down => self.move_vertical(1),
        }
    }

    pub fn move_home(&mut self) {
        let (line, _) = self.cursor();
        self.cursor = self.rope.line_to_char(line);
        self.goal_col = None;
    }

    pub fn move_end(&mut self) {
        let (line, _) = self.cursor();
        self.cursor = self.rope.line_to_char(line) + self.line_chars(line);
        self.goal_col = None;
    }

    pub const fn move_to_start(&mut self) {
        self.cursor = 0;
        self.goal_col = None;
    }

    pub fn move_to_end(&mut self) {
        self.cursor = self.rope.len_chars();
        self.goal_col = None;
    }

    fn move_vertical(&mut self, step: isize) {
        let (line, col) = self.cursor();
        let Some(target) = line.checked_add_signed(step) else {
            return;
        };
        if target >= self.rope.len_lines() {
            return;
        }
        let goal = *self.goal_col.get_or_insert(col);
        self.cursor = self.rope.line_to_char(target) + goal.min(self.line_chars(target));
    }

    /// Chars on `line`, excluding the line break.
    fn line_chars(&self, line: usize) -> usize {
        let slice = self.rope.line(line);
        let mut len = slice.len_chars();
        if len > 0 && slice.char(len - 1) == '\n' {
            len -= 1;
            if len > 0 && slice.char(len - 1) == '\r' {
                len -= 1;
            }
        }
        len
    }

    fn edited(&mut self) {
        self.dirty = true;
        self.goal_col = None;
    }
}

impl std::fmt::Debug for SourceBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceBuffer")
            .field("lines", &self.rope.len_lines())
            .field("cursor", &self.cursor)
            .field("dirty", &self.dirty)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_buffer_has_one_line() {
        let buf = SourceBuffer::from_text("");
        assert_eq!(buf.line_count(), 1);
        assert_eq!(buf.line_at(0), Some(String::new()));
        assert_eq!(buf.line_at(1), None);
    }

    #[test]
    fn test_trailing_newline_starts_empty_line() {
        let buf = SourceBuffer::from_text("hello\n");
        assert_eq!(buf.line_count(), 2);
        assert_eq!(buf.line_at(1), Some(String::new()));
    }

    #[test]
    fn test_typing_marks_dirty_until_clean() {
        let mut buf = SourceBuffer::from_text("ello");
        assert!(!buf.is_dirty());
        buf.insert_char('h');
        assert_eq!(buf.text(), "hello");
        assert!(buf.is_dirty());
        buf.mark_clean();
        assert!(!buf.is_dirty());
    }

    #[test]
    fn test_newline_splits_line() {
        let mut buf = SourceBuffer::from_text("# Title");
        buf.move_to_end();
        buf.insert_newline();
        buf.insert_str("body");
        assert_eq!(buf.text(), "# Title\nbody");
        assert_eq!(buf.cursor(), (1, 4));
    }

    #[test]
    fn test_backspace_joins_lines() {
        let mut buf = SourceBuffer::from_text("ab\ncd");
        buf.move_cursor(Direction::Down);
        assert!(buf.delete_back());
        assert_eq!(buf.text(), "abcd");
        assert_eq!(buf.cursor(), (0, 2));
    }

    #[test]
    fn test_delete_at_edges_is_noop() {
        let mut buf = SourceBuffer::from_text("x");
        assert!(!buf.delete_back());
        buf.move_to_end();
        assert!(!buf.delete_forward());
        assert!(!buf.is_dirty());
    }

    #[test]
    fn test_vertical_movement_keeps_goal_column() {
        let mut buf = SourceBuffer::from_text("abcdef\nab\nabcdef");
        buf.move_end();
        buf.move_cursor(Direction::Down);
        assert_eq!(buf.cursor(), (1, 2));
        buf.move_cursor(Direction::Down);
        assert_eq!(buf.cursor(), (2, 6));
    }

    #[test]
    fn test_vertical_movement_stops_at_edges() {
        let mut buf = SourceBuffer::from_text("a\nb");
        buf.move_cursor(Direction::Up);
        assert_eq!(buf.cursor(), (0, 0));
        buf.move_to_end();
        buf.move_cursor(Direction::Down);
        assert_eq!(buf.cursor(), (1, 1));
    }

    #[test]
    fn test_home_and_end_stay_on_line() {
        let mut buf = SourceBuffer::from_text("one\ntwo\r\nthree");
        buf.move_cursor(Direction::Down);
        buf.move_end();
        assert_eq!(buf.cursor(), (1, 3));
        buf.move_home();
        assert_eq!(buf.cursor(), (1, 0));
    }

    #[test]
    fn test_multibyte_byte_column() {
        let mut buf = SourceBuffer::from_text("日本");
        buf.move_cursor(Direction::Right);
        assert_eq!(buf.cursor(), (0, 1));
        assert_eq!(buf.cursor_byte_col(), (0, 3));
    }

    #[test]
    fn test_replace_clamps_cursor_and_cleans() {
        let mut buf = SourceBuffer::from_text("a long line");
        buf.move_to_end();
        buf.insert_char('!');
        buf.replace("short");
        assert_eq!(buf.cursor(), (0, 5));
        assert!(!buf.is_dirty());
    }
}
