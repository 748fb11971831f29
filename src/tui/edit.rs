#[derive(Debug, Default)]
pub struct InputState {
    pub buffer: String,
    pub cursor: usize,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, content: &str) {
        self.buffer = content.to_string();
        self.cursor = self.buffer.len();
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.buffer)
    }

    pub fn insert_char(&mut self, c: char) {
        self.buffer.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn backspace(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.buffer.remove(prev);
            self.cursor = prev;
        }
    }

    pub fn move_cursor_left(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.cursor = prev;
        }
    }

    pub fn move_cursor_right(&mut self) {
        if let Some(c) = self.buffer[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor = self.buffer.len();
    }

    pub fn split_at_cursor(&self) -> (&str, &str) {
        self.buffer.split_at(self.cursor)
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.buffer[..self.cursor].char_indices().next_back().map(|(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_backspace() {
        let mut input = InputState::new();
        for c in "milk".chars() {
            input.insert_char(c);
        }
        input.backspace();
        assert_eq!(input.buffer, "mil");
        assert_eq!(input.cursor, 3);
    }

    #[test]
    fn test_cursor_moves_over_multibyte_chars() {
        let mut input = InputState::new();
        input.start("café");
        input.move_cursor_left();
        assert_eq!(input.split_at_cursor(), ("caf", "é"));
        input.insert_char('ø');
        assert_eq!(input.buffer, "caføé");
        input.move_cursor_right();
        assert_eq!(input.cursor, input.buffer.len());
        input.backspace();
        assert_eq!(input.buffer, "cafø");
    }

    #[test]
    fn test_home_end_and_edges() {
        let mut input = InputState::new();
        input.backspace();
        input.move_cursor_left();
        assert_eq!(input.cursor, 0);

        input.start("abc");
        input.move_cursor_home();
        input.insert_char('>');
        assert_eq!(input.buffer, ">abc");
        input.move_cursor_end();
        input.move_cursor_right();
        assert_eq!(input.cursor, 4);
    }

    #[test]
    fn test_take_empties_buffer() {
        let mut input = InputState::new();
        input.start("walk dog");
        assert_eq!(input.take(), "walk dog");
        assert!(input.buffer.is_empty());
        assert_eq!(input.cursor, 0);
    }
}
