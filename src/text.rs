//! Char-indexed view over a `&str`.
//!
//! Plain-text offsets are counted in chars (Unicode scalar values), while
//! `regex` and slicing work in bytes. `CharText` converts between the two.

#[derive(Debug, Clone)]
pub struct CharText<'a> {
    text: &'a str,
    /// Byte offset of every char, plus `text.len()` as a sentinel
    byte_offsets: Vec<usize>,
}

impl<'a> CharText<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut byte_offsets: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        byte_offsets.push(text.len());
        Self { text, byte_offsets }
    }

    pub fn as_str(&self) -> &'a str {
        self.text
    }

    /// Length in chars
    pub fn len(&self) -> usize {
        self.byte_offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Byte offset of char index `idx` (clamped to the end)
    pub fn byte_of(&self, idx: usize) -> usize {
        self.byte_offsets[idx.min(self.len())]
    }

    /// Char index of byte offset `byte` (rounded down to a char boundary)
    pub fn char_of(&self, byte: usize) -> usize {
        match self.byte_offsets.binary_search(&byte) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        }
    }

    /// Slice by char range (clamped)
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        let start = start.min(self.len());
        let end = end.clamp(start, self.len());
        &self.text[self.byte_of(start)..self.byte_of(end)]
    }

    pub fn char_at(&self, idx: usize) -> Option<char> {
        if idx >= self.len() {
            return None;
        }
        self.text[self.byte_of(idx)..].chars().next()
    }

    /// First char index `>= from` holding `needle`
    pub fn find_char_from(&self, needle: char, from: usize) -> Option<usize> {
        let start = self.byte_of(from);
        self.text[start..].find(needle).map(|b| self.char_of(start + b))
    }

    /// Last char index `<= upto` holding `needle`
    pub fn rfind_char_upto(&self, needle: char, upto: usize) -> Option<usize> {
        let end = self.byte_of((upto + 1).min(self.len()));
        self.text[..end].rfind(needle).map(|b| self.char_of(b))
    }
}

/// Char count of a string
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// `\w` in the JavaScript sense: ASCII letters, digits and underscore
pub fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_offsets() {
        let t = CharText::new("hello");
        assert_eq!(t.len(), 5);
        assert_eq!(t.slice(1, 3), "el");
        assert_eq!(t.char_at(4), Some('o'));
        assert_eq!(t.char_at(5), None);
    }

    #[test]
    fn test_multibyte_offsets() {
        let t = CharText::new("héllo wörld");
        assert_eq!(t.len(), 11);
        assert_eq!(t.slice(6, 11), "wörld");
        assert_eq!(t.char_of(t.byte_of(7)), 7);
        assert_eq!(t.find_char_from(' ', 0), Some(5));
        assert_eq!(t.rfind_char_upto('l', 10), Some(9));
    }

    #[test]
    fn test_slice_clamps() {
        let t = CharText::new("abc");
        assert_eq!(t.slice(2, 99), "c");
        assert_eq!(t.slice(5, 1), "");
    }
}
