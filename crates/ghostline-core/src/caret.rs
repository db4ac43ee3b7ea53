//! Caret snapshots and text splicing.
//!
//! Offsets here are UTF-16 code units, because that is what the DOM reports
//! for `selectionStart` and range offsets. Conversion to byte indices
//! clamps to the nearest char boundary at or before the offset.

/// Text of a surface and where the caret sits in it.
///
/// Taken fresh whenever it is needed; never cached across input events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaretState {
    pub text: String,
    /// Caret offset in UTF-16 code units.
    pub offset_before_caret: usize,
}

impl CaretState {
    pub fn new(text: impl Into<String>, offset_before_caret: usize) -> Self {
        Self {
            text: text.into(),
            offset_before_caret,
        }
    }

    /// Caret at the very end of `text`.
    pub fn at_end(text: impl Into<String>) -> Self {
        let text = text.into();
        let offset = utf16_len(&text);
        Self::new(text, offset)
    }

    /// The part of the text the provider is allowed to see.
    pub fn text_before_caret(&self) -> &str {
        let end = utf16_to_byte_index(&self.text, self.offset_before_caret);
        &self.text[..end]
    }

    /// Whether there is enough typed context to ask for a suggestion.
    ///
    /// Counted in UTF-16 units, like every other offset here.
    pub fn has_enough_context(&self, min_units: usize) -> bool {
        utf16_len(self.text_before_caret().trim()) >= min_units
    }
}

/// Length of `s` in UTF-16 code units.
pub fn utf16_len(s: &str) -> usize {
    s.chars().map(char::len_utf16).sum()
}

/// Byte index in `s` for a UTF-16 offset.
///
/// Offsets past the end clamp to `s.len()`; an offset inside a surrogate
/// pair rounds down to the start of that char.
pub fn utf16_to_byte_index(s: &str, utf16_offset: usize) -> usize {
    let mut units = 0;
    for (byte_idx, ch) in s.char_indices() {
        let next = units + ch.len_utf16();
        if next > utf16_offset {
            return byte_idx;
        }
        units = next;
    }
    s.len()
}

/// Insert `text` into `value` at a UTF-16 caret offset.
///
/// Returns the new value and the caret offset just after the inserted text.
pub fn splice_at_caret(value: &str, caret_utf16: usize, text: &str) -> (String, usize) {
    let byte_idx = utf16_to_byte_index(value, caret_utf16);
    let mut out = String::with_capacity(value.len() + text.len());
    out.push_str(&value[..byte_idx]);
    out.push_str(text);
    out.push_str(&value[byte_idx..]);
    let caret = utf16_len(&value[..byte_idx]) + utf16_len(text);
    (out, caret)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splice_hello_world() {
        let (value, caret) = splice_at_caret("Hello ", 6, "world");
        assert_eq!(value, "Hello world");
        assert_eq!(caret, 11);
    }

    #[test]
    fn splice_in_the_middle() {
        let (value, caret) = splice_at_caret("Hello !", 6, "there");
        assert_eq!(value, "Hello there!");
        assert_eq!(caret, 11);
    }

    #[test]
    fn splice_clamps_past_end() {
        let (value, caret) = splice_at_caret("ab", 99, "c");
        assert_eq!(value, "abc");
        assert_eq!(caret, 3);
    }

    #[test]
    fn utf16_offsets_with_astral_chars() {
        // '😀' is two UTF-16 units and four bytes.
        let s = "a😀b";
        assert_eq!(utf16_len(s), 4);
        assert_eq!(utf16_to_byte_index(s, 1), 1);
        assert_eq!(utf16_to_byte_index(s, 3), 5);
        // Inside the surrogate pair rounds down.
        assert_eq!(utf16_to_byte_index(s, 2), 1);
    }

    #[test]
    fn text_before_caret_is_bounded() {
        let caret = CaretState::new("Hello world", 5);
        assert_eq!(caret.text_before_caret(), "Hello");
    }

    #[test]
    fn context_gate() {
        assert!(!CaretState::at_end("Hi").has_enough_context(3));
        assert!(!CaretState::at_end("Hi ").has_enough_context(3));
        assert!(!CaretState::at_end("   Hi   ").has_enough_context(3));
        assert!(CaretState::at_end("Hil").has_enough_context(3));
        // Only text before the caret counts.
        assert!(!CaretState::new("Hi there", 2).has_enough_context(3));
    }

    #[test]
    fn context_gate_counts_utf16_units() {
        // One astral char is two units.
        assert!(CaretState::at_end("😀a").has_enough_context(3));
        assert!(!CaretState::at_end(" é ").has_enough_context(2));
        assert!(!CaretState::at_end("😀").has_enough_context(3));
    }
}
