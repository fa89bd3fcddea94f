//! Shared utility functions

use std::borrow::Cow;

/// Truncate a string for display, appending "..." when cut. Input that
/// already fits is borrowed unchanged; the cut point backs up to a char
/// boundary so multi-byte text never splits mid-character.
pub fn truncate_str(s: &str, max_len: usize) -> Cow<'_, str> {
    if s.len() <= max_len {
        return Cow::Borrowed(s);
    }
    let mut end = max_len.saturating_sub(3);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    Cow::Owned(format!("{}...", &s[..end]))
}
