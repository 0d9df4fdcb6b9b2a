//! Message splitting for transports with a per-message size cap
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: Count the limit in characters, as Discord does
//! - 1.0.0: Initial release

/// Discord message content limit (characters)
pub const DISCORD_MESSAGE_LIMIT: usize = 2000;

/// Split `text` into parts of at most `max_chars` characters. A part ends at
/// the last newline that fits, if any; that newline is dropped.
pub fn split_message(text: &str, max_chars: usize) -> Vec<&str> {
    let max_chars = max_chars.max(1);
    let mut parts = Vec::new();
    let mut rest = text;

    // Byte offset just past the first `max_chars` characters, if there are more
    while let Some((cut, _)) = rest.char_indices().nth(max_chars) {
        let (head, tail) = match rest[..cut].rfind('\n') {
            Some(newline) if newline > 0 => (&rest[..newline], &rest[newline + 1..]),
            _ => rest.split_at(cut),
        };
        parts.push(head);
        rest = tail;
    }

    if !rest.is_empty() || parts.is_empty() {
        parts.push(rest);
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_single_part() {
        assert_eq!(split_message("hello", 100), vec!["hello"]);
        assert_eq!(split_message("", 100), vec![""]);
    }

    #[test]
    fn test_exactly_at_limit() {
        let text = "a".repeat(100);
        assert_eq!(split_message(&text, 100), vec![text.as_str()]);
    }

    #[test]
    fn test_prefers_newlines() {
        let parts = split_message("line1\nline2\nline3", 12);
        assert_eq!(parts, vec!["line1\nline2", "line3"]);
    }

    #[test]
    fn test_long_line_is_hard_split() {
        let text = "a".repeat(100);
        let parts = split_message(&text, 30);
        assert_eq!(parts.len(), 4);
        assert!(parts.iter().all(|p| p.chars().count() <= 30));
        assert_eq!(parts.concat(), text);
    }

    #[test]
    fn test_limit_counts_characters_not_bytes() {
        // 1900 characters, 3800 bytes
        let text = "ж".repeat(1900);
        assert_eq!(split_message(&text, DISCORD_MESSAGE_LIMIT), vec![text.as_str()]);
    }

    #[test]
    fn test_multibyte_text_split_on_char_boundaries() {
        let text = "Привет, мир! ".repeat(300);
        let parts = split_message(&text, DISCORD_MESSAGE_LIMIT);
        assert_eq!(parts.len(), 2);
        assert!(parts
            .iter()
            .all(|p| p.chars().count() <= DISCORD_MESSAGE_LIMIT));
        assert_eq!(parts.concat(), text);
    }
}
