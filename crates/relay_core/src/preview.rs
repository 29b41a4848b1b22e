//! Text previews for records and trajectory entries.

/// Characters of response text kept on a persisted call record.
pub const RECORD_PREVIEW_CHARS: usize = 500;

/// Characters of response or result text kept on a trajectory entry.
pub const ENTRY_PREVIEW_CHARS: usize = 200;

/// Truncate `text` to `max_chars` characters, appending `"..."` when cut.
///
/// Counts characters rather than bytes, so multi-byte text is never split.
///
/// # Examples
///
/// ```
/// use relay_core::truncate_preview;
///
/// assert_eq!(truncate_preview("short", 10), "short");
/// assert_eq!(truncate_preview("abcdef", 3), "abc...");
/// assert_eq!(truncate_preview("héllo", 2), "hé...");
/// ```
pub fn truncate_preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
