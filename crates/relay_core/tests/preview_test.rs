use relay_core::{ENTRY_PREVIEW_CHARS, RECORD_PREVIEW_CHARS, truncate_preview};

#[test]
fn test_long_text_truncates_to_entry_and_record_lengths() {
    let response = "r".repeat(600);

    let entry = truncate_preview(&response, ENTRY_PREVIEW_CHARS);
    assert_eq!(entry.len(), 203);
    assert!(entry.ends_with("..."));

    let record = truncate_preview(&response, RECORD_PREVIEW_CHARS);
    assert_eq!(record.len(), 503);
    assert!(record.ends_with("..."));
}

#[test]
fn test_text_at_limit_is_untouched() {
    let exact = "x".repeat(ENTRY_PREVIEW_CHARS);
    assert_eq!(truncate_preview(&exact, ENTRY_PREVIEW_CHARS), exact);
}

#[test]
fn test_multibyte_text_counts_characters() {
    let text = "é".repeat(250);
    let preview = truncate_preview(&text, ENTRY_PREVIEW_CHARS);
    assert_eq!(preview.chars().count(), 203);
}
