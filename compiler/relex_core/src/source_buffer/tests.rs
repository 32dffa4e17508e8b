use super::*;
use pretty_assertions::assert_eq;

// === Construction ===

#[test]
fn empty_source() {
    let buf = SourceBuffer::new("");
    assert_eq!(buf.len(), 0);
    assert!(buf.is_empty());
    assert!(buf.as_bytes().is_empty());
}

#[test]
fn ascii_source() {
    let buf = SourceBuffer::new("hello");
    assert_eq!(buf.len(), 5);
    assert!(!buf.is_empty());
    assert_eq!(buf.as_str(), "hello");
}

#[test]
fn utf8_multibyte_source() {
    let source = "hello \u{1F600} world";
    let buf = SourceBuffer::new(source);
    assert_eq!(buf.len() as usize, source.len());
    assert_eq!(buf.slice(6, 10), "\u{1F600}");
}

// === Sharing ===

#[test]
fn clone_shares_allocation() {
    let buf = SourceBuffer::new("shared");
    let other = buf.clone();
    assert!(buf.ptr_eq(&other));
    assert_eq!(buf, other);
}

#[test]
fn equal_content_separate_allocation() {
    let a = SourceBuffer::new("abc");
    let b = SourceBuffer::from(String::from("abc"));
    assert!(!a.ptr_eq(&b));
    assert_eq!(a, b);
    assert_ne!(a, SourceBuffer::new("abd"));
}

// === Access ===

#[test]
fn byte_at_past_end_is_zero() {
    let buf = SourceBuffer::new("ab");
    assert_eq!(buf.byte_at(0), b'a');
    assert_eq!(buf.byte_at(1), b'b');
    assert_eq!(buf.byte_at(2), 0);
    assert_eq!(buf.byte_at(100), 0);
}

#[test]
fn slice_extracts_range() {
    let buf = SourceBuffer::new("let x = 42");
    assert_eq!(buf.slice(4, 5), "x");
    assert_eq!(buf.slice(0, 0), "");
    assert_eq!(buf.slice(8, 10), "42");
}

#[test]
fn cursor_starts_at_requested_offset() {
    let buf = SourceBuffer::new("hello");
    let cursor = buf.cursor(2, 5);
    assert_eq!(cursor.pos(), 2);
    assert_eq!(cursor.current(), b'l');
}

#[test]
fn debug_does_not_dump_text() {
    let buf = SourceBuffer::new("secret");
    assert_eq!(format!("{buf:?}"), "SourceBuffer { len: 6 }");
}
