use super::*;
use crate::SourceBuffer;
use pretty_assertions::assert_eq;

// === Basic Navigation ===

#[test]
fn current_returns_first_byte() {
    let buf = SourceBuffer::new("abc");
    let cursor = buf.cursor(0, buf.len());
    assert_eq!(cursor.current(), b'a');
}

#[test]
fn advance_through_window() {
    let buf = SourceBuffer::new("hi");
    let mut cursor = buf.cursor(0, buf.len());
    assert_eq!(cursor.current(), b'h');
    cursor.advance();
    assert_eq!(cursor.current(), b'i');
    cursor.advance();
    assert!(cursor.is_eof());
    assert_eq!(cursor.current(), 0);
}

#[test]
fn window_end_hides_trailing_bytes() {
    let buf = SourceBuffer::new("abcdef");
    let mut cursor = buf.cursor(1, 3);
    assert_eq!(cursor.current(), b'b');
    assert_eq!(cursor.peek(), b'c');
    assert_eq!(cursor.peek2(), 0);
    cursor.advance_n(2);
    assert!(cursor.is_eof());
}

#[test]
fn end_is_clamped_to_buffer() {
    let buf = SourceBuffer::new("ab");
    let cursor = buf.cursor(0, 50);
    assert_eq!(cursor.end(), 2);
}

#[test]
fn interior_null_is_not_eof() {
    let buf = SourceBuffer::new("a\0b");
    let mut cursor = buf.cursor(0, buf.len());
    cursor.advance();
    assert_eq!(cursor.current(), 0);
    assert!(!cursor.is_eof());
}

// === Eating ===

#[test]
fn eat_while_stops_at_predicate() {
    let buf = SourceBuffer::new("abc123");
    let mut cursor = buf.cursor(0, buf.len());
    cursor.eat_while(|b| b.is_ascii_alphabetic());
    assert_eq!(cursor.pos(), 3);
}

#[test]
fn eat_while_stops_at_window_end() {
    let buf = SourceBuffer::new("aaaa");
    let mut cursor = buf.cursor(0, 2);
    cursor.eat_while(|b| b == b'a');
    assert_eq!(cursor.pos(), 2);
}

#[test]
fn advance_char_skips_multibyte() {
    let buf = SourceBuffer::new("\u{3bb}x");
    let mut cursor = buf.cursor(0, buf.len());
    cursor.advance_char();
    assert_eq!(cursor.pos(), 2);
    assert_eq!(cursor.current(), b'x');
}

#[test]
fn advance_char_at_end_stays_put() {
    let buf = SourceBuffer::new("a");
    let mut cursor = buf.cursor(1, 1);
    cursor.advance_char();
    assert_eq!(cursor.pos(), 1);
}

// === Delimiter Search ===

#[test]
fn skip_to_either_finds_nearest() {
    let buf = SourceBuffer::new(r#"abc\de"f"#);
    let mut cursor = buf.cursor(0, buf.len());
    assert_eq!(cursor.skip_to_either(b'"', b'\\'), b'\\');
    assert_eq!(cursor.pos(), 3);
}

#[test]
fn skip_to_either_respects_window() {
    let buf = SourceBuffer::new("abc\"");
    let mut cursor = buf.cursor(0, 3);
    assert_eq!(cursor.skip_to_either(b'"', b'\\'), 0);
    assert_eq!(cursor.pos(), 3);
}

#[test]
fn skip_to_any4_uses_fourth_needle() {
    let buf = SourceBuffer::new("abc\rdef\n");
    let mut cursor = buf.cursor(0, buf.len());
    assert_eq!(cursor.skip_to_any4(b'"', b'\\', b'\n', b'\r'), b'\r');
    assert_eq!(cursor.pos(), 3);
}

#[test]
fn earliest_of_combinations() {
    assert_eq!(earliest_of(Some(3), Some(1)), Some(1));
    assert_eq!(earliest_of(None, Some(4)), Some(4));
    assert_eq!(earliest_of(Some(2), None), Some(2));
    assert_eq!(earliest_of(None, None), None);
}

// === Property tests ===

mod proptest_skip {
    use crate::SourceBuffer;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn skip_to_either_matches_scalar(text in "[ab\"\\\\x]{0,64}") {
            let buf = SourceBuffer::new(&text);
            let mut cursor = buf.cursor(0, buf.len());
            let found = cursor.skip_to_either(b'"', b'\\');
            let expected = text.bytes().position(|b| b == b'"' || b == b'\\');
            match expected {
                Some(pos) => {
                    prop_assert_eq!(cursor.pos() as usize, pos);
                    prop_assert_eq!(found, text.as_bytes()[pos]);
                }
                None => {
                    prop_assert_eq!(cursor.pos() as usize, text.len());
                    prop_assert_eq!(found, 0);
                }
            }
        }
    }
}
