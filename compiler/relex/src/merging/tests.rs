use super::*;
use crate::test_support::{
    render, tok, toy_lexer, ToyScanner, COMMENT, IDENT, IN_COMMENT, LPAREN, NUMBER, RPAREN, WS,
};
use crate::FlexAdapter;
use pretty_assertions::assert_eq;
use relex_core::collect_tokens;

const GROUP: TokenType = TokenType::new(TokenType::FIRST_USER_ID + 40, "GROUP");

fn comment_merger() -> MergingLexer<FlexAdapter<ToyScanner>> {
    MergingLexer::with_token_set(toy_lexer(), TokenSet::of(&[COMMENT, WS]))
}

/// Folds a parenthesized run, parens included, into one `GROUP` token.
fn fold_group(token_type: TokenType, base: &mut dyn Lexer) -> TokenType {
    if token_type != LPAREN {
        return token_type;
    }
    while let Some(ty) = base.token_type() {
        base.advance();
        if ty == RPAREN {
            break;
        }
    }
    GROUP
}

// === Token set policy ===

#[test]
fn merges_comment_lines_into_one_token() {
    let buf = SourceBuffer::new("a /* x\ny */  b");
    let mut lexer = comment_merger();
    lexer.start_all(buf.clone());
    let tokens = collect_tokens(&mut lexer);
    assert_eq!(
        render(&buf, &tokens),
        vec![
            tok(IDENT, "a"),
            tok(WS, " "),
            tok(COMMENT, "/* x\ny */"),
            tok(WS, "  "),
            tok(IDENT, "b"),
        ]
    );
    assert!(tokens.iter().all(|t| t.state == 0));
}

#[test]
fn types_outside_set_are_not_merged() {
    let buf = SourceBuffer::new("1 2");
    let mut lexer = MergingLexer::with_token_set(toy_lexer(), TokenSet::of(&[WS]));
    lexer.start_all(buf.clone());
    let tokens = collect_tokens(&mut lexer);
    assert_eq!(
        render(&buf, &tokens),
        vec![tok(NUMBER, "1"), tok(WS, " "), tok(NUMBER, "2")]
    );
}

#[test]
fn merge_runs_to_end_of_range() {
    let buf = SourceBuffer::new("x /* open\nstill\nopen");
    let mut lexer = comment_merger();
    lexer.start_all(buf.clone());
    lexer.advance();
    lexer.advance();
    assert_eq!(lexer.token_type(), Some(COMMENT));
    assert_eq!(lexer.token_text(), "/* open\nstill\nopen");
    assert_eq!(lexer.token_end(), buf.len());
    lexer.advance();
    assert_eq!(lexer.token_type(), None);
}

#[test]
fn empty_range_has_no_token() {
    let mut lexer = comment_merger();
    lexer.start(SourceBuffer::new("abc"), 2, 2, 0);
    assert_eq!(lexer.token_type(), None);
}

#[test]
fn start_inside_comment_merges_tail() {
    let buf = SourceBuffer::new("/* a\nb\nc */ d");
    let mut lexer = comment_merger();
    lexer.start(buf.clone(), 5, buf.len(), IN_COMMENT);
    assert_eq!(lexer.token_type(), Some(COMMENT));
    assert_eq!(lexer.token_text(), "b\nc */");
    assert_eq!(lexer.state(), IN_COMMENT);
}

// === Custom merge functions ===

#[test]
fn function_policy_folds_groups() {
    let buf = SourceBuffer::new("f(a, 1) g");
    let mut lexer = MergingLexer::new(toy_lexer(), fold_group);
    lexer.start_all(buf.clone());
    let tokens = collect_tokens(&mut lexer);
    assert_eq!(
        render(&buf, &tokens),
        vec![
            tok(IDENT, "f"),
            tok(GROUP, "(a, 1)"),
            tok(WS, " "),
            tok(IDENT, "g"),
        ]
    );
}

#[test]
fn closure_policy_is_accepted() {
    let buf = SourceBuffer::new("1 2 3");
    let merge_all = |ty: TokenType, base: &mut dyn Lexer| {
        while base.token_type().is_some() {
            base.advance();
        }
        ty
    };
    let mut lexer = MergingLexer::new(toy_lexer(), merge_all);
    lexer.start_all(buf.clone());
    let tokens = collect_tokens(&mut lexer);
    assert_eq!(render(&buf, &tokens), vec![tok(NUMBER, "1 2 3")]);
}

// === Positions ===

#[test]
fn position_carries_base_position() {
    let buf = SourceBuffer::new("a /* x\ny */  b");
    let mut lexer = comment_merger();
    lexer.start_all(buf);
    lexer.advance();
    lexer.advance();
    let position = lexer.current_position();
    assert_eq!(position.offset(), 2);
    let pending = position.pending().map(|p| (p.token_type, p.delegate.offset()));
    assert_eq!(pending, Some((Some(COMMENT), 11)));
}

#[test]
fn restore_reproduces_tail() {
    let buf = SourceBuffer::new("a /* x\ny */  b (c)");
    let mut lexer = comment_merger();
    lexer.start_all(buf.clone());
    let full = collect_tokens(&mut lexer);

    for index in 0..full.len() {
        lexer.start_all(buf.clone());
        for _ in 0..index {
            lexer.advance();
        }
        let position = lexer.current_position();
        lexer.advance();
        lexer.restore(&position);
        assert_eq!(collect_tokens(&mut lexer), full[index..].to_vec(), "index {index}");
    }
}

#[test]
fn restore_without_pending_restarts_base() {
    let buf = SourceBuffer::new("a  b");
    let mut lexer = comment_merger();
    lexer.start_all(buf.clone());
    let _ = collect_tokens(&mut lexer);
    lexer.restore(&LexerPosition::new(1, 0));
    assert_eq!(render(&buf, &collect_tokens(&mut lexer)), vec![tok(WS, "  "), tok(IDENT, "b")]);
}

#[test]
fn exposes_base() {
    let mut lexer = comment_merger();
    lexer.start_all(SourceBuffer::new("a b"));
    assert_eq!(lexer.base().token_start(), 1);
    let base = lexer.into_base();
    assert_eq!(base.token_type(), Some(WS));
}
