use cal_parse::{
    lex_str, parse_str, parse_tokens, ParseError, Parser, Position, Pretokenized, Token, TokenKind,
};
use std::thread;

fn tok(kind: TokenKind, column: u32) -> Token {
    Token::fixed(kind, Position::new(1, column))
}

#[test]
fn pretokenized_input_without_eof_is_completed() {
    let tokens = vec![
        tok(TokenKind::Main, 1),
        tok(TokenKind::Begin, 6),
        tok(TokenKind::Skip, 12),
        tok(TokenKind::Semicolon, 16),
        tok(TokenKind::End, 18),
    ];
    assert_eq!(parse_tokens(tokens), Ok(()));
}

#[test]
fn synthesised_eof_sits_after_the_last_token() {
    let tokens = vec![tok(TokenKind::Main, 1), tok(TokenKind::Begin, 6)];
    let err = parse_tokens(tokens).unwrap_err();
    let e = err.as_syntax().expect("syntax error");
    assert!(e.unexpected.is_eof());
    assert_eq!(e.unexpected.position, Position::new(1, 11));
}

#[test]
fn lexed_tokens_parse_like_source_text() {
    let src = "variable x : integer; main begin x := f(x) + 1; end";
    let tokens = lex_str(src).unwrap();
    assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
    assert_eq!(parse_tokens(tokens), parse_str("<mem>", src));
}

#[test]
fn parser_can_be_driven_directly() {
    let tokens = lex_str("main begin end").unwrap();
    let mut parser = Parser::new(Pretokenized::new(tokens));
    assert_eq!(parser.program(), Ok(()));
}

#[test]
fn repeated_parses_report_identical_errors() {
    let src = "main begin if x begin skip; end end";
    let first = parse_str("<mem>", src);
    let second = parse_str("<mem>", src);
    assert!(matches!(first, Err(ParseError::Syntax(_))));
    assert_eq!(first, second);
}

#[test]
fn independent_parses_run_concurrently() {
    let handles: Vec<_> = (0..8)
        .map(|i| {
            thread::spawn(move || {
                let src = if i % 2 == 0 {
                    format!("main begin x := {i}; end")
                } else {
                    format!("main begin x := {i} end")
                };
                parse_str("<thread>", &src)
            })
        })
        .collect();
    for (i, h) in handles.into_iter().enumerate() {
        let result = h.join().unwrap();
        assert_eq!(result.is_ok(), i % 2 == 0, "thread {i}: {result:?}");
    }
}

#[test]
fn eof_after_a_token_at_the_last_column_saturates() {
    let tokens = vec![
        tok(TokenKind::Main, 1),
        Token::fixed(TokenKind::Begin, Position::new(1, u32::MAX)),
    ];
    let err = parse_tokens(tokens).unwrap_err();
    let e = err.as_syntax().expect("syntax error");
    assert!(e.unexpected.is_eof());
    assert_eq!(e.unexpected.position, Position::new(1, u32::MAX));
}
