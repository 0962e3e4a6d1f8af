use crate::error::LexError;
use crate::stream::TokenSource;
use cal_token::span::Position;
use cal_token::token::{Token, TokenKind};

pub struct Lexer<'a> {
    src: &'a [u8],
    text: &'a str,
    pos: usize,
    line: u32,
    column: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src: src.as_bytes(),
            text: src,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn bump(&mut self) -> Option<u8> {
        let b = *self.src.get(self.pos)?;
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
            self.column = 1;
        } else if is_char_start(b) {
            self.column += 1;
        }
        Some(b)
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }
    fn peek2(&self) -> Option<u8> {
        self.src.get(self.pos + 1).copied()
    }

    fn here(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn skip_ws_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n' | b'\x0c')) {
                self.bump();
            }
            // line comment: //
            if self.peek() == Some(b'/') && self.peek2() == Some(b'/') {
                while let Some(b) = self.peek() {
                    if b == b'\n' {
                        break;
                    }
                    self.bump();
                }
                continue;
            }
            // block comment: /* ... */, nesting allowed
            if self.peek() == Some(b'/') && self.peek2() == Some(b'*') {
                let opened = self.here();
                self.bump();
                self.bump();
                let mut depth = 1usize;
                while depth > 0 {
                    match (self.peek(), self.peek2()) {
                        (Some(b'/'), Some(b'*')) => {
                            self.bump();
                            self.bump();
                            depth += 1;
                        }
                        (Some(b'*'), Some(b'/')) => {
                            self.bump();
                            self.bump();
                            depth -= 1;
                        }
                        (Some(_), _) => {
                            self.bump();
                        }
                        (None, _) => {
                            return Err(LexError::UnterminatedComment { position: opened });
                        }
                    }
                }
                continue;
            }
            return Ok(());
        }
    }

    pub fn next_tok(&mut self) -> Result<Token, LexError> {
        self.skip_ws_and_comments()?;
        let start = self.pos;
        let at = self.here();
        let Some(b) = self.bump() else {
            return Ok(Token::eof(at));
        };

        // 2-char operators first
        let pair = match (b, self.peek()) {
            (b':', Some(b'=')) => Some(TokenKind::Assign),
            (b'<', Some(b'>')) => Some(TokenKind::NotEqual),
            (b'<', Some(b'=')) => Some(TokenKind::LessEqual),
            (b'>', Some(b'=')) => Some(TokenKind::GreaterEqual),
            _ => None,
        };
        if let Some(kind) = pair {
            self.bump();
            return Ok(Token::fixed(kind, at));
        }

        // negative literal: '-' glued to a non-zero digit
        if b == b'-' && matches!(self.peek(), Some(b'1'..=b'9')) {
            self.eat_digits();
            return Ok(self.lexeme(TokenKind::Number, start, at));
        }

        // 1-char punctuation/operators
        let single = match b {
            b'(' => Some(TokenKind::LParen),
            b')' => Some(TokenKind::RParen),
            b',' => Some(TokenKind::Comma),
            b':' => Some(TokenKind::Colon),
            b';' => Some(TokenKind::Semicolon),
            b'+' => Some(TokenKind::Plus),
            b'-' => Some(TokenKind::Minus),
            b'=' => Some(TokenKind::Equal),
            b'<' => Some(TokenKind::Less),
            b'>' => Some(TokenKind::Greater),
            _ => None,
        };
        if let Some(kind) = single {
            return Ok(Token::fixed(kind, at));
        }

        // number: 0 | [1-9][0-9]*
        if b == b'0' {
            return Ok(self.lexeme(TokenKind::Number, start, at));
        }
        if b.is_ascii_digit() {
            self.eat_digits();
            return Ok(self.lexeme(TokenKind::Number, start, at));
        }

        // ident / keywords
        if b.is_ascii_alphabetic() {
            while matches!(self.peek(), Some(p) if p.is_ascii_alphanumeric() || p == b'_') {
                self.bump();
            }
            let text = &self.text[start..self.pos];
            let kind = TokenKind::keyword(text).unwrap_or(TokenKind::Identifier);
            return Ok(Token::new(kind, text, at));
        }

        let ch = self.text[start..].chars().next().unwrap_or(char::REPLACEMENT_CHARACTER);
        Err(LexError::UnexpectedChar { ch, position: at })
    }

    fn eat_digits(&mut self) {
        while matches!(self.peek(), Some(p) if p.is_ascii_digit()) {
            self.bump();
        }
    }

    fn lexeme(&self, kind: TokenKind, start: usize, at: Position) -> Token {
        Token::new(kind, &self.text[start..self.pos], at)
    }
}

impl TokenSource for Lexer<'_> {
    fn next_token(&mut self) -> Result<Token, LexError> {
        self.next_tok()
    }
}

/// Columns count characters, not bytes: UTF-8 continuation bytes don't advance.
fn is_char_start(b: u8) -> bool {
    b & 0xC0 != 0x80
}

/// Lex `src` to completion. The last token is always `<EOF>`.
pub fn lex_str(src: &str) -> Result<Vec<Token>, LexError> {
    let mut lex = Lexer::new(src);
    let mut out = Vec::new();
    loop {
        let tok = lex.next_tok()?;
        let done = tok.is_eof();
        out.push(tok);
        if done {
            return Ok(out);
        }
    }
}
