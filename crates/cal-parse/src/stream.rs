//! Token supply for the grammar engine.

use crate::error::LexError;
use cal_token::span::Position;
use cal_token::token::Token;

/// Anything that can hand out tokens one at a time.
///
/// Implementations return `<EOF>` once input is exhausted; the buffer stops
/// asking after the first one.
pub trait TokenSource {
    fn next_token(&mut self) -> Result<Token, LexError>;
}

/// Adapts an already-lexed token sequence.
///
/// A missing `<EOF>` is synthesised just past the last token.
pub struct Pretokenized<I> {
    tokens: I,
    last: Position,
}

impl<I: Iterator<Item = Token>> Pretokenized<I> {
    pub fn new(tokens: impl IntoIterator<Item = Token, IntoIter = I>) -> Self {
        Self {
            tokens: tokens.into_iter(),
            last: Position::START,
        }
    }
}

impl<I: Iterator<Item = Token>> TokenSource for Pretokenized<I> {
    fn next_token(&mut self) -> Result<Token, LexError> {
        match self.tokens.next() {
            Some(tok) => {
                let width = u32::try_from(tok.lexeme.chars().count()).unwrap_or(u32::MAX);
                self.last = Position::new(
                    tok.position.line,
                    tok.position.column.saturating_add(width),
                );
                Ok(tok)
            }
            None => Ok(Token::eof(self.last)),
        }
    }
}

/// Caching lookahead buffer over a [`TokenSource`].
///
/// Every token pulled from the source is kept, so peeking at the same offset
/// twice yields the same token. Speculative scans rely on this.
pub struct TokenBuffer<S> {
    source: S,
    tokens: Vec<Token>,
    cursor: usize,
}

impl<S: TokenSource> TokenBuffer<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            tokens: Vec::new(),
            cursor: 0,
        }
    }

    /// Token `k` places ahead of the cursor; `k = 1` is the next token.
    pub fn peek(&mut self, k: usize) -> Result<&Token, LexError> {
        debug_assert!(k >= 1, "peek offsets start at 1");
        let idx = self.cursor + k - 1;
        while self.tokens.len() <= idx {
            let tok = match self.tokens.last() {
                Some(last) if last.is_eof() => last.clone(),
                _ => self.source.next_token()?,
            };
            self.tokens.push(tok);
        }
        Ok(&self.tokens[idx])
    }

    /// Consume and return the next token.
    pub fn advance(&mut self) -> Result<Token, LexError> {
        let tok = self.peek(1)?.clone();
        self.cursor += 1;
        Ok(tok)
    }

    /// Number of tokens consumed so far.
    pub fn consumed(&self) -> usize {
        self.cursor
    }
}
