use cal_token::span::Position;
use cal_token::token::{Token, TokenKind};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// Malformed character input. Always fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LexError {
    #[error("Lexical error at {position}: unexpected character {ch:?}")]
    UnexpectedChar { ch: char, position: Position },

    #[error("Lexical error at {position}: unterminated block comment")]
    UnterminatedComment { position: Position },
}

/// First point at which the token stream stopped matching the grammar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyntaxError {
    pub unexpected: Token,
    pub expected: BTreeSet<TokenKind>,
}

impl SyntaxError {
    pub fn expects(&self, kind: TokenKind) -> bool {
        self.expected.contains(&kind)
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tok = &self.unexpected;
        if tok.is_eof() {
            write!(f, "Encountered {} at {}.", TokenKind::Eof, tok.position)?;
        } else {
            write!(f, "Encountered \"{}\" at {}.", tok.lexeme, tok.position)?;
        }
        match self.expected.len() {
            0 => Ok(()),
            1 => write!(f, "\nWas expecting:\n    {} ...", first(&self.expected)),
            _ => {
                f.write_str("\nWas expecting one of:")?;
                for kind in &self.expected {
                    write!(f, "\n    {kind} ...")?;
                }
                Ok(())
            }
        }
    }
}

fn first(set: &BTreeSet<TokenKind>) -> TokenKind {
    set.iter().next().copied().unwrap_or(TokenKind::Eof)
}

impl std::error::Error for SyntaxError {}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error("Nesting depth exceeds {limit} at {position}")]
    TooDeep { limit: usize, position: Position },
}

impl ParseError {
    pub fn as_syntax(&self) -> Option<&SyntaxError> {
        match self {
            ParseError::Syntax(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(kind: TokenKind, lexeme: &str) -> Token {
        Token::new(kind, lexeme, Position::new(3, 7))
    }

    #[test]
    fn display_lists_every_expected_kind_in_order() {
        let err = SyntaxError {
            unexpected: tok(TokenKind::Semicolon, ";"),
            expected: [TokenKind::Identifier, TokenKind::Minus, TokenKind::True]
                .into_iter()
                .collect(),
        };
        assert_eq!(
            err.to_string(),
            "Encountered \";\" at line 3, column 7.\n\
             Was expecting one of:\n    \"true\" ...\n    \"-\" ...\n    <ID> ..."
        );
    }

    #[test]
    fn display_uses_singular_form_for_one_kind() {
        let err = SyntaxError {
            unexpected: tok(TokenKind::Eof, ""),
            expected: [TokenKind::End].into_iter().collect(),
        };
        assert_eq!(
            err.to_string(),
            "Encountered <EOF> at line 3, column 7.\nWas expecting:\n    \"end\" ..."
        );
    }

    #[test]
    fn syntax_errors_pass_through_parse_error_display() {
        let err: ParseError = SyntaxError {
            unexpected: tok(TokenKind::Identifier, "x"),
            expected: BTreeSet::new(),
        }
        .into();
        assert_eq!(err.to_string(), "Encountered \"x\" at line 3, column 7.");
        assert!(err.as_syntax().is_some());
    }
}
