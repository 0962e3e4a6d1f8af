#![forbid(unsafe_code)]
#![deny(unused_must_use)]
#![warn(clippy::dbg_macro, clippy::todo, clippy::unimplemented)]

pub mod decision;
mod error;
mod lexer;
mod parser;
mod speculate;
mod stream;


pub use decision::{DecisionPoint, GrammarRule};
pub use error::{LexError, ParseError, SyntaxError};
pub use lexer::{lex_str, Lexer};
pub use parser::{parse_str, parse_tokens, Parser, MAX_NESTING_DEPTH};
pub use speculate::SPECULATION_BUDGET;
pub use stream::{Pretokenized, TokenBuffer, TokenSource};

// token model lives in its own crate; re-exported so callers need one import
pub use cal_token::span::Position;
pub use cal_token::token::{Token, TokenKind};
