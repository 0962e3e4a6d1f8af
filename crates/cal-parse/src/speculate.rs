//! Dry-run scanning used where one token of lookahead cannot pick the
//! alternative.
//!
//! A scan walks a private cursor over the token buffer and never moves the
//! parser's committed cursor. Each attempt may look at no more than
//! [`SPECULATION_BUDGET`] tokens beyond the committed cursor: once that many
//! fresh tokens have matched, the attempt is decided as a success even if the
//! scanned construct is not finished. Re-scanning a token after backtracking
//! inside a choice costs nothing.

use crate::error::LexError;
use crate::stream::{TokenBuffer, TokenSource};
use cal_token::token::TokenKind::{self, *};

pub const SPECULATION_BUDGET: usize = 2;

/// The constructs the parser speculates on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Probe {
    /// `'(' arg_list ')'` after an identifier inside a fragment.
    CallSuffix,
    /// `'(' condition ')'` at the start of a simple condition.
    ParenCondition,
}

/// Why a scan stopped early.
enum Halt {
    Mismatch,
    Decided,
    Lex(LexError),
}

type Scan = Result<(), Halt>;
type Alt<'t, S> = fn(&mut Scanner<'t, S>) -> Scan;

/// Run `probe` against the tokens after the committed cursor.
///
/// Returns whether the parser should take the speculated alternative. The
/// buffer's cursor is left untouched either way.
pub fn speculate<S: TokenSource>(tokens: &mut TokenBuffer<S>, probe: Probe) -> Result<bool, LexError> {
    let mut scan = Scanner {
        tokens,
        pos: 0,
        last: 0,
        budget: SPECULATION_BUDGET,
    };
    let outcome = match probe {
        Probe::CallSuffix => scan.call_suffix(),
        Probe::ParenCondition => scan.paren_condition(),
    };
    let hit = match outcome {
        Ok(()) | Err(Halt::Decided) => true,
        Err(Halt::Mismatch) => false,
        Err(Halt::Lex(e)) => return Err(e),
    };
    tracing::trace!(?probe, hit, scanned = scan.last, "speculation");
    Ok(hit)
}

struct Scanner<'t, S> {
    tokens: &'t mut TokenBuffer<S>,
    /// Offset of the last scanned token from the committed cursor.
    pos: usize,
    /// Furthest offset scanned so far.
    last: usize,
    budget: usize,
}

impl<'t, S: TokenSource> Scanner<'t, S> {
    fn token(&mut self, kind: TokenKind) -> Scan {
        if self.pos == self.last {
            self.budget = self.budget.saturating_sub(1);
            self.last += 1;
        }
        self.pos += 1;
        let found = self.tokens.peek(self.pos).map_err(Halt::Lex)?.kind;
        if found != kind {
            return Err(Halt::Mismatch);
        }
        if self.budget == 0 && self.pos == self.last {
            return Err(Halt::Decided);
        }
        Ok(())
    }

    fn any_token(&mut self, kinds: &[TokenKind]) -> Scan {
        let saved = self.pos;
        for &kind in kinds {
            match self.token(kind) {
                Err(Halt::Mismatch) => self.pos = saved,
                other => return other,
            }
        }
        Err(Halt::Mismatch)
    }

    /// Ordered choice: the first alternative that does not mismatch wins.
    fn first_of(&mut self, alts: &[Alt<'t, S>]) -> Scan {
        let saved = self.pos;
        for alt in alts {
            match alt(self) {
                Err(Halt::Mismatch) => self.pos = saved,
                other => return other,
            }
        }
        Err(Halt::Mismatch)
    }

    fn optional(&mut self, body: impl FnOnce(&mut Self) -> Scan) -> Scan {
        let saved = self.pos;
        match body(self) {
            Err(Halt::Mismatch) => {
                self.pos = saved;
                Ok(())
            }
            other => other,
        }
    }

    // ======= call suffix =======

    fn call_suffix(&mut self) -> Scan {
        self.token(LParen)?;
        self.optional(Self::nemp_arg_list)?;
        self.token(RParen)
    }

    fn nemp_arg_list(&mut self) -> Scan {
        self.token(Identifier)?;
        self.optional(|s| {
            s.token(Comma)?;
            s.nemp_arg_list()
        })
    }

    // ======= conditions =======

    fn paren_condition(&mut self) -> Scan {
        self.token(LParen)?;
        self.condition()?;
        self.token(RParen)
    }

    fn condition(&mut self) -> Scan {
        self.condition_simple()?;
        self.optional(|s| {
            s.any_token(&[And, Or])?;
            s.condition()
        })
    }

    fn condition_simple(&mut self) -> Scan {
        self.first_of(&[Self::negation, Self::paren_condition, Self::comparison])
    }

    fn negation(&mut self) -> Scan {
        self.token(Not)?;
        self.condition()
    }

    fn comparison(&mut self) -> Scan {
        self.expression()?;
        self.any_token(&[Equal, NotEqual, Less, LessEqual, Greater, GreaterEqual])?;
        self.expression()
    }

    // ======= expressions =======

    fn expression(&mut self) -> Scan {
        self.fragment()?;
        self.optional(|s| {
            s.any_token(&[Plus, Minus])?;
            s.fragment()
        })
    }

    fn fragment(&mut self) -> Scan {
        self.first_of(&[
            |s| {
                s.token(Identifier)?;
                s.optional(Self::call_suffix)
            },
            |s| {
                s.token(Minus)?;
                s.token(Identifier)
            },
            |s| s.token(Number),
            |s| s.token(True),
            |s| s.token(False),
            |s| {
                s.token(Begin)?;
                s.expression()?;
                s.token(End)
            },
        ])
    }
}
