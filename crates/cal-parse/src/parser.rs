use crate::decision::{DecisionLog, GrammarRule};
use crate::decision::DecisionPoint as D;
use crate::error::{ParseError, SyntaxError};
use crate::lexer::Lexer;
use crate::speculate::{self, Probe};
use crate::stream::{Pretokenized, TokenBuffer, TokenSource};
use cal_token::token::Token;
use cal_token::token::TokenKind::{self, *};

/// Deepest nesting of `begin`/`if`/`while`/`else` bodies, `not`,
/// parenthesised conditions and `begin … end` expressions.
pub const MAX_NESTING_DEPTH: usize = 256;

type PResult = Result<(), ParseError>;

/// Recognise a complete CAL program in `src`.
pub fn parse_str(file: &str, src: &str) -> PResult {
    let _span = tracing::debug_span!("parse", file).entered();
    let mut p = Parser::new(Lexer::new(src));
    p.program()
}

/// Recognise a complete CAL program from already-lexed tokens.
pub fn parse_tokens<I>(tokens: I) -> PResult
where
    I: IntoIterator<Item = Token>,
{
    let _span = tracing::debug_span!("parse_tokens").entered();
    let mut p = Parser::new(Pretokenized::new(tokens));
    p.program()
}

/// Recursive-descent recogniser. One instance per parse.
pub struct Parser<S> {
    tokens: TokenBuffer<S>,
    /// Count of tokens consumed by committed matches.
    generation: u64,
    decisions: DecisionLog,
    depth: usize,
}

impl<S: TokenSource> Parser<S> {
    pub fn new(source: S) -> Self {
        Self {
            tokens: TokenBuffer::new(source),
            generation: 0,
            decisions: DecisionLog::default(),
            depth: 0,
        }
    }

    fn next_kind(&mut self) -> Result<TokenKind, ParseError> {
        Ok(self.tokens.peek(1)?.kind)
    }

    fn expect(&mut self, kind: TokenKind) -> PResult {
        if self.next_kind()? == kind {
            self.tokens.advance()?;
            self.generation += 1;
            Ok(())
        } else {
            Err(self.syntax_error(Some(kind)))
        }
    }

    /// Does the next token open one of `point`'s alternatives? A miss is
    /// stamped into the decision log.
    fn enters(&mut self, point: D) -> Result<bool, ParseError> {
        let kind = self.next_kind()?;
        if point.select(kind).is_some() {
            return Ok(true);
        }
        self.decisions.record(point, self.generation);
        Ok(false)
    }

    fn no_alternative(&mut self, point: D) -> ParseError {
        self.decisions.record(point, self.generation);
        self.syntax_error(None)
    }

    fn syntax_error(&mut self, wanted: Option<TokenKind>) -> ParseError {
        let unexpected = match self.tokens.peek(1) {
            Ok(tok) => tok.clone(),
            Err(e) => return e.into(),
        };
        let mut expected = self.decisions.expected_at(self.generation);
        expected.extend(wanted);
        let rules: Vec<GrammarRule> = self
            .decisions
            .live_at(self.generation)
            .map(|point| point.rule())
            .collect();
        tracing::debug!(
            at = %unexpected.position,
            found = %unexpected.kind,
            expected = expected.len(),
            ?rules,
            "syntax error"
        );
        SyntaxError { unexpected, expected }.into()
    }

    fn speculate(&mut self, probe: Probe) -> Result<bool, ParseError> {
        Ok(speculate::speculate(&mut self.tokens, probe)?)
    }

    fn nested(&mut self, body: impl FnOnce(&mut Self) -> PResult) -> PResult {
        if self.depth >= MAX_NESTING_DEPTH {
            let position = self.tokens.peek(1)?.position;
            return Err(ParseError::TooDeep {
                limit: MAX_NESTING_DEPTH,
                position,
            });
        }
        self.depth += 1;
        let result = body(self);
        self.depth -= 1;
        result
    }

    // ======= program / declarations =======

    /// `program → decl_list function_list main`, followed by end of input.
    pub fn program(&mut self) -> PResult {
        self.decl_list()?;
        self.function_list()?;
        self.main()?;
        self.expect(Eof)
    }

    fn decl_list(&mut self) -> PResult {
        while self.enters(D::DeclList)? {
            self.decl()?;
            self.expect(Semicolon)?;
        }
        Ok(())
    }

    fn decl(&mut self) -> PResult {
        match self.next_kind()? {
            Variable => self.var_decl(),
            Constant => self.const_decl(),
            _ => Err(self.no_alternative(D::Decl)),
        }
    }

    fn var_decl(&mut self) -> PResult {
        self.expect(Variable)?;
        self.expect(Identifier)?;
        self.expect(Colon)?;
        self.type_()
    }

    fn const_decl(&mut self) -> PResult {
        self.expect(Constant)?;
        self.expect(Identifier)?;
        self.expect(Colon)?;
        self.type_()?;
        self.expect(Assign)?;
        self.expression()
    }

    // ======= functions =======

    fn function_list(&mut self) -> PResult {
        while self.enters(D::FunctionList)? {
            self.function()?;
        }
        Ok(())
    }

    fn function(&mut self) -> PResult {
        self.type_()?;
        self.expect(Identifier)?;
        self.expect(LParen)?;
        self.parameter_list()?;
        self.expect(RParen)?;
        self.expect(Is)?;
        self.decl_list()?;
        self.expect(Begin)?;
        self.statement_block()?;
        self.expect(Return)?;
        self.expect(LParen)?;
        if self.enters(D::ReturnValue)? {
            self.expression()?;
        }
        self.expect(RParen)?;
        self.expect(Semicolon)?;
        self.expect(End)
    }

    fn type_(&mut self) -> PResult {
        match self.next_kind()? {
            kind @ (Integer | Boolean | Void) => self.expect(kind),
            _ => Err(self.no_alternative(D::Type)),
        }
    }

    fn parameter_list(&mut self) -> PResult {
        if self.enters(D::ParameterList)? {
            self.nemp_parameter_list()?;
        }
        Ok(())
    }

    fn nemp_parameter_list(&mut self) -> PResult {
        loop {
            self.expect(Identifier)?;
            self.expect(Colon)?;
            self.type_()?;
            if !self.enters(D::ParameterListTail)? {
                return Ok(());
            }
            self.expect(Comma)?;
        }
    }

    fn main(&mut self) -> PResult {
        self.expect(Main)?;
        self.expect(Begin)?;
        self.decl_list()?;
        self.statement_block()?;
        self.expect(End)
    }

    // ======= statements =======

    fn statement_block(&mut self) -> PResult {
        while self.enters(D::StatementBlock)? {
            self.statement()?;
        }
        Ok(())
    }

    fn statement(&mut self) -> PResult {
        match self.next_kind()? {
            Identifier => {
                self.expect(Identifier)?;
                self.statement_choice()
            }
            Begin => self.nested(|p| {
                p.expect(Begin)?;
                p.statement_block()?;
                p.expect(End)
            }),
            kind @ (If | While) => self.nested(|p| {
                p.expect(kind)?;
                p.condition()?;
                p.expect(Begin)?;
                p.statement_block()?;
                p.expect(End)
            }),
            Else => self.nested(|p| {
                p.expect(Else)?;
                p.expect(Begin)?;
                p.statement_block()?;
                p.expect(End)
            }),
            Skip => {
                self.expect(Skip)?;
                self.expect(Semicolon)
            }
            _ => Err(self.no_alternative(D::Statement)),
        }
    }

    /// Assignment or bare call, told apart by the token after the identifier.
    fn statement_choice(&mut self) -> PResult {
        match self.next_kind()? {
            Assign => {
                self.expect(Assign)?;
                self.expression()?;
                self.expect(Semicolon)
            }
            LParen => {
                self.expect(LParen)?;
                self.arg_list()?;
                self.expect(RParen)?;
                self.expect(Semicolon)
            }
            _ => Err(self.no_alternative(D::StatementChoice)),
        }
    }

    // ======= expressions =======

    fn expression(&mut self) -> PResult {
        self.fragment()?;
        if self.enters(D::ExpressionTail)? {
            self.binary_arith_op()?;
            self.fragment()?;
        }
        Ok(())
    }

    fn binary_arith_op(&mut self) -> PResult {
        match self.next_kind()? {
            kind @ (Plus | Minus) => self.expect(kind),
            _ => Err(self.no_alternative(D::BinaryArithOp)),
        }
    }

    fn fragment(&mut self) -> PResult {
        match self.next_kind()? {
            Identifier => {
                self.expect(Identifier)?;
                if self.speculate(Probe::CallSuffix)? {
                    self.expect(LParen)?;
                    self.arg_list()?;
                    self.expect(RParen)?;
                }
                Ok(())
            }
            Minus => {
                self.expect(Minus)?;
                self.expect(Identifier)
            }
            kind @ (Number | True | False) => self.expect(kind),
            Begin => self.nested(|p| {
                p.expect(Begin)?;
                p.expression()?;
                p.expect(End)
            }),
            _ => Err(self.no_alternative(D::Fragment)),
        }
    }

    // ======= conditions =======

    fn condition(&mut self) -> PResult {
        loop {
            self.condition_simple()?;
            if !self.condition_choice()? {
                return Ok(());
            }
        }
    }

    /// Consumes `and`/`or` if present; `true` means another condition follows.
    fn condition_choice(&mut self) -> Result<bool, ParseError> {
        if !self.enters(D::ConditionChoice)? {
            return Ok(false);
        }
        let connective = self.next_kind()?;
        self.expect(connective)?;
        Ok(true)
    }

    fn condition_simple(&mut self) -> PResult {
        if self.enters(D::Negation)? {
            return self.nested(|p| {
                p.expect(Not)?;
                p.condition()
            });
        }
        if self.speculate(Probe::ParenCondition)? {
            return self.nested(|p| {
                p.expect(LParen)?;
                p.condition()?;
                p.expect(RParen)
            });
        }
        if self.enters(D::Comparison)? {
            self.expression()?;
            self.comp_op()?;
            return self.expression();
        }
        Err(self.syntax_error(None))
    }

    fn comp_op(&mut self) -> PResult {
        match self.next_kind()? {
            kind @ (Equal | NotEqual | Less | LessEqual | Greater | GreaterEqual) => {
                self.expect(kind)
            }
            _ => Err(self.no_alternative(D::CompOp)),
        }
    }

    // ======= arguments =======

    fn arg_list(&mut self) -> PResult {
        if self.enters(D::ArgList)? {
            self.nemp_arg_list()?;
        }
        Ok(())
    }

    fn nemp_arg_list(&mut self) -> PResult {
        loop {
            self.expect(Identifier)?;
            if !self.enters(D::ArgListTail)? {
                return Ok(());
            }
            self.expect(Comma)?;
        }
    }
}
