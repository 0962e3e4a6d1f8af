//! Grammar rules, their FIRST-sets, and the points where the parser picks an
//! alternative by looking at the next token.
//!
//! The decision log is what makes diagnostics complete: each point that saw
//! no matching alternative stamps the generation (number of tokens consumed)
//! at which that happened. When the parse fails, every point stamped with the
//! current generation was a legal continuation that the input did not take,
//! so all of their FIRST-sets belong in the "expected" list.

use cal_token::token::TokenKind::{self, *};
use std::collections::BTreeSet;

const DECL_START: &[TokenKind] = &[Variable, Constant];
const TYPE_START: &[TokenKind] = &[Integer, Boolean, Void];
const STATEMENT_START: &[TokenKind] = &[If, Else, While, Skip, Begin, Identifier];
const EXPRESSION_START: &[TokenKind] = &[True, False, Begin, Minus, Number, Identifier];
const COMPARISON: &[TokenKind] = &[Equal, NotEqual, Less, LessEqual, Greater, GreaterEqual];

/// The productions of the CAL grammar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GrammarRule {
    Program,
    DeclList,
    Decl,
    VarDecl,
    ConstDecl,
    FunctionList,
    Function,
    Type,
    ParameterList,
    NempParameterList,
    Main,
    StatementBlock,
    Statement,
    StatementChoice,
    Expression,
    BinaryArithOp,
    Fragment,
    Condition,
    ConditionChoice,
    ConditionSimple,
    CompOp,
    ArgList,
    NempArgList,
}

impl GrammarRule {
    pub const ALL: [GrammarRule; 23] = [
        GrammarRule::Program,
        GrammarRule::DeclList,
        GrammarRule::Decl,
        GrammarRule::VarDecl,
        GrammarRule::ConstDecl,
        GrammarRule::FunctionList,
        GrammarRule::Function,
        GrammarRule::Type,
        GrammarRule::ParameterList,
        GrammarRule::NempParameterList,
        GrammarRule::Main,
        GrammarRule::StatementBlock,
        GrammarRule::Statement,
        GrammarRule::StatementChoice,
        GrammarRule::Expression,
        GrammarRule::BinaryArithOp,
        GrammarRule::Fragment,
        GrammarRule::Condition,
        GrammarRule::ConditionChoice,
        GrammarRule::ConditionSimple,
        GrammarRule::CompOp,
        GrammarRule::ArgList,
        GrammarRule::NempArgList,
    ];

    /// Tokens that can begin a non-empty derivation of the rule.
    pub fn first_set(self) -> BTreeSet<TokenKind> {
        let parts: &[&[TokenKind]] = match self {
            GrammarRule::Program => &[DECL_START, TYPE_START, &[Main]],
            GrammarRule::DeclList | GrammarRule::Decl => &[DECL_START],
            GrammarRule::VarDecl => &[&[Variable]],
            GrammarRule::ConstDecl => &[&[Constant]],
            GrammarRule::FunctionList | GrammarRule::Function | GrammarRule::Type => {
                &[TYPE_START]
            }
            GrammarRule::ParameterList
            | GrammarRule::NempParameterList
            | GrammarRule::ArgList
            | GrammarRule::NempArgList => &[&[Identifier]],
            GrammarRule::Main => &[&[Main]],
            GrammarRule::StatementBlock | GrammarRule::Statement => &[STATEMENT_START],
            GrammarRule::StatementChoice => &[&[Assign, LParen]],
            GrammarRule::Expression | GrammarRule::Fragment => &[EXPRESSION_START],
            GrammarRule::BinaryArithOp => &[&[Plus, Minus]],
            GrammarRule::Condition | GrammarRule::ConditionSimple => {
                &[&[Not, LParen], EXPRESSION_START]
            }
            GrammarRule::ConditionChoice => &[&[And, Or]],
            GrammarRule::CompOp => &[COMPARISON],
        };
        parts.iter().flat_map(|p| p.iter().copied()).collect()
    }

    /// Whether the rule can match without consuming anything.
    ///
    /// Audit API: the engine encodes this as the ε branch of the matching
    /// [`DecisionPoint`]; the table is exposed so callers can check the two
    /// agree.
    pub fn nullable(self) -> bool {
        matches!(
            self,
            GrammarRule::DeclList
                | GrammarRule::FunctionList
                | GrammarRule::ParameterList
                | GrammarRule::StatementBlock
                | GrammarRule::ConditionChoice
                | GrammarRule::ArgList
        )
    }
}

/// A place in the grammar where the next token selects the alternative.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DecisionPoint {
    DeclList,
    Decl,
    FunctionList,
    ReturnValue,
    Type,
    ParameterList,
    ParameterListTail,
    StatementBlock,
    Statement,
    StatementChoice,
    ExpressionTail,
    BinaryArithOp,
    Fragment,
    ConditionChoice,
    Negation,
    Comparison,
    CompOp,
    ArgList,
    ArgListTail,
}

impl DecisionPoint {
    pub const COUNT: usize = 19;

    pub const ALL: [DecisionPoint; DecisionPoint::COUNT] = [
        DecisionPoint::DeclList,
        DecisionPoint::Decl,
        DecisionPoint::FunctionList,
        DecisionPoint::ReturnValue,
        DecisionPoint::Type,
        DecisionPoint::ParameterList,
        DecisionPoint::ParameterListTail,
        DecisionPoint::StatementBlock,
        DecisionPoint::Statement,
        DecisionPoint::StatementChoice,
        DecisionPoint::ExpressionTail,
        DecisionPoint::BinaryArithOp,
        DecisionPoint::Fragment,
        DecisionPoint::ConditionChoice,
        DecisionPoint::Negation,
        DecisionPoint::Comparison,
        DecisionPoint::CompOp,
        DecisionPoint::ArgList,
        DecisionPoint::ArgListTail,
    ];

    /// The rule whose body contains this decision. Syntax-error events name
    /// the rules of every point live at the failure.
    pub fn rule(self) -> GrammarRule {
        match self {
            DecisionPoint::DeclList => GrammarRule::DeclList,
            DecisionPoint::Decl => GrammarRule::Decl,
            DecisionPoint::FunctionList => GrammarRule::FunctionList,
            DecisionPoint::ReturnValue => GrammarRule::Function,
            DecisionPoint::Type => GrammarRule::Type,
            DecisionPoint::ParameterList => GrammarRule::ParameterList,
            DecisionPoint::ParameterListTail => GrammarRule::NempParameterList,
            DecisionPoint::StatementBlock => GrammarRule::StatementBlock,
            DecisionPoint::Statement => GrammarRule::Statement,
            DecisionPoint::StatementChoice => GrammarRule::StatementChoice,
            DecisionPoint::ExpressionTail => GrammarRule::Expression,
            DecisionPoint::BinaryArithOp => GrammarRule::BinaryArithOp,
            DecisionPoint::Fragment => GrammarRule::Fragment,
            DecisionPoint::ConditionChoice => GrammarRule::ConditionChoice,
            DecisionPoint::Negation | DecisionPoint::Comparison => GrammarRule::ConditionSimple,
            DecisionPoint::CompOp => GrammarRule::CompOp,
            DecisionPoint::ArgList => GrammarRule::ArgList,
            DecisionPoint::ArgListTail => GrammarRule::NempArgList,
        }
    }

    /// Triggering tokens per alternative, in the order they are tried.
    pub fn alternatives(self) -> &'static [&'static [TokenKind]] {
        match self {
            DecisionPoint::DeclList => &[DECL_START],
            DecisionPoint::Decl => &[&[Variable], &[Constant]],
            DecisionPoint::FunctionList => &[TYPE_START],
            DecisionPoint::ReturnValue | DecisionPoint::Comparison => &[EXPRESSION_START],
            DecisionPoint::Type => &[&[Integer], &[Boolean], &[Void]],
            DecisionPoint::ParameterList | DecisionPoint::ArgList => &[&[Identifier]],
            DecisionPoint::ParameterListTail | DecisionPoint::ArgListTail => &[&[Comma]],
            DecisionPoint::StatementBlock => &[STATEMENT_START],
            DecisionPoint::Statement => &[
                &[Identifier],
                &[Begin],
                &[If],
                &[Else],
                &[While],
                &[Skip],
            ],
            DecisionPoint::StatementChoice => &[&[Assign], &[LParen]],
            DecisionPoint::ExpressionTail => &[&[Plus, Minus]],
            DecisionPoint::BinaryArithOp => &[&[Plus], &[Minus]],
            DecisionPoint::Fragment => &[
                &[Identifier],
                &[Minus],
                &[Number],
                &[True],
                &[False],
                &[Begin],
            ],
            DecisionPoint::ConditionChoice => &[&[And], &[Or]],
            DecisionPoint::Negation => &[&[Not]],
            DecisionPoint::CompOp => &[
                &[Equal],
                &[NotEqual],
                &[Less],
                &[LessEqual],
                &[Greater],
                &[GreaterEqual],
            ],
        }
    }

    /// Index of the first alternative triggered by `kind`.
    pub fn select(self, kind: TokenKind) -> Option<usize> {
        self.alternatives().iter().position(|alt| alt.contains(&kind))
    }

    /// Union of every alternative's triggering tokens.
    pub fn first_set(self) -> impl Iterator<Item = TokenKind> {
        self.alternatives().iter().flat_map(|alt| alt.iter().copied())
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Per-decision-point record of the last generation at which the point found
/// no alternative for the lookahead.
#[derive(Debug, Clone, Default)]
pub struct DecisionLog {
    stamps: [Option<u64>; DecisionPoint::COUNT],
}

impl DecisionLog {
    pub fn record(&mut self, point: DecisionPoint, generation: u64) {
        self.stamps[point.index()] = Some(generation);
    }

    /// Decision points still open at `generation`.
    pub fn live_at(&self, generation: u64) -> impl Iterator<Item = DecisionPoint> + '_ {
        DecisionPoint::ALL
            .into_iter()
            .filter(move |p| self.stamps[p.index()] == Some(generation))
    }

    /// Union of the FIRST-sets of every point live at `generation`.
    pub fn expected_at(&self, generation: u64) -> BTreeSet<TokenKind> {
        self.live_at(generation).flat_map(|p| p.first_set()).collect()
    }
}
