pub mod span {
    use serde::Serialize;
    use std::fmt;

    /// 1-based line/column of the first character of a token. Orders by line,
    /// then column.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
    pub struct Position {
        pub line: u32,
        pub column: u32,
    }

    impl Position {
        pub const START: Position = Position { line: 1, column: 1 };

        pub fn new(line: u32, column: u32) -> Self {
            Self { line, column }
        }
    }

    impl fmt::Display for Position {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "line {}, column {}", self.line, self.column)
        }
    }
}

pub mod token {
    use super::span::Position;
    use serde::Serialize;
    use std::fmt;

    /// Terminal symbols of CAL.
    ///
    /// Declaration order is significant: it is the order in which expected
    /// tokens are listed in diagnostics.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TokenKind {
        Eof,
        // keywords
        Variable,
        Constant,
        Return,
        Integer,
        Boolean,
        Void,
        Main,
        If,
        Else,
        True,
        False,
        While,
        Skip,
        // punctuation
        Comma,
        Semicolon,
        Colon,
        Assign, // :=
        Begin,
        Is,
        End,
        LParen,
        RParen,
        // arithmetic
        Plus,
        Minus,
        // logical
        Not,
        And,
        Or,
        // comparison
        Equal,
        NotEqual, // <>
        Less,
        LessEqual,
        Greater,
        GreaterEqual,
        // classes
        Number,
        Identifier,
    }

    impl TokenKind {
        pub const KEYWORDS: [TokenKind; 19] = [
            TokenKind::Variable,
            TokenKind::Constant,
            TokenKind::Return,
            TokenKind::Integer,
            TokenKind::Boolean,
            TokenKind::Void,
            TokenKind::Main,
            TokenKind::If,
            TokenKind::Else,
            TokenKind::True,
            TokenKind::False,
            TokenKind::While,
            TokenKind::Skip,
            TokenKind::Begin,
            TokenKind::Is,
            TokenKind::End,
            TokenKind::Not,
            TokenKind::And,
            TokenKind::Or,
        ];

        /// Reserved word for `text`, if any. Keywords are case-sensitive.
        pub fn keyword(text: &str) -> Option<TokenKind> {
            Self::KEYWORDS
                .iter()
                .copied()
                .find(|k| k.image().trim_matches('"') == text)
        }

        /// How the kind is written in diagnostics: quoted fixed text for
        /// keywords and punctuation, `<CLASS>` for token classes.
        pub fn image(self) -> &'static str {
            match self {
                TokenKind::Eof => "<EOF>",
                TokenKind::Variable => "\"variable\"",
                TokenKind::Constant => "\"constant\"",
                TokenKind::Return => "\"return\"",
                TokenKind::Integer => "\"integer\"",
                TokenKind::Boolean => "\"boolean\"",
                TokenKind::Void => "\"void\"",
                TokenKind::Main => "\"main\"",
                TokenKind::If => "\"if\"",
                TokenKind::Else => "\"else\"",
                TokenKind::True => "\"true\"",
                TokenKind::False => "\"false\"",
                TokenKind::While => "\"while\"",
                TokenKind::Skip => "\"skip\"",
                TokenKind::Comma => "\",\"",
                TokenKind::Semicolon => "\";\"",
                TokenKind::Colon => "\":\"",
                TokenKind::Assign => "\":=\"",
                TokenKind::Begin => "\"begin\"",
                TokenKind::Is => "\"is\"",
                TokenKind::End => "\"end\"",
                TokenKind::LParen => "\"(\"",
                TokenKind::RParen => "\")\"",
                TokenKind::Plus => "\"+\"",
                TokenKind::Minus => "\"-\"",
                TokenKind::Not => "\"not\"",
                TokenKind::And => "\"and\"",
                TokenKind::Or => "\"or\"",
                TokenKind::Equal => "\"=\"",
                TokenKind::NotEqual => "\"<>\"",
                TokenKind::Less => "\"<\"",
                TokenKind::LessEqual => "\"<=\"",
                TokenKind::Greater => "\">\"",
                TokenKind::GreaterEqual => "\">=\"",
                TokenKind::Number => "<NUMBER>",
                TokenKind::Identifier => "<ID>",
            }
        }

        /// Fixed lexeme for kinds that have one.
        pub fn text(self) -> Option<&'static str> {
            match self {
                TokenKind::Eof | TokenKind::Number | TokenKind::Identifier => None,
                other => Some(other.image().trim_matches('"')),
            }
        }
    }

    impl fmt::Display for TokenKind {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.image())
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize)]
    pub struct Token {
        pub kind: TokenKind,
        pub lexeme: String,
        pub position: Position,
    }

    impl Token {
        pub fn new(kind: TokenKind, lexeme: impl Into<String>, position: Position) -> Self {
            Self {
                kind,
                lexeme: lexeme.into(),
                position,
            }
        }

        /// Token of a fixed-text kind; the lexeme is the kind's text.
        pub fn fixed(kind: TokenKind, position: Position) -> Self {
            Self::new(kind, kind.text().unwrap_or_default(), position)
        }

        pub fn eof(position: Position) -> Self {
            Self::new(TokenKind::Eof, "", position)
        }

        pub fn is_eof(&self) -> bool {
            self.kind == TokenKind::Eof
        }
    }

}
