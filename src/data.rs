use std::fmt::Debug;
use std::fmt::Display;

use serde::Serialize;
use serde::Serializer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    // Symbols
    Plus,
    Minus,
    Mult,
    Div,
    LessThan,
    MoreThan,
    Equal,
    Assign,
    OpenBracket,
    CloseBracket,
    Semicolon,
    // Keywords
    If,
    Then,
    Else,
    End,
    Repeat,
    Until,
    Read,
    Write,
    // Special tokens
    Id,
    Number,
    Comment,
    Invalid,
}

impl TokenType {
    pub(crate) fn keyword(text: &str) -> Option<Self> {
        match text {
            "if" => Some(TokenType::If),
            "then" => Some(TokenType::Then),
            "else" => Some(TokenType::Else),
            "end" => Some(TokenType::End),
            "repeat" => Some(TokenType::Repeat),
            "until" => Some(TokenType::Until),
            "read" => Some(TokenType::Read),
            "write" => Some(TokenType::Write),
            _ => None,
        }
    }

    /// Single character operators and brackets. `:` is not here, it only
    /// ever starts `:=`.
    pub(crate) fn operator(c: char) -> Option<Self> {
        match c {
            '+' => Some(TokenType::Plus),
            '-' => Some(TokenType::Minus),
            '*' => Some(TokenType::Mult),
            '/' => Some(TokenType::Div),
            '<' => Some(TokenType::LessThan),
            '>' => Some(TokenType::MoreThan),
            '=' => Some(TokenType::Equal),
            '(' => Some(TokenType::OpenBracket),
            ')' => Some(TokenType::CloseBracket),
            _ => None,
        }
    }

    /// The canonical spelling, for tokens that have one.
    pub fn lexeme(self) -> Option<&'static str> {
        let text = match self {
            TokenType::Plus => "+",
            TokenType::Minus => "-",
            TokenType::Mult => "*",
            TokenType::Div => "/",
            TokenType::LessThan => "<",
            TokenType::MoreThan => ">",
            TokenType::Equal => "=",
            TokenType::Assign => ":=",
            TokenType::OpenBracket => "(",
            TokenType::CloseBracket => ")",
            TokenType::Semicolon => ";",
            TokenType::If => "if",
            TokenType::Then => "then",
            TokenType::Else => "else",
            TokenType::End => "end",
            TokenType::Repeat => "repeat",
            TokenType::Until => "until",
            TokenType::Read => "read",
            TokenType::Write => "write",
            TokenType::Id | TokenType::Number | TokenType::Comment | TokenType::Invalid => {
                return None
            }
        };
        Some(text)
    }

    pub fn name(self) -> &'static str {
        match self {
            TokenType::Plus => "PLUS",
            TokenType::Minus => "MINUS",
            TokenType::Mult => "MULT",
            TokenType::Div => "DIV",
            TokenType::LessThan => "LESSTHAN",
            TokenType::MoreThan => "MORETHAN",
            TokenType::Equal => "EQUAL",
            TokenType::Assign => "ASSIGN",
            TokenType::OpenBracket => "OPENBRACKET",
            TokenType::CloseBracket => "CLOSEBRACKET",
            TokenType::Semicolon => "SEMICOLON",
            TokenType::If => "IF",
            TokenType::Then => "THEN",
            TokenType::Else => "ELSE",
            TokenType::End => "END",
            TokenType::Repeat => "REPEAT",
            TokenType::Until => "UNTIL",
            TokenType::Read => "READ",
            TokenType::Write => "WRITE",
            TokenType::Id => "ID",
            TokenType::Number => "NUMBER",
            TokenType::Comment => "COMMENT",
            TokenType::Invalid => "INVALID",
        }
    }
}

impl Serialize for TokenType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    #[serde(rename = "type")]
    pub token_type: TokenType,
    #[serde(rename = "value")]
    pub text: String,
    #[serde(flatten)]
    pub source_location: SourceLocation,
}

impl Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {:?} {:?}",
            self.source_location, self.token_type, self.text
        )
    }
}

impl Token {
    pub fn new(
        token_type: TokenType,
        text: impl Into<String>,
        source_location: SourceLocation,
    ) -> Self {
        Self {
            token_type,
            text: text.into(),
            source_location,
        }
    }

    pub fn line(&self) -> usize {
        self.source_location.line
    }

    pub fn is_comment(&self) -> bool {
        self.token_type == TokenType::Comment
    }
}
