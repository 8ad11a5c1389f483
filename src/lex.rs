use std::str::Chars;

use log::debug;
use log::trace;

use crate::data::SourceLocation;
use crate::data::Token;
use crate::data::TokenType;


#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexErrorKind {
    #[error("unrecognized token '{0}'")]
    Unrecognized(String),
    #[error("extra text after expected end of number '{0}'")]
    MalformedNumber(String),
    #[error("invalid identifier name '{0}'")]
    InvalidIdentifier(String),
    #[error("invalid operator '{0}'")]
    InvalidOperator(String),
    #[error("expected ':=' but found '{0}'")]
    MalformedAssignment(String),
    #[error("unterminated comment, expected '}}'")]
    UnterminatedComment,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{location}: {kind}")]
pub struct LexError {
    pub location: SourceLocation,
    pub kind: LexErrorKind,
}

/// Everything one pass of the scanner produced. Comments are kept here;
/// use [`Scan::parser_tokens`] for the stream the parser consumes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scan {
    pub tokens: Vec<Token>,
    pub errors: Vec<LexError>,
}

impl Scan {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn parser_tokens(&self) -> Vec<Token> {
        strip_comments(&self.tokens)
    }
}

pub fn strip_comments(tokens: &[Token]) -> Vec<Token> {
    tokens.iter().filter(|t| !t.is_comment()).cloned().collect()
}

pub fn scan(text: &str) -> Scan {
    let scan = Scanner::new(text).run();
    debug!(
        "scanned {} tokens with {} lexical errors",
        scan.tokens.len(),
        scan.errors.len()
    );
    scan
}

struct SourceCodeIterator<'src> {
    text: Chars<'src>,
    line: usize,
    column: usize,
}

impl<'src> SourceCodeIterator<'src> {
    fn new(text: &'src str) -> Self {
        Self {
            text: text.chars(),
            line: 1,
            column: 1,
        }
    }

    fn location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

impl<'src> Iterator for SourceCodeIterator<'src> {
    type Item = (SourceLocation, char);

    fn next(&mut self) -> Option<Self::Item> {
        let at = self.location();
        let c = self.text.next()?;
        match c {
            '\n' => {
                self.line += 1;
                self.column = 1;
            }
            _ => {
                self.column += 1;
            }
        }
        Some((at, c))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fault {
    Unrecognized,
    Number,
    Identifier,
    Operator,
    Assignment,
}

impl Fault {
    fn into_kind(self, text: String) -> LexErrorKind {
        match self {
            Fault::Unrecognized => LexErrorKind::Unrecognized(text),
            Fault::Number => LexErrorKind::MalformedNumber(text),
            Fault::Identifier => LexErrorKind::InvalidIdentifier(text),
            Fault::Operator => LexErrorKind::InvalidOperator(text),
            Fault::Assignment => LexErrorKind::MalformedAssignment(text),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    Number { fraction: bool },
    IdentOrKeyword,
    Ident,
    Operator(TokenType),
    AssignPending,
    Comment,
    Invalid(Fault),
}

fn is_terminator(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n' | ';' | '{')
}

fn starts_operator(c: char) -> bool {
    c == ':' || TokenType::operator(c).is_some()
}

struct Scanner<'src> {
    source: SourceCodeIterator<'src>,
    state: State,
    lexeme: String,
    start: SourceLocation,
    scan: Scan,
}

impl<'src> Scanner<'src> {
    fn new(text: &'src str) -> Self {
        Self {
            source: SourceCodeIterator::new(text),
            state: State::Start,
            lexeme: String::new(),
            start: SourceLocation::new(1, 1),
            scan: Scan::default(),
        }
    }

    fn run(mut self) -> Scan {
        while let Some((at, c)) = self.source.next() {
            if is_terminator(c) {
                self.terminate(c, at);
            } else {
                self.advance(c, at);
            }
        }
        self.finish();
        self.scan
    }

    fn terminate(&mut self, c: char, at: SourceLocation) {
        if self.state == State::Comment {
            self.lexeme.push(c);
            return;
        }
        self.flush();
        match c {
            '{' => self.begin(State::Comment, c, at),
            ';' => self.push(Token::new(TokenType::Semicolon, ";", at)),
            _ => {}
        }
    }

    fn advance(&mut self, c: char, at: SourceLocation) {
        match self.state {
            State::Start => self.begin_lexeme(c, at),
            State::Number { fraction } => {
                if c.is_ascii_digit() {
                    self.lexeme.push(c);
                } else if c == '.' && !fraction {
                    self.lexeme.push(c);
                    self.state = State::Number { fraction: true };
                } else if starts_operator(c) {
                    self.flush();
                    self.begin_lexeme(c, at);
                } else {
                    self.fail(c, Fault::Number);
                }
            }
            State::IdentOrKeyword | State::Ident => {
                if c.is_ascii_digit() {
                    self.lexeme.push(c);
                    self.state = State::Ident;
                } else if c.is_ascii_alphabetic() {
                    self.lexeme.push(c);
                } else if starts_operator(c) {
                    self.flush();
                    self.begin_lexeme(c, at);
                } else {
                    self.fail(c, Fault::Identifier);
                }
            }
            State::Operator(_) => {
                // Only signs and brackets may follow another operator.
                if c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '(' | ')') {
                    self.flush();
                    self.begin_lexeme(c, at);
                } else {
                    self.fail(c, Fault::Operator);
                }
            }
            State::AssignPending => {
                self.lexeme.push(c);
                if c == '=' {
                    self.emit(TokenType::Assign);
                } else {
                    self.emit_invalid(Fault::Assignment);
                }
            }
            State::Comment => {
                self.lexeme.push(c);
                if c == '}' {
                    self.emit(TokenType::Comment);
                }
            }
            State::Invalid(_) => self.lexeme.push(c),
        }
    }

    fn begin_lexeme(&mut self, c: char, at: SourceLocation) {
        let state = if c.is_ascii_digit() {
            State::Number { fraction: false }
        } else if c.is_ascii_alphabetic() {
            State::IdentOrKeyword
        } else if c == ':' {
            State::AssignPending
        } else if let Some(operator) = TokenType::operator(c) {
            State::Operator(operator)
        } else {
            State::Invalid(Fault::Unrecognized)
        };
        self.begin(state, c, at);
    }

    fn begin(&mut self, state: State, c: char, at: SourceLocation) {
        self.state = state;
        self.lexeme.clear();
        self.lexeme.push(c);
        self.start = at;
    }

    fn fail(&mut self, c: char, fault: Fault) {
        self.lexeme.push(c);
        self.state = State::Invalid(fault);
    }

    /// Closes the lexeme in progress as if a terminator had been seen.
    fn flush(&mut self) {
        match self.state {
            State::Start | State::Comment => {}
            State::Number { .. } => self.emit(TokenType::Number),
            State::IdentOrKeyword => {
                let token_type = TokenType::keyword(&self.lexeme).unwrap_or(TokenType::Id);
                self.emit(token_type);
            }
            State::Ident => self.emit(TokenType::Id),
            State::Operator(operator) => self.emit(operator),
            State::AssignPending => self.emit_invalid(Fault::Assignment),
            State::Invalid(fault) => self.emit_invalid(fault),
        }
    }

    fn finish(&mut self) {
        if self.state == State::Comment {
            self.emit(TokenType::Comment);
            self.scan.errors.push(LexError {
                location: self.source.location(),
                kind: LexErrorKind::UnterminatedComment,
            });
        } else {
            self.flush();
        }
    }

    fn emit(&mut self, token_type: TokenType) {
        let text = std::mem::take(&mut self.lexeme);
        self.push(Token::new(token_type, text, self.start));
        self.state = State::Start;
    }

    fn emit_invalid(&mut self, fault: Fault) {
        let text = self.lexeme.clone();
        self.emit(TokenType::Invalid);
        self.scan.errors.push(LexError {
            location: self.start,
            kind: fault.into_kind(text),
        });
    }

    fn push(&mut self, token: Token) {
        trace!("{:?}", token);
        self.scan.tokens.push(token);
    }
}
