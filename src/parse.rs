use std::fmt::Display;

use log::debug;
use nom::combinator::opt;
use nom::error::ErrorKind;
use nom::error::ParseError;
use nom::multi::many0;
use nom::sequence::pair;
use nom::sequence::preceded;
use nom::sequence::tuple;
use nom::IResult;
use nom::InputLength;
use nom::Parser;

use crate::data::Token;
use crate::data::TokenType;
use crate::expr::expression;
use crate::lex::strip_comments;
use crate::tree::NodeKind;
use crate::tree::TreeNode;


/// Remaining stack below which recursive rules switch to a fresh segment.
pub(crate) const RED_ZONE: usize = 64 * 1024;
pub(crate) const STACK_SEGMENT: usize = 1024 * 1024;

/// Tallest tree the parser will build, counted in nodes from a statement or
/// operator down to its deepest leaf.
pub const MAX_HEIGHT: usize = 1_024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    Statement,
    Expression,
    Identifier,
    EndOrSemicolon,
    Token(TokenType),
}

impl Display for Expected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expected::Statement => f.write_str("a statement"),
            Expected::Expression => f.write_str("an expression"),
            Expected::Identifier => f.write_str("an identifier"),
            Expected::EndOrSemicolon => f.write_str("';' or 'end'"),
            Expected::Token(ty) => match ty.lexeme() {
                Some(lexeme) => write!(f, "'{}'", lexeme),
                None => write!(f, "{}", ty),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxErrorKind {
    #[error("unexpected '{found}'")]
    Unexpected { found: String },
    #[error("unexpected end of code")]
    UnexpectedEnd,
    #[error("extra semicolon found")]
    ExtraSemicolon,
    #[error("nesting deeper than {limit} levels")]
    TooDeep { limit: usize },
}

/// The first grammar violation in a token stream. `token_index` counts
/// tokens with comments removed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at line {line}{}", expected_suffix(.expected))]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub expected: Option<Expected>,
    pub line: usize,
    pub token_index: usize,
}

fn expected_suffix(expected: &Option<Expected>) -> String {
    match expected {
        Some(expected) => format!(", expected {}", expected),
        None => String::new(),
    }
}

impl SyntaxError {
    /// Points at the next token of `input`, or at the last token when the
    /// input is exhausted.
    pub(crate) fn unexpected(input: TokenInput<'_>, expected: Option<Expected>) -> Self {
        match input.peek() {
            Some(token) => Self {
                kind: SyntaxErrorKind::Unexpected {
                    found: token.text.clone(),
                },
                expected,
                line: token.line(),
                token_index: input.position,
            },
            None => Self {
                kind: SyntaxErrorKind::UnexpectedEnd,
                expected,
                line: input.tokens.last().map_or(1, Token::line),
                token_index: input.tokens.len().saturating_sub(1),
            },
        }
    }

    /// The input ran out where a statement must start. Only the token before
    /// tells a dangling `;` apart from an empty body.
    fn missing_statement(input: TokenInput<'_>) -> Self {
        let token_index = input.position.saturating_sub(1);
        let previous = input.previous();
        let line = previous.map_or(1, Token::line);
        match previous.map(|t| t.token_type) {
            Some(TokenType::Repeat | TokenType::Then | TokenType::Else) | None => Self {
                kind: SyntaxErrorKind::UnexpectedEnd,
                expected: Some(Expected::Statement),
                line,
                token_index,
            },
            Some(_) => Self {
                kind: SyntaxErrorKind::ExtraSemicolon,
                expected: None,
                line,
                token_index,
            },
        }
    }

    /// Points at the last token consumed by `input`.
    fn too_deep(input: TokenInput<'_>) -> Self {
        Self {
            kind: SyntaxErrorKind::TooDeep { limit: MAX_HEIGHT },
            expected: None,
            line: input.previous().map_or(1, Token::line),
            token_index: input.position.saturating_sub(1),
        }
    }
}

/// Passes `node` through unless it is taller than [`MAX_HEIGHT`].
pub(crate) fn within_height(input: TokenInput<'_>, node: TreeNode) -> PResult<'_, TreeNode> {
    if node.height() > MAX_HEIGHT {
        return Err(nom::Err::Failure(SyntaxError::too_deep(input)));
    }
    Ok((input, node))
}

impl<'a> ParseError<TokenInput<'a>> for SyntaxError {
    fn from_error_kind(input: TokenInput<'a>, _kind: ErrorKind) -> Self {
        SyntaxError::unexpected(input, None)
    }

    fn append(_input: TokenInput<'a>, _kind: ErrorKind, other: Self) -> Self {
        other
    }
}

pub(crate) fn into_syntax_error(err: nom::Err<SyntaxError>, input: TokenInput<'_>) -> SyntaxError {
    match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => e,
        nom::Err::Incomplete(_) => SyntaxError::unexpected(input, None),
    }
}

/// A cursor into a comment-free token stream.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TokenInput<'a> {
    tokens: &'a [Token],
    position: usize,
}

impl<'a> TokenInput<'a> {
    pub(crate) fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    pub(crate) fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.position)
    }

    pub(crate) fn previous(&self) -> Option<&'a Token> {
        self.position
            .checked_sub(1)
            .and_then(|index| self.tokens.get(index))
    }

    pub(crate) fn advance(self) -> Self {
        Self {
            tokens: self.tokens,
            position: (self.position + 1).min(self.tokens.len()),
        }
    }
}

impl<'a> InputLength for TokenInput<'a> {
    fn input_len(&self) -> usize {
        self.tokens.len() - self.position
    }
}

pub(crate) type PResult<'a, T> = IResult<TokenInput<'a>, T, SyntaxError>;

/// Matches a token of type `ty`. Anything else ends the parse.
pub(crate) fn expect<'a>(
    ty: TokenType,
    expected: Expected,
) -> impl FnMut(TokenInput<'a>) -> PResult<'a, &'a Token> {
    move |input: TokenInput<'a>| match input.peek() {
        Some(token) if token.token_type == ty => Ok((input.advance(), token)),
        _ => Err(nom::Err::Failure(SyntaxError::unexpected(
            input,
            Some(expected),
        ))),
    }
}

/// Matches a token of type `ty`, or backs off so an optional construct can
/// be skipped.
pub(crate) fn accept<'a>(ty: TokenType) -> impl FnMut(TokenInput<'a>) -> PResult<'a, &'a Token> {
    move |input: TokenInput<'a>| match input.peek() {
        Some(token) if token.token_type == ty => Ok((input.advance(), token)),
        _ => Err(nom::Err::Error(SyntaxError::unexpected(input, None))),
    }
}

fn if_stmt(input: TokenInput) -> PResult<'_, TreeNode> {
    tuple((
        expect(TokenType::If, Expected::Statement),
        expression,
        expect(TokenType::Then, Expected::Token(TokenType::Then)),
        stmt_seq,
        opt(preceded(accept(TokenType::Else), stmt_seq)),
        expect(TokenType::End, Expected::EndOrSemicolon),
    ))
    .map(|(_, condition, _, body, otherwise, _)| {
        let mut children = vec![condition, body];
        children.extend(otherwise);
        TreeNode::new(NodeKind::If, None, children)
    })
    .parse(input)
}

fn repeat_stmt(input: TokenInput) -> PResult<'_, TreeNode> {
    tuple((
        expect(TokenType::Repeat, Expected::Statement),
        stmt_seq,
        expect(TokenType::Until, Expected::Token(TokenType::Until)),
        expression,
    ))
    .map(|(_, body, _, condition)| TreeNode::new(NodeKind::Repeat, None, vec![body, condition]))
    .parse(input)
}

fn assign_stmt(input: TokenInput) -> PResult<'_, TreeNode> {
    tuple((
        expect(TokenType::Id, Expected::Statement),
        expect(TokenType::Assign, Expected::Token(TokenType::Assign)),
        expression,
    ))
    .map(|(target, _, value)| {
        TreeNode::new(NodeKind::Assign, Some(target.text.clone()), vec![value])
    })
    .parse(input)
}

fn read_stmt(input: TokenInput) -> PResult<'_, TreeNode> {
    pair(
        expect(TokenType::Read, Expected::Statement),
        expect(TokenType::Id, Expected::Identifier),
    )
    .map(|(_, target)| TreeNode::new(NodeKind::Read, Some(target.text.clone()), Vec::new()))
    .parse(input)
}

fn write_stmt(input: TokenInput) -> PResult<'_, TreeNode> {
    preceded(expect(TokenType::Write, Expected::Statement), expression)
        .map(|value| TreeNode::new(NodeKind::Write, None, vec![value]))
        .parse(input)
}

fn statement(input: TokenInput) -> PResult<'_, TreeNode> {
    stacker::maybe_grow(RED_ZONE, STACK_SEGMENT, || {
        let Some(token) = input.peek() else {
            return Err(nom::Err::Failure(SyntaxError::missing_statement(input)));
        };
        let (rest, node) = match token.token_type {
            TokenType::If => if_stmt(input),
            TokenType::Repeat => repeat_stmt(input),
            TokenType::Read => read_stmt(input),
            TokenType::Write => write_stmt(input),
            TokenType::Id => assign_stmt(input),
            _ => Err(nom::Err::Failure(SyntaxError::unexpected(
                input,
                Some(Expected::Statement),
            ))),
        }?;
        within_height(rest, node)
    })
}

fn stmt_seq(input: TokenInput) -> PResult<'_, TreeNode> {
    pair(
        statement,
        many0(preceded(accept(TokenType::Semicolon), statement)),
    )
    .map(|(first, rest)| TreeNode::chain(first, rest))
    .parse(input)
}

fn program(input: TokenInput) -> PResult<'_, Option<TreeNode>> {
    if input.peek().is_none() {
        return Ok((input, None));
    }
    let (input, root) = stmt_seq(input)?;
    if input.peek().is_some() {
        return Err(nom::Err::Failure(SyntaxError::unexpected(
            input,
            Some(Expected::Token(TokenType::Semicolon)),
        )));
    }
    Ok((input, Some(root)))
}

/// Parses a whole program. Comment tokens are dropped first, so the stream
/// straight out of [`crate::lex::scan`] can be passed in.
pub fn parse(tokens: &[Token]) -> Result<Option<TreeNode>, SyntaxError> {
    let tokens = strip_comments(tokens);
    let input = TokenInput::new(&tokens);
    match program(input) {
        Ok((_, root)) => {
            debug!(
                "parsed {} top-level statements",
                root.as_ref().map_or(0, |root| root.statements().count())
            );
            Ok(root)
        }
        Err(e) => {
            let e = into_syntax_error(e, input);
            debug!("syntax error: {}", e);
            Err(e)
        }
    }
}
